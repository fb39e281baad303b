use crate::config::SegmentSettings;
use crate::data::{PlanarPoint, PointKind, Segment, SegmentKind};
use tracing::debug;

const DUPLICATE_EPSILON: f64 = 1e-9;

pub struct SegmentClassifier;

impl SegmentClassifier {
    /// Splits a metric polyline into straights and corners, one segment per
    /// consecutive point pair.
    ///
    /// `tags[i]` is the drawing intent of the span starting at point `i`; a tag
    /// overrides the curvature estimate for that span. Missing entries count as
    /// untagged.
    pub fn classify(
        points: &[PlanarPoint],
        tags: &[Option<PointKind>],
        settings: &SegmentSettings,
    ) -> Vec<Segment> {
        if points.len() < 2 {
            return Vec::new();
        }

        let mut segments = Vec::with_capacity(points.len() - 1);

        for i in 1..points.len() {
            let p_prev = &points[i - 1];
            // skip repeated clicks so a duplicated point does not hide the bend
            let p_prev2 = points[..i - 1]
                .iter()
                .rev()
                .find(|p| p.distance_to(p_prev) > DUPLICATE_EPSILON)
                .unwrap_or(p_prev);
            let p_curr = &points[i];

            let length = p_prev.distance_to(p_curr);
            let radius = Self::circumradius(p_prev2, p_prev, p_curr, settings);
            let id = format!("s{}", i);

            let segment = match tags.get(i - 1).copied().flatten() {
                Some(PointKind::Straight) => Segment::straight(id, length),
                Some(PointKind::Curve) => {
                    // collinear points drawn as a curve get the gentlest radius
                    let radius = if radius > 0.0 { radius } else { settings.max_radius_m };
                    Segment::corner(id, length, radius)
                }
                None => {
                    if radius > 0.0 && radius < settings.corner_radius_threshold_m {
                        Segment::corner(id, length, radius)
                    } else {
                        Segment::straight(id, length)
                    }
                }
            };

            segments.push(segment);
        }

        debug!(
            points = points.len(),
            corners = segments.iter().filter(|s| s.kind == SegmentKind::Corner).count(),
            "classified segments"
        );

        segments
    }

    /// Radius of the circle through three points, capped at `max_radius_m`.
    /// Returns 0 when the points are (nearly) collinear.
    pub fn circumradius(
        p1: &PlanarPoint,
        p2: &PlanarPoint,
        p3: &PlanarPoint,
        settings: &SegmentSettings,
    ) -> f64 {
        let (x1, y1) = (p1.x, p1.y);
        let (x2, y2) = (p2.x, p2.y);
        let (x3, y3) = (p3.x, p3.y);

        let d = 2.0 * (x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2));
        if d.abs() < settings.collinear_epsilon {
            return 0.0;
        }

        let s1 = x1 * x1 + y1 * y1;
        let s2 = x2 * x2 + y2 * y2;
        let s3 = x3 * x3 + y3 * y3;

        let ux = (s1 * (y2 - y3) + s2 * (y3 - y1) + s3 * (y1 - y2)) / d;
        let uy = (s1 * (x3 - x2) + s2 * (x1 - x3) + s3 * (x2 - x1)) / d;

        p1.distance_to(&PlanarPoint::new(ux, uy))
            .min(settings.max_radius_m)
    }
}
