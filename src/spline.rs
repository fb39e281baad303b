use crate::config::SplineSettings;
use crate::data::{PlanarPoint, PointKind, SplinePoint};
use std::f64::consts::PI;
use tracing::debug;

/// How a single span between two control points is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanShape {
    CatmullRom,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub shape: SpanShape,
}

pub struct SplineInterpolator;

impl SplineInterpolator {
    /// Builds the span list for a path. A span takes its shape from the tag on
    /// its starting point; untagged and curve-tagged spans are spline-fit.
    pub fn spans(point_count: usize, tags: &[Option<PointKind>], closed: bool) -> Vec<Span> {
        if point_count < 2 {
            return Vec::new();
        }

        let span_count = if closed { point_count } else { point_count - 1 };

        (0..span_count)
            .map(|start| {
                let shape = match tags.get(start).copied().flatten() {
                    Some(PointKind::Straight) => SpanShape::Linear,
                    _ => SpanShape::CatmullRom,
                };
                Span {
                    start,
                    end: (start + 1) % point_count,
                    shape,
                }
            })
            .collect()
    }

    /// Dense render curve through `points`.
    ///
    /// Open paths start and end exactly on the first and last control point.
    /// Closed paths wrap around the seam and do not repeat the first sample.
    pub fn interpolate(
        points: &[PlanarPoint],
        tags: &[Option<PointKind>],
        closed: bool,
        settings: &SplineSettings,
    ) -> Vec<SplinePoint> {
        if points.len() < 2 {
            return points
                .iter()
                .map(|p| SplinePoint {
                    x: p.x,
                    y: p.y,
                    tangent: (0.0, 0.0),
                    heading: 0.0,
                    speed_factor: 1.0,
                })
                .collect();
        }

        // A closed loop usually repeats its first point; the seam span covers that gap.
        // Fewer than three distinct points cannot wrap and are drawn open.
        let mut n = points.len();
        if closed && n >= 3 && points[0].distance_to(&points[n - 1]) < 1e-9 {
            n -= 1;
        }
        let points = &points[..n];
        let closed = closed && n >= 3;

        let resolution = settings.resolution.max(1);
        let spans = Self::spans(n, tags, closed);
        let mut samples: Vec<(PlanarPoint, PlanarPoint)> = Vec::with_capacity(spans.len() * resolution + 1);

        for span in &spans {
            let p1 = points[span.start];
            let p2 = points[span.end];

            match span.shape {
                SpanShape::Linear => {
                    let length = p1.distance_to(&p2);
                    let steps = if settings.straight_step > 0.0 {
                        ((length / settings.straight_step).ceil() as usize).max(1)
                    } else {
                        1
                    };
                    let direction = p2.sub(&p1);

                    for j in 0..steps {
                        let t = j as f64 / steps as f64;
                        let position = PlanarPoint::new(p1.x + direction.x * t, p1.y + direction.y * t);
                        samples.push((position, direction));
                    }
                }
                SpanShape::CatmullRom => {
                    let (p0, p3) = Self::neighbors(points, span, closed);

                    for j in 0..resolution {
                        let t = j as f64 / resolution as f64;
                        samples.push((
                            Self::catmull_rom_point(&p0, &p1, &p2, &p3, t),
                            Self::catmull_rom_tangent(&p0, &p1, &p2, &p3, t),
                        ));
                    }
                }
            }
        }

        if !closed {
            if let Some(last) = spans.last() {
                let p1 = points[last.start];
                let p2 = points[last.end];
                let tangent = match last.shape {
                    SpanShape::Linear => p2.sub(&p1),
                    SpanShape::CatmullRom => {
                        let (p0, p3) = Self::neighbors(points, last, closed);
                        Self::catmull_rom_tangent(&p0, &p1, &p2, &p3, 1.0)
                    }
                };
                samples.push((p2, tangent));
            }
        }

        let curve = Self::assign_speed_factors(&samples, closed, settings);
        debug!(
            control_points = n,
            spans = spans.len(),
            samples = curve.len(),
            closed,
            "interpolated spline"
        );
        curve
    }

    /// Phantom neighbors: open ends duplicate the endpoint, closed loops wrap.
    fn neighbors(points: &[PlanarPoint], span: &Span, closed: bool) -> (PlanarPoint, PlanarPoint) {
        let n = points.len();

        let p0 = if closed {
            points[(span.start + n - 1) % n]
        } else if span.start == 0 {
            points[0]
        } else {
            points[span.start - 1]
        };

        let p3 = if closed {
            points[(span.start + 2) % n]
        } else {
            points[(span.start + 2).min(n - 1)]
        };

        (p0, p3)
    }

    pub fn catmull_rom_point(
        p0: &PlanarPoint,
        p1: &PlanarPoint,
        p2: &PlanarPoint,
        p3: &PlanarPoint,
        t: f64,
    ) -> PlanarPoint {
        let t2 = t * t;
        let t3 = t2 * t;

        let x = 0.5
            * ((2.0 * p1.x)
                + (-p0.x + p2.x) * t
                + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
                + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3);

        let y = 0.5
            * ((2.0 * p1.y)
                + (-p0.y + p2.y) * t
                + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
                + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3);

        PlanarPoint::new(x, y)
    }

    /// Derivative of [`Self::catmull_rom_point`] with respect to `t`.
    pub fn catmull_rom_tangent(
        p0: &PlanarPoint,
        p1: &PlanarPoint,
        p2: &PlanarPoint,
        p3: &PlanarPoint,
        t: f64,
    ) -> PlanarPoint {
        let t2 = t * t;

        let dx = 0.5
            * ((-p0.x + p2.x)
                + 2.0 * (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t
                + 3.0 * (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t2);

        let dy = 0.5
            * ((-p0.y + p2.y)
                + 2.0 * (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t
                + 3.0 * (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t2);

        PlanarPoint::new(dx, dy)
    }

    fn assign_speed_factors(
        samples: &[(PlanarPoint, PlanarPoint)],
        closed: bool,
        settings: &SplineSettings,
    ) -> Vec<SplinePoint> {
        let mut headings = Vec::with_capacity(samples.len());
        let mut last_heading = 0.0;
        for (_, tangent) in samples {
            // zero-length tangents (duplicated control points) keep the previous heading
            if tangent.x.hypot(tangent.y) > 1e-12 {
                last_heading = tangent.y.atan2(tangent.x);
            }
            headings.push(last_heading);
        }

        let m = samples.len();
        samples
            .iter()
            .enumerate()
            .map(|(i, (position, tangent))| {
                // both ends of an open curve run at full speed
                let previous = if closed && m > 1 {
                    Some((i + m - 1) % m)
                } else if i > 0 && i + 1 < m {
                    Some(i - 1)
                } else {
                    None
                };

                let speed_factor = match previous {
                    Some(prev) => {
                        let curvature = angle_between(headings[i], headings[prev]) * settings.curvature_scale;
                        (1.0 - curvature.min(settings.max_curvature)).clamp(settings.min_speed_factor, 1.0)
                    }
                    None => 1.0,
                };

                SplinePoint {
                    x: position.x,
                    y: position.y,
                    tangent: (tangent.x, tangent.y),
                    heading: headings[i],
                    speed_factor,
                }
            })
            .collect()
    }

    /// Sample at `progress` percent along the curve, for car and ghost markers.
    pub fn position_at_progress(points: &[SplinePoint], progress: f64) -> Option<SplinePoint> {
        if points.is_empty() {
            return None;
        }

        let progress = if progress.is_finite() { progress.clamp(0.0, 100.0) } else { 0.0 };
        let index = (progress / 100.0 * (points.len() - 1) as f64).floor() as usize;
        points.get(index.min(points.len() - 1)).copied()
    }
}

/// Absolute difference of two angles, wrapped to [0, π].
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % (2.0 * PI);
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<PlanarPoint> {
        coords.iter().map(|&(x, y)| PlanarPoint::new(x, y)).collect()
    }

    #[test]
    fn test_open_path_hits_endpoints() {
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 10.0)]);
        let settings = SplineSettings::default();
        let curve = SplineInterpolator::interpolate(&points, &[], false, &settings);

        assert_eq!(curve.len(), 2 * settings.resolution + 1);
        assert_eq!(curve[0].position(), points[0]);
        let last = curve.last().unwrap();
        assert!((last.x - 20.0).abs() < 1e-9);
        assert!((last.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_passes_through_control_points() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (150.0, 80.0), (60.0, 140.0)]);
        let settings = SplineSettings { resolution: 8, ..SplineSettings::default() };
        let curve = SplineInterpolator::interpolate(&points, &[], false, &settings);

        for (k, p) in points.iter().enumerate().take(3) {
            let sample = curve[k * 8];
            assert!((sample.x - p.x).abs() < 1e-9 && (sample.y - p.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_closed_loop_wraps_without_duplicate() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let settings = SplineSettings::default();
        let curve = SplineInterpolator::interpolate(&points, &[], true, &settings);
        assert_eq!(curve.len(), 4 * settings.resolution);

        // repeating the first point does not add a zero-length span
        let mut repeated = points.clone();
        repeated.push(points[0]);
        let curve_repeated = SplineInterpolator::interpolate(&repeated, &[], true, &settings);
        assert_eq!(curve, curve_repeated);
    }

    #[test]
    fn test_closed_loop_is_smooth_across_seam() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let settings = SplineSettings::default();
        let curve = SplineInterpolator::interpolate(&points, &[], true, &settings);

        // the seam sample's tangent comes from the wrapped neighbors (0,100) and (100,0)
        assert!((curve[0].tangent.0 - 50.0).abs() < 1e-9);
        assert!((curve[0].tangent.1 + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_span_is_linear() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
        let tags = vec![Some(PointKind::Straight), None, None];
        let settings = SplineSettings::default();
        let curve = SplineInterpolator::interpolate(&points, &tags, false, &settings);

        // 100 units at 10 units per step
        let straight = &curve[..10];
        for sample in straight {
            assert_eq!(sample.y, 0.0);
            assert_eq!(sample.heading, 0.0);
        }
        assert_eq!(curve[1].x, 10.0);
        assert_eq!(curve.len(), 10 + settings.resolution + 1);
    }

    #[test]
    fn test_speed_factor_in_range() {
        let points = pts(&[(0.0, 0.0), (30.0, 0.0), (30.0, 5.0), (0.0, 10.0), (0.0, 40.0)]);
        let curve = SplineInterpolator::interpolate(&points, &[], false, &SplineSettings::default());
        assert!(curve.iter().all(|p| (0.2..=1.0).contains(&p.speed_factor)));
        assert!(curve.iter().any(|p| p.speed_factor < 1.0));
    }

    #[test]
    fn test_open_curve_ends_at_full_speed() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
        let curve = SplineInterpolator::interpolate(&points, &[], false, &SplineSettings::default());

        assert_eq!(curve[0].speed_factor, 1.0);
        assert_eq!(curve[curve.len() - 1].speed_factor, 1.0);
        assert!(curve[1..curve.len() - 1].iter().any(|p| p.speed_factor < 1.0));
    }

    #[test]
    fn test_closed_out_and_back_is_drawn_open() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0), (0.0, 0.0)]);
        let settings = SplineSettings::default();
        let curve = SplineInterpolator::interpolate(&points, &[], true, &settings);

        // the repeated start is dropped and two points cannot wrap
        assert_eq!(curve.len(), settings.resolution + 1);
        assert!(curve.iter().all(|p| p.x >= 0.0 && p.x <= 100.0 && p.y == 0.0));
    }

    #[test]
    fn test_straight_line_keeps_full_speed() {
        let points = pts(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let curve = SplineInterpolator::interpolate(&points, &[], false, &SplineSettings::default());
        assert!(curve.iter().all(|p| p.speed_factor == 1.0));
    }

    #[test]
    fn test_interpolation_is_deterministic() {
        let points = pts(&[(3.0, 1.0), (40.0, 7.5), (52.0, 60.0), (-8.0, 33.3)]);
        let tags = vec![None, Some(PointKind::Straight), Some(PointKind::Curve), None];
        let settings = SplineSettings::default();

        let a = SplineInterpolator::interpolate(&points, &tags, true, &settings);
        let b = SplineInterpolator::interpolate(&points, &tags, true, &settings);
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(&b) {
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
            assert_eq!(p.heading.to_bits(), q.heading.to_bits());
            assert_eq!(p.speed_factor.to_bits(), q.speed_factor.to_bits());
        }
    }

    #[test]
    fn test_degenerate_inputs_returned_unchanged() {
        let settings = SplineSettings::default();
        assert!(SplineInterpolator::interpolate(&[], &[], false, &settings).is_empty());

        let single = SplineInterpolator::interpolate(&pts(&[(4.0, 2.0)]), &[], true, &settings);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].x, 4.0);
        assert_eq!(single[0].y, 2.0);
    }

    #[test]
    fn test_spans_follow_point_tags() {
        let tags = vec![Some(PointKind::Straight), Some(PointKind::Curve), None];
        let open = SplineInterpolator::spans(3, &tags, false);
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].shape, SpanShape::Linear);
        assert_eq!(open[1].shape, SpanShape::CatmullRom);

        let closed = SplineInterpolator::spans(3, &tags, true);
        assert_eq!(closed.len(), 3);
        assert_eq!(closed[2].end, 0);
    }

    #[test]
    fn test_position_at_progress() {
        let points = pts(&[(0.0, 0.0), (100.0, 0.0)]);
        let curve = SplineInterpolator::interpolate(&points, &[], false, &SplineSettings::default());
        let n = curve.len();

        assert_eq!(SplineInterpolator::position_at_progress(&curve, 0.0), Some(curve[0]));
        assert_eq!(SplineInterpolator::position_at_progress(&curve, 100.0), Some(curve[n - 1]));
        assert_eq!(SplineInterpolator::position_at_progress(&curve, 50.0), Some(curve[(n - 1) / 2]));
        assert_eq!(SplineInterpolator::position_at_progress(&curve, 250.0), Some(curve[n - 1]));
        assert_eq!(SplineInterpolator::position_at_progress(&[], 10.0), None);
    }

    #[test]
    fn test_angle_between_wraps() {
        assert!((angle_between(0.1, -0.1) - 0.2).abs() < 1e-12);
        assert!((angle_between(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
        assert_eq!(angle_between(1.0, 1.0), 0.0);
    }
}
