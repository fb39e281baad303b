//! Similarity between a drawn circuit and a reference footprint.
//!
//! The score is `100 * (1 - h / d)` where `h` is the symmetric Hausdorff
//! distance between the two polylines and `d` is the diagonal of the reference
//! bounding box, clamped to [0, 100].

use crate::data::PlanarPoint;
use tracing::debug;

pub struct AccuracyScorer;

impl AccuracyScorer {
    pub fn score(drawn: &[PlanarPoint], reference: &[PlanarPoint]) -> f64 {
        if drawn.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let diagonal = Self::bounding_diagonal(reference);
        let distance = Self::hausdorff_distance(drawn, reference);

        let score = if diagonal > 0.0 {
            100.0 * (1.0 - (distance / diagonal).min(1.0))
        } else if distance == 0.0 {
            100.0
        } else {
            0.0
        };

        debug!(distance, diagonal, score, "accuracy score");
        score
    }

    /// Symmetric discrete Hausdorff distance, measured from the vertices of
    /// each polyline to the segments of the other.
    pub fn hausdorff_distance(a: &[PlanarPoint], b: &[PlanarPoint]) -> f64 {
        Self::directed_distance(a, b).max(Self::directed_distance(b, a))
    }

    fn directed_distance(from: &[PlanarPoint], to: &[PlanarPoint]) -> f64 {
        from.iter()
            .map(|p| Self::distance_to_polyline(p, to))
            .fold(0.0, f64::max)
    }

    fn distance_to_polyline(p: &PlanarPoint, polyline: &[PlanarPoint]) -> f64 {
        if polyline.len() == 1 {
            return p.distance_to(&polyline[0]);
        }

        polyline
            .windows(2)
            .map(|w| Self::distance_to_segment(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min)
    }

    fn distance_to_segment(p: &PlanarPoint, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
        let ab = b.sub(a);
        let len_sq = ab.x * ab.x + ab.y * ab.y;
        if len_sq == 0.0 {
            return p.distance_to(a);
        }

        let ap = p.sub(a);
        let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
        p.distance_to(&PlanarPoint::new(a.x + ab.x * t, a.y + ab.y * t))
    }

    fn bounding_diagonal(points: &[PlanarPoint]) -> f64 {
        let mut min = PlanarPoint::new(f64::MAX, f64::MAX);
        let mut max = PlanarPoint::new(f64::MIN, f64::MIN);

        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        min.distance_to(&max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64, offset: f64) -> Vec<PlanarPoint> {
        vec![
            PlanarPoint::new(offset, offset),
            PlanarPoint::new(offset + size, offset),
            PlanarPoint::new(offset + size, offset + size),
            PlanarPoint::new(offset, offset + size),
            PlanarPoint::new(offset, offset),
        ]
    }

    #[test]
    fn test_identical_tracks_score_full() {
        let reference = square(1000.0, 0.0);
        assert_eq!(AccuracyScorer::score(&reference, &reference), 100.0);
    }

    #[test]
    fn test_denser_drawing_of_same_shape_scores_full() {
        let reference = square(1000.0, 0.0);
        let mut drawn = Vec::new();
        for i in 0..10 {
            drawn.push(PlanarPoint::new(i as f64 * 100.0, 0.0));
        }
        drawn.push(PlanarPoint::new(1000.0, 0.0));
        assert_eq!(AccuracyScorer::score(&drawn, &reference[..2]), 100.0);
    }

    #[test]
    fn test_offset_lowers_score() {
        let reference = square(1000.0, 0.0);
        let close = AccuracyScorer::score(&square(1000.0, 10.0), &reference);
        let far = AccuracyScorer::score(&square(1000.0, 200.0), &reference);

        assert!(close < 100.0);
        assert!(far < close);
        assert!(far > 0.0);
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let reference = square(500.0, 0.0);
        let drawn = square(300.0, 5000.0);
        let a = AccuracyScorer::score(&drawn, &reference);
        let b = AccuracyScorer::score(&drawn, &reference);
        assert_eq!(a, b);
        assert_eq!(a, 0.0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let reference = square(100.0, 0.0);
        assert_eq!(AccuracyScorer::score(&[], &reference), 0.0);
        assert_eq!(AccuracyScorer::score(&reference, &[]), 0.0);
    }

    #[test]
    fn test_hausdorff_uses_segments() {
        let line = vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(100.0, 0.0)];
        let point = vec![PlanarPoint::new(50.0, 3.0)];
        // from the point to the line is 3, from the line's endpoints to the point is larger
        let d = AccuracyScorer::hausdorff_distance(&point, &line);
        assert!((d - (50.0f64 * 50.0 + 9.0).sqrt()).abs() < 1e-9);
    }
}
