use crate::config::ValidationSettings;
use crate::data::{Issue, PlanarPoint, Severity, ValidationReport, ValidationStats};
use crate::spline::angle_between;
use tracing::debug;

/// Points closer than this are the same click.
const DUPLICATE_EPSILON: f64 = 1e-9;

pub struct GeometryValidator;

impl GeometryValidator {
    /// Sum of consecutive point distances. The closing edge of a loop is not
    /// included; a closed circuit repeats its first point instead.
    pub fn circuit_length(points: &[PlanarPoint]) -> f64 {
        points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    /// Turn angle at `points[i]` in degrees, in [0, 180].
    pub fn turn_angle_deg(prev: &PlanarPoint, curr: &PlanarPoint, next: &PlanarPoint) -> f64 {
        let incoming = prev.heading_to(curr);
        let outgoing = curr.heading_to(next);
        angle_between(outgoing, incoming).to_degrees()
    }

    /// Drops points that repeat their predecessor, keeping the original index
    /// of every point that remains.
    fn distinct_points(points: &[PlanarPoint]) -> (Vec<PlanarPoint>, Vec<usize>) {
        let mut kept: Vec<PlanarPoint> = Vec::with_capacity(points.len());
        let mut indices = Vec::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            if kept.last().map_or(true, |last| last.distance_to(point) > DUPLICATE_EPSILON) {
                kept.push(*point);
                indices.push(i);
            }
        }
        (kept, indices)
    }

    /// Checks a metric polyline against the track design rules.
    pub fn validate(points: &[PlanarPoint], settings: &ValidationSettings) -> ValidationReport {
        if points.len() < 3 {
            return ValidationReport::default();
        }

        // repeated clicks leave zero-length edges with no heading of their own
        let (kept, indices) = Self::distinct_points(points);

        let mut issues = Vec::new();
        let mut sharpest_turn: f64 = 0.0;
        let mut longest_straight: f64 = 0.0;
        let mut current_straight = match kept.as_slice() {
            [first, second, ..] => first.distance_to(second),
            _ => 0.0,
        };

        for k in 1..kept.len().saturating_sub(1) {
            let i = indices[k];
            let diff = Self::turn_angle_deg(&kept[k - 1], &kept[k], &kept[k + 1]);
            sharpest_turn = sharpest_turn.max(diff);

            if diff > settings.critical_turn_deg {
                issues.push(Issue {
                    severity: Severity::Critical,
                    message: format!("Impossible sharp turn at point {}", i),
                    point_index: Some(i),
                });
            } else if diff > settings.hairpin_turn_deg {
                issues.push(Issue {
                    severity: Severity::Warning,
                    message: format!("Very tight hairpin at point {}", i),
                    point_index: Some(i),
                });
            }

            let outgoing = kept[k].distance_to(&kept[k + 1]);
            if diff < settings.straight_turn_deg {
                current_straight += outgoing;
            } else {
                longest_straight = longest_straight.max(current_straight);
                current_straight = outgoing;
            }
        }
        longest_straight = longest_straight.max(current_straight);

        let total_length = Self::circuit_length(points);

        if total_length < settings.min_length_m {
            issues.push(Issue {
                severity: Severity::Warning,
                message: format!(
                    "Track too short: {:.0} m (minimum {:.0} m)",
                    total_length, settings.min_length_m
                ),
                point_index: None,
            });
        } else if total_length > settings.max_length_m {
            issues.push(Issue {
                severity: Severity::Warning,
                message: format!(
                    "Track too long: {:.0} m (maximum {:.0} m)",
                    total_length, settings.max_length_m
                ),
                point_index: None,
            });
        }

        debug!(
            total_length,
            sharpest_turn,
            longest_straight,
            issues = issues.len(),
            "validated circuit geometry"
        );

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
            stats: ValidationStats {
                total_length,
                sharpest_turn,
                longest_straight,
            },
        }
    }
}
