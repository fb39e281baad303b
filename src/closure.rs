use crate::config::ClosureSettings;
use crate::data::{CoordinateSystem, PlanarPoint};
use tracing::trace;

pub struct ClosureDetector;

impl ClosureDetector {
    pub fn tolerance(system: CoordinateSystem, settings: &ClosureSettings) -> f64 {
        match system {
            CoordinateSystem::Geodetic => settings.geodetic_tolerance_m,
            CoordinateSystem::Planar => settings.planar_tolerance,
        }
    }

    /// Whether the sequence forms a loop. `points` must already be projected
    /// when `system` is geodetic, so the gap is in meters.
    pub fn is_closed(
        points: &[PlanarPoint],
        system: CoordinateSystem,
        settings: &ClosureSettings,
    ) -> bool {
        if points.len() < 3 {
            return false;
        }

        let gap = points[0].distance_to(&points[points.len() - 1]);
        let tolerance = Self::tolerance(system, settings);
        trace!(gap, tolerance, %system, "closure check");

        gap < tolerance
    }
}
