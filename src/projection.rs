//! Local planar projection of lat/lng circuits.
//!
//! Each axis is measured independently as a signed great-circle distance from
//! the origin, which is only accurate over a few kilometers. That is enough for
//! a race circuit drawn on a map.

use crate::data::{GeodeticPoint, PlanarPoint};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub struct CoordinateProjector;

impl CoordinateProjector {
    /// Great-circle distance in meters (haversine).
    pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let d_phi = (lat2 - lat1).to_radians();
        let d_lambda = (lng2 - lng1).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Projects `point` into meters relative to `origin`: X east, Y north.
    pub fn to_local_meters(point: &GeodeticPoint, origin: &GeodeticPoint) -> PlanarPoint {
        let x = Self::haversine_distance(origin.lat, origin.lng, origin.lat, point.lng);
        let y = Self::haversine_distance(origin.lat, origin.lng, point.lat, origin.lng);

        let x_sign = if point.lng > origin.lng { 1.0 } else { -1.0 };
        let y_sign = if point.lat > origin.lat { 1.0 } else { -1.0 };

        PlanarPoint::new(x * x_sign, y * y_sign)
    }

    pub fn project_all(points: &[GeodeticPoint], origin: &GeodeticPoint) -> Vec<PlanarPoint> {
        points
            .iter()
            .map(|p| Self::to_local_meters(p, origin))
            .collect()
    }
}
