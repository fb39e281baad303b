use crate::accuracy::AccuracyScorer;
use crate::closure::ClosureDetector;
use crate::config::{EngineConfig, UnitSettings};
use crate::data::*;
use crate::projection::CoordinateProjector;
use crate::segments::SegmentClassifier;
use crate::spline::SplineInterpolator;
use crate::validation::GeometryValidator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Point {index} is {found} but the circuit is {expected}")]
    MixedCoordinateSystems {
        index: usize,
        expected: CoordinateSystem,
        found: CoordinateSystem,
    },
    #[error("Point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("Point {index} has latitude {lat} outside [-90, 90]")]
    InvalidLatitude { index: usize, lat: f64 },
    #[error("Point {index} has longitude {lng} outside [-180, 180]")]
    InvalidLongitude { index: usize, lng: f64 },
}

/// A user-drawn circuit: a control point sequence in one coordinate system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    pub coordinate_system: CoordinateSystem,
    pub points: Vec<ControlPoint>,
}

impl Circuit {
    pub fn new(name: impl Into<String>, coordinate_system: CoordinateSystem, points: Vec<ControlPoint>) -> Self {
        Self {
            name: name.into(),
            coordinate_system,
            points,
        }
    }

    pub fn planar(name: impl Into<String>, coords: &[(f64, f64)]) -> Self {
        let points = coords.iter().map(|&(x, y)| ControlPoint::planar(x, y)).collect();
        Self::new(name, CoordinateSystem::Planar, points)
    }

    pub fn geodetic(name: impl Into<String>, coords: &[(f64, f64)]) -> Self {
        let points = coords
            .iter()
            .map(|&(lat, lng)| ControlPoint::geodetic(lat, lng))
            .collect();
        Self::new(name, CoordinateSystem::Geodetic, points)
    }

    pub fn validate_input(&self) -> Result<(), GeometryError> {
        for (index, point) in self.points.iter().enumerate() {
            let found = point.position.system();
            if found != self.coordinate_system {
                return Err(GeometryError::MixedCoordinateSystems {
                    index,
                    expected: self.coordinate_system,
                    found,
                });
            }

            match point.position {
                Coordinate::Planar(p) => {
                    if !p.is_finite() {
                        return Err(GeometryError::NonFiniteCoordinate { index });
                    }
                }
                Coordinate::Geodetic(g) => {
                    if !g.lat.is_finite() || !g.lng.is_finite() {
                        return Err(GeometryError::NonFiniteCoordinate { index });
                    }
                    if !(-90.0..=90.0).contains(&g.lat) {
                        return Err(GeometryError::InvalidLatitude { index, lat: g.lat });
                    }
                    if !(-180.0..=180.0).contains(&g.lng) {
                        return Err(GeometryError::InvalidLongitude { index, lng: g.lng });
                    }
                }
            }
        }

        Ok(())
    }

    /// Projection origin for geodetic circuits: the first point.
    pub fn origin(&self) -> Option<GeodeticPoint> {
        self.points.iter().find_map(|p| match p.position {
            Coordinate::Geodetic(g) => Some(g),
            Coordinate::Planar(_) => None,
        })
    }

    /// Points in drawing space: geodetic input projected to meters, planar
    /// input in its own units. Call [`Circuit::validate_input`] first.
    pub fn drawing_points(&self) -> Vec<PlanarPoint> {
        let origin = self.origin().unwrap_or_default();
        self.points
            .iter()
            .map(|p| match p.position {
                Coordinate::Planar(planar) => planar,
                Coordinate::Geodetic(geo) => CoordinateProjector::to_local_meters(&geo, &origin),
            })
            .collect()
    }

    /// Points in meters, with the planar unit policy applied.
    pub fn metric_points(&self, units: &UnitSettings) -> Vec<PlanarPoint> {
        let points = self.drawing_points();
        match self.coordinate_system {
            CoordinateSystem::Geodetic => points,
            CoordinateSystem::Planar => points
                .iter()
                .map(|p| p.scale(units.planar_meters_per_unit))
                .collect(),
        }
    }

    pub fn tags(&self) -> Vec<Option<PointKind>> {
        self.points.iter().map(|p| p.kind).collect()
    }
}

/// Everything derived from one control point sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitAnalysis {
    pub name: String,
    pub closed: bool,
    pub state: CircuitState,
    pub segments: Vec<Segment>,
    pub spline: Vec<SplinePoint>,
    pub report: ValidationReport,
}

/// Stateless entry point tying the geometry components together.
#[derive(Debug, Clone, Default)]
pub struct CircuitEngine {
    config: EngineConfig,
}

impl CircuitEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn checked(&self, circuit: &Circuit) -> Result<(), GeometryError> {
        circuit.validate_input().map_err(|e| {
            warn!(circuit = %circuit.name, error = %e, "rejected circuit input");
            e
        })
    }

    pub fn is_closed(&self, circuit: &Circuit) -> Result<bool, GeometryError> {
        self.checked(circuit)?;
        Ok(ClosureDetector::is_closed(
            &circuit.drawing_points(),
            circuit.coordinate_system,
            &self.config.closure,
        ))
    }

    pub fn segments(&self, circuit: &Circuit) -> Result<Vec<Segment>, GeometryError> {
        self.checked(circuit)?;
        Ok(SegmentClassifier::classify(
            &circuit.metric_points(&self.config.units),
            &circuit.tags(),
            &self.config.segments,
        ))
    }

    pub fn spline(&self, circuit: &Circuit) -> Result<Vec<SplinePoint>, GeometryError> {
        let closed = self.is_closed(circuit)?;
        Ok(SplineInterpolator::interpolate(
            &circuit.drawing_points(),
            &circuit.tags(),
            closed,
            &self.config.spline,
        ))
    }

    pub fn validate(&self, circuit: &Circuit) -> Result<ValidationReport, GeometryError> {
        self.checked(circuit)?;
        Ok(GeometryValidator::validate(
            &circuit.metric_points(&self.config.units),
            &self.config.validation,
        ))
    }

    /// Runs the full pipeline from scratch.
    pub fn analyze(&self, circuit: &Circuit) -> Result<CircuitAnalysis, GeometryError> {
        self.checked(circuit)?;

        let drawing = circuit.drawing_points();
        let metric = circuit.metric_points(&self.config.units);
        let tags = circuit.tags();

        let closed = ClosureDetector::is_closed(&drawing, circuit.coordinate_system, &self.config.closure);
        let segments = SegmentClassifier::classify(&metric, &tags, &self.config.segments);
        let spline = SplineInterpolator::interpolate(&drawing, &tags, closed, &self.config.spline);
        let report = GeometryValidator::validate(&metric, &self.config.validation);

        debug!(
            circuit = %circuit.name,
            points = circuit.points.len(),
            closed,
            segments = segments.len(),
            samples = spline.len(),
            valid = report.is_valid,
            "analyzed circuit"
        );

        Ok(CircuitAnalysis {
            name: circuit.name.clone(),
            closed,
            state: CircuitState::from_points(circuit.points.len(), closed),
            segments,
            spline,
            report,
        })
    }

    /// Payload for the lap-time simulator.
    pub fn simulation_payload(&self, circuit: &Circuit) -> Result<SimulationCircuit, GeometryError> {
        Ok(SimulationCircuit {
            name: circuit.name.clone(),
            segments: self.segments(circuit)?,
        })
    }

    /// Similarity of `drawn` to `reference` in [0, 100], compared in meters.
    /// Both circuits must use the same coordinate system.
    pub fn score(&self, drawn: &Circuit, reference: &Circuit) -> Result<f64, GeometryError> {
        self.checked(drawn)?;
        self.checked(reference)?;

        if drawn.coordinate_system != reference.coordinate_system {
            let err = GeometryError::MixedCoordinateSystems {
                index: 0,
                expected: reference.coordinate_system,
                found: drawn.coordinate_system,
            };
            warn!(circuit = %drawn.name, reference = %reference.name, error = %err, "rejected score input");
            return Err(err);
        }

        // geodetic circuits must share an origin to be comparable
        let (drawn_points, reference_points) = match reference.origin() {
            Some(origin) => (
                Self::project_from(drawn, &origin),
                Self::project_from(reference, &origin),
            ),
            None => (
                drawn.metric_points(&self.config.units),
                reference.metric_points(&self.config.units),
            ),
        };

        Ok(AccuracyScorer::score(&drawn_points, &reference_points))
    }

    fn project_from(circuit: &Circuit, origin: &GeodeticPoint) -> Vec<PlanarPoint> {
        circuit
            .points
            .iter()
            .filter_map(|p| match p.position {
                Coordinate::Geodetic(g) => Some(CoordinateProjector::to_local_meters(&g, origin)),
                Coordinate::Planar(_) => None,
            })
            .collect()
    }

    /// Car or ghost marker position at `progress` percent of the lap.
    pub fn car_position(spline: &[SplinePoint], progress: f64) -> Option<SplinePoint> {
        SplineInterpolator::position_at_progress(spline, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_coordinate_systems_rejected() {
        let mut circuit = Circuit::planar("Mixed", &[(0.0, 0.0), (10.0, 0.0)]);
        circuit.points.push(ControlPoint::geodetic(52.0, -1.0));

        let engine = CircuitEngine::default();
        let err = engine.analyze(&circuit).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MixedCoordinateSystems {
                index: 2,
                expected: CoordinateSystem::Planar,
                found: CoordinateSystem::Geodetic,
            }
        );
    }

    #[test]
    fn test_invalid_geodetic_values_rejected() {
        let engine = CircuitEngine::default();

        let circuit = Circuit::geodetic("Bad", &[(95.0, 0.0)]);
        assert!(matches!(engine.segments(&circuit), Err(GeometryError::InvalidLatitude { index: 0, .. })));

        let circuit = Circuit::geodetic("Bad", &[(0.0, 0.0), (0.0, 200.0)]);
        assert!(matches!(engine.segments(&circuit), Err(GeometryError::InvalidLongitude { index: 1, .. })));

        let circuit = Circuit::planar("Bad", &[(0.0, f64::NAN)]);
        assert_eq!(engine.validate(&circuit), Err(GeometryError::NonFiniteCoordinate { index: 0 }));
    }

    #[test]
    fn test_unit_policy_scales_planar_lengths() {
        let mut config = EngineConfig::default();
        config.units.planar_meters_per_unit = 5.0;
        let engine = CircuitEngine::new(config);

        let circuit = Circuit::planar("Scaled", &[(0.0, 0.0), (100.0, 0.0), (300.0, 0.0)]);
        let payload = engine.simulation_payload(&circuit).unwrap();
        assert_eq!(payload.segments[0].length, 500.0);
        assert_eq!(payload.total_length(), 1500.0);

        let report = engine.validate(&circuit).unwrap();
        assert_eq!(report.stats.total_length, 1500.0);
    }

    #[test]
    fn test_geodetic_circuit_projects_from_first_point() {
        let circuit = Circuit::geodetic("Geo", &[(0.0, 0.0), (0.0, 0.01), (0.01, 0.01)]);
        let points = circuit.drawing_points();

        assert_eq!(points[0], PlanarPoint::new(0.0, 0.0));
        assert!((points[1].x - 1111.95).abs() < 0.1);
        assert!(points[1].y.abs() < 1e-9);
        assert!(points[2].y > 1100.0);
    }

    #[test]
    fn test_geodetic_closure_in_meters() {
        let engine = CircuitEngine::default();
        // ~22 m gap between first and last point
        let closed = Circuit::geodetic(
            "Loop",
            &[(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0), (0.0002, 0.0)],
        );
        assert!(engine.is_closed(&closed).unwrap());

        let open = Circuit::geodetic(
            "Open",
            &[(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0), (0.001, 0.0)],
        );
        assert!(!engine.is_closed(&open).unwrap());
    }

    #[test]
    fn test_analysis_state_follows_closure() {
        let engine = CircuitEngine::default();

        let empty = engine.analyze(&Circuit::planar("Empty", &[])).unwrap();
        assert_eq!(empty.state, CircuitState::Empty);
        assert!(empty.segments.is_empty());
        assert!(empty.spline.is_empty());

        let drawing = engine
            .analyze(&Circuit::planar("Open", &[(0.0, 0.0), (500.0, 0.0), (500.0, 500.0)]))
            .unwrap();
        assert_eq!(drawing.state, CircuitState::Drawing);

        let complete = engine
            .analyze(&Circuit::planar(
                "Loop",
                &[(0.0, 0.0), (500.0, 0.0), (500.0, 500.0), (0.0, 500.0), (0.0, 0.0)],
            ))
            .unwrap();
        assert_eq!(complete.state, CircuitState::Complete);
        assert!(complete.closed);
        assert_eq!(complete.segments.len(), 4);
    }

    #[test]
    fn test_car_position_lookup() {
        let engine = CircuitEngine::default();
        let spline = engine
            .spline(&Circuit::planar("Line", &[(0.0, 0.0), (100.0, 0.0)]))
            .unwrap();

        let start = CircuitEngine::car_position(&spline, 0.0).unwrap();
        let finish = CircuitEngine::car_position(&spline, 100.0).unwrap();
        assert_eq!(start.x, 0.0);
        assert_eq!(finish.x, 100.0);
    }

    #[test]
    fn test_score_rejects_mismatched_systems() {
        let engine = CircuitEngine::default();
        let drawn = Circuit::planar("Sketch", &[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0)]);
        let reference = Circuit::geodetic("Map", &[(50.0, 5.0), (50.0, 5.01), (50.01, 5.01)]);

        assert_eq!(
            engine.score(&drawn, &reference),
            Err(GeometryError::MixedCoordinateSystems {
                index: 0,
                expected: CoordinateSystem::Geodetic,
                found: CoordinateSystem::Planar,
            })
        );
        assert!(engine.score(&reference, &drawn).is_err());
    }

    #[test]
    fn test_score_geodetic_against_itself() {
        let engine = CircuitEngine::default();
        let circuit = Circuit::geodetic("Geo", &[(50.0, 5.0), (50.0, 5.01), (50.01, 5.01), (50.0, 5.0)]);
        assert_eq!(engine.score(&circuit, &circuit).unwrap(), 100.0);
    }
}
