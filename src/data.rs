use serde::{Deserialize, Serialize};

// --- Coordinates ---

/// Point in a flat drawing plane (meters or canvas units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn sub(&self, other: &PlanarPoint) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heading of the vector from `self` to `other`, in radians.
    pub fn heading_to(&self, other: &PlanarPoint) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeodeticPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    Geodetic, // lat/lng degrees, projected to meters before any planar math
    Planar,   // x/y in drawing units
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateSystem::Geodetic => write!(f, "geodetic"),
            CoordinateSystem::Planar => write!(f, "planar"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Geodetic(GeodeticPoint),
    Planar(PlanarPoint),
}

impl Coordinate {
    pub fn system(&self) -> CoordinateSystem {
        match self {
            Coordinate::Geodetic(_) => CoordinateSystem::Geodetic,
            Coordinate::Planar(_) => CoordinateSystem::Planar,
        }
    }
}

// --- Control Points (user input) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Straight,
    Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    #[serde(flatten)]
    pub position: Coordinate,
    /// Drawing intent for the span that starts at this point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PointKind>,
}

impl ControlPoint {
    pub fn planar(x: f64, y: f64) -> Self {
        Self {
            position: Coordinate::Planar(PlanarPoint::new(x, y)),
            kind: None,
        }
    }

    pub fn geodetic(lat: f64, lng: f64) -> Self {
        Self {
            position: Coordinate::Geodetic(GeodeticPoint::new(lat, lng)),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: PointKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

// --- Segments (physics simulator input) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Straight,
    Corner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub length: f64, // meters
    #[serde(default)]
    pub radius: f64, // meters, 0 for straights
}

impl Segment {
    pub fn straight(id: impl Into<String>, length: f64) -> Self {
        Self {
            id: id.into(),
            kind: SegmentKind::Straight,
            length,
            radius: 0.0,
        }
    }

    pub fn corner(id: impl Into<String>, length: f64, radius: f64) -> Self {
        Self {
            id: id.into(),
            kind: SegmentKind::Corner,
            length,
            radius,
        }
    }
}

/// Payload handed to the lap-time simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationCircuit {
    pub name: String,
    pub segments: Vec<Segment>,
}

impl SimulationCircuit {
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

// --- Render Output ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplinePoint {
    pub x: f64,
    pub y: f64,
    pub tangent: (f64, f64),
    pub heading: f64,      // radians
    pub speed_factor: f64, // 0.2-1.0, heatmap hue only
}

impl SplinePoint {
    pub fn position(&self) -> PlanarPoint {
        PlanarPoint::new(self.x, self.y)
    }
}

// --- Validation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_length: f64,     // meters
    pub sharpest_turn: f64,    // degrees
    pub longest_straight: f64, // meters
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<Issue>,
    pub stats: ValidationStats,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
            stats: ValidationStats::default(),
        }
    }
}

impl ValidationReport {
    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

// --- Drawing Lifecycle ---

/// Caller-side state of the control point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    Empty,
    Drawing,
    Complete,
}

impl CircuitState {
    pub fn from_points(point_count: usize, closed: bool) -> Self {
        if point_count == 0 {
            CircuitState::Empty
        } else if closed {
            CircuitState::Complete
        } else {
            CircuitState::Drawing
        }
    }
}
