use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub closure: ClosureSettings,
    pub units: UnitSettings,
    pub segments: SegmentSettings,
    pub spline: SplineSettings,
    pub validation: ValidationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureSettings {
    pub geodetic_tolerance_m: f64, // first/last gap for lat/lng input
    pub planar_tolerance: f64,     // same, in drawing units
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    /// Meters per planar drawing unit. Geodetic input is already in meters.
    pub planar_meters_per_unit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    pub corner_radius_threshold_m: f64, // radius at or above this counts as a straight
    pub max_radius_m: f64,
    pub collinear_epsilon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineSettings {
    pub resolution: usize,   // samples per Catmull-Rom span
    pub straight_step: f64,  // sample spacing on straight spans
    pub curvature_scale: f64,
    pub max_curvature: f64,
    pub min_speed_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub critical_turn_deg: f64,
    pub hairpin_turn_deg: f64,
    pub straight_turn_deg: f64,
    pub min_length_m: f64,
    pub max_length_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for ClosureSettings {
    fn default() -> Self {
        Self {
            geodetic_tolerance_m: 40.0,
            planar_tolerance: 30.0,
        }
    }
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            planar_meters_per_unit: 1.0,
        }
    }
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            corner_radius_threshold_m: 500.0,
            max_radius_m: 1000.0,
            collinear_epsilon: 1e-5,
        }
    }
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self {
            resolution: 20,
            straight_step: 10.0,
            curvature_scale: 10.0,
            max_curvature: 0.8,
            min_speed_factor: 0.2,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            critical_turn_deg: 160.0,
            hairpin_turn_deg: 120.0,
            straight_turn_deg: 2.0,
            min_length_m: 3000.0,
            max_length_m: 8000.0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {}, using defaults", e);
            Self::default()
        })
    }
}
