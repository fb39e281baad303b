/// Reference circuits with known segment layouts
use crate::data::{Segment, SimulationCircuit};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackTemplate {
    pub name: String,
    pub length_km: f64, // published lap length
    pub segments: Vec<Segment>,
}

impl TrackTemplate {
    fn from_layout(name: &str, length_km: f64, layout: &[(f64, f64)]) -> Self {
        let segments = layout
            .iter()
            .enumerate()
            .map(|(i, &(length, radius))| {
                let id = format!("s{}", i + 1);
                if radius > 0.0 {
                    Segment::corner(id, length, radius)
                } else {
                    Segment::straight(id, length)
                }
            })
            .collect();

        Self {
            name: name.to_string(),
            length_km,
            segments,
        }
    }

    pub fn monaco() -> Self {
        Self::from_layout(
            "Monaco GP",
            3.337,
            &[
                (500.0, 0.0),
                (80.0, 40.0),
                (300.0, 0.0),
                (120.0, 25.0),
                (200.0, 0.0),
                (100.0, 60.0),
                (400.0, 0.0),
                (90.0, 35.0),
                (350.0, 0.0),
                (110.0, 50.0),
            ],
        )
    }

    pub fn silverstone() -> Self {
        Self::from_layout(
            "Silverstone GP",
            5.891,
            &[
                (800.0, 0.0),
                (200.0, 120.0),
                (600.0, 0.0),
                (150.0, 80.0),
                (500.0, 0.0),
                (180.0, 100.0),
                (700.0, 0.0),
                (160.0, 90.0),
            ],
        )
    }

    pub fn spa() -> Self {
        Self::from_layout(
            "Spa-Francorchamps",
            7.004,
            &[
                (1000.0, 0.0),
                (300.0, 150.0),
                (800.0, 0.0),
                (400.0, 200.0),
                (1200.0, 0.0),
                (250.0, 100.0),
            ],
        )
    }

    pub fn to_simulation(&self) -> SimulationCircuit {
        SimulationCircuit {
            name: self.name.clone(),
            segments: self.segments.clone(),
        }
    }
}

/// Load all templates keyed by lowercase short name.
pub fn load_templates() -> HashMap<String, TrackTemplate> {
    let mut templates = HashMap::new();

    templates.insert("monaco".to_string(), TrackTemplate::monaco());
    templates.insert("silverstone".to_string(), TrackTemplate::silverstone());
    templates.insert("spa".to_string(), TrackTemplate::spa());

    templates
}

/// Get a template by short name, case-insensitive.
pub fn get_template(name: &str) -> Option<TrackTemplate> {
    match name.to_lowercase().as_str() {
        "monaco" => Some(TrackTemplate::monaco()),
        "silverstone" => Some(TrackTemplate::silverstone()),
        "spa" => Some(TrackTemplate::spa()),
        _ => None,
    }
}
