use crate::circuit::{Circuit, GeometryError};
use crate::data::{ControlPoint, CoordinateSystem, Segment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Circuit export/import document: `{ name, points, segments }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(default)]
    pub points: Option<Vec<ControlPoint>>,
    /// Derived data; recomputed on analysis, kept for the simulator
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Error)]
pub enum CircuitLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Circuit document has no points")]
    MissingPoints,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone)]
pub struct LoadedCircuit {
    pub id: Uuid,
    pub circuit: Circuit,
    pub segments: Vec<Segment>,
}

pub struct CircuitLoader;

impl CircuitLoader {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<LoadedCircuit, CircuitLoadError> {
        let content = fs::read_to_string(path)?;
        Self::load_from_string(&content)
    }

    pub fn load_from_string(content: &str) -> Result<LoadedCircuit, CircuitLoadError> {
        let document: CircuitDocument = if content.trim_start().starts_with('{') {
            serde_json::from_str(content)
                .map_err(|e| CircuitLoadError::Parse(format!("JSON parse error: {}", e)))?
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| CircuitLoadError::Parse(format!("YAML parse error: {}", e)))?
        };

        Self::from_document(document)
    }

    pub fn from_document(document: CircuitDocument) -> Result<LoadedCircuit, CircuitLoadError> {
        let points = document.points.ok_or(CircuitLoadError::MissingPoints)?;

        // Documents without an explicit tag take the system of their first point.
        let coordinate_system = document
            .coordinate_system
            .or_else(|| points.first().map(|p| p.position.system()))
            .unwrap_or(CoordinateSystem::Planar);

        let circuit = Circuit::new(document.name, coordinate_system, points);
        circuit.validate_input()?;

        let id = if let Some(id_str) = &document.id {
            Uuid::parse_str(id_str)
                .map_err(|e| CircuitLoadError::InvalidData(format!("Invalid circuit id: {}", e)))?
        } else {
            Uuid::new_v4()
        };

        debug!(
            circuit = %circuit.name,
            %id,
            points = circuit.points.len(),
            system = %coordinate_system,
            "loaded circuit document"
        );

        Ok(LoadedCircuit {
            id,
            circuit,
            segments: document.segments,
        })
    }

    pub fn to_document(circuit: &Circuit, id: Option<Uuid>, segments: Vec<Segment>) -> CircuitDocument {
        CircuitDocument {
            id: id.map(|id| id.to_string()),
            name: circuit.name.clone(),
            coordinate_system: Some(circuit.coordinate_system),
            points: Some(circuit.points.clone()),
            segments,
        }
    }

    pub fn to_json_string(document: &CircuitDocument) -> Result<String, CircuitLoadError> {
        serde_json::to_string_pretty(document)
            .map_err(|e| CircuitLoadError::Parse(format!("JSON write error: {}", e)))
    }

    pub fn to_yaml_string(document: &CircuitDocument) -> Result<String, CircuitLoadError> {
        serde_yaml::to_string(document)
            .map_err(|e| CircuitLoadError::Parse(format!("YAML write error: {}", e)))
    }

    /// Writes YAML for `.yaml`/`.yml` paths and JSON otherwise.
    pub fn save_to_file<P: AsRef<Path>>(path: P, document: &CircuitDocument) -> Result<(), CircuitLoadError> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::to_yaml_string(document)?,
            _ => Self::to_json_string(document)?,
        };
        fs::write(path, content)?;
        Ok(())
    }
}
