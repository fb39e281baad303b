//! Circuit geometry engine for StarTrack.
//!
//! Turns a user-drawn control point sequence into a render curve, a list of
//! straight/corner segments for the lap-time simulator, and a track design
//! report. Every computation is a pure function of its input.

pub mod accuracy;
pub mod circuit;
pub mod circuit_loader;
pub mod closure;
pub mod config;
pub mod data;
pub mod projection;
pub mod segments;
pub mod spline;
pub mod templates;
pub mod validation;

pub use circuit::{Circuit, CircuitAnalysis, CircuitEngine, GeometryError};
pub use config::EngineConfig;
