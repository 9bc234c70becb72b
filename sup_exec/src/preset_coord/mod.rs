//! # Preset coordinator
//!
//! Named superstructure positions. Activating a preset sends a setpoint to
//! every joint in the same call, with no ordering or interlock between them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PresetCoordError {
    #[error("Preset \"{0}\" is defined more than once")]
    DuplicatePreset(String),

    #[error("Preset \"{0}\" has a non-finite setpoint")]
    InvalidSetpoint(String),

    #[error("No preset named \"{0}\"")]
    UnknownPreset(String),
}
