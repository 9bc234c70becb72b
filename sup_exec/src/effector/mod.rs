//! # Effector module
//!
//! Open loop control of the end effector rollers and the climber. An effector
//! runs at a constant output, either until stopped or for a fixed duration.

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

use comms_if::eqpt::mech::MechError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during effector operation.
#[derive(Debug, thiserror::Error)]
pub enum EffectorError {
    #[error("Invalid effector parameters: {0}")]
    InvalidParams(String),

    #[error("Motor driver error: {0}")]
    Driver(#[from] MechError),
}
