//! # Telecommand module
//!
//! This module provides the operator commands accepted by the superstructure.
//! A telecommand is the only way anything outside the control core changes
//! its state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod effector;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use crate::eqpt::mech::JointId;
pub use effector::{EffectorCmd, GamePiece};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the superstructure by the
/// operator.
///
/// Serialised as externally tagged JSON, for example `"ToggleMode"` or
/// `{"ActivatePreset": "L4"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Tc {
    /// Stop every actuator and reject all other commands until `MakeUnsafe`.
    MakeSafe,

    /// Leave safe mode.
    MakeUnsafe,

    /// Swap between automatic and manual operation.
    ToggleMode,

    /// Select the given operating mode.
    SetMode(OperatingMode),

    /// Move all joints to the named preset.
    ActivatePreset(String),

    /// Set the desired position of a single joint.
    SetPosition {
        joint: JointId,
        position: f64
    },

    /// Adjust the trim offset of a single joint.
    AdjustOffset {
        joint: JointId,
        delta: f64
    },

    /// Set the raw speed applied to a joint while in manual mode.
    ManualSpeed {
        joint: JointId,
        speed: f64
    },

    /// Stop a single joint, holding it against gravity.
    StopJoint(JointId),

    /// Command one of the effectors.
    Effector(EffectorCmd),
}

/// Global operating mode of the superstructure.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum OperatingMode {
    /// Joints are driven towards their commanded setpoints.
    Automatic,

    /// Raw operator speeds are passed through to the joints.
    Manual,
}

/// Response to a processed telecommand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TcResponse {
    /// The command has been executed.
    Ok,

    /// The command is valid but cannot be executed in the current state.
    CannotExecute,

    /// The command was rejected.
    Invalid(String),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise the TC into a JSON packet
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}

impl OperatingMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            OperatingMode::Automatic => OperatingMode::Manual,
            OperatingMode::Manual => OperatingMode::Automatic,
        }
    }
}
