//! # Mechanisms Equipment Interface
//!
//! The control core never talks to motor controllers directly. Every actuator
//! and its position sensor is reached through a [`MotorDriver`], which the
//! driver layer implements for real hardware and `sup_exec` implements for
//! simulation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const JOINT_IDS: [JointId; 3] = [JointId::Elevator, JointId::Elbow, JointId::Wrist];

const EFFECTOR_IDS: [EffectorId; 2] = [EffectorId::EndEffector, EffectorId::Climber];

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing a motor and its position sensor.
///
/// Reads are infallible: the driver layer is responsible for always providing
/// the latest valid sample. Writes and configuration may fail.
pub trait MotorDriver {
    /// Current position in sensor units.
    fn read_position(&self) -> f64;

    /// Current velocity in sensor units per second.
    fn read_velocity(&self) -> f64;

    /// Write a normalised output demand.
    ///
    /// ## Arguments
    /// - `output` - The demand to write. Must be a value between -1.0 and 1.0.
    fn write_output(&mut self, output: f64) -> Result<(), MechError>;

    /// Declare the current position of the sensor to be zero.
    fn zero_position(&mut self) -> Result<(), MechError>;

    /// Limit the supply current drawn by the motor.
    fn apply_current_limit(&mut self, amps: f64) -> Result<(), MechError>;

    /// Select brake (`true`) or coast (`false`) when the output is neutral.
    fn set_brake_mode(&mut self, brake: bool) -> Result<(), MechError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the closed-loop position joints of the superstructure
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    Elevator,
    Elbow,
    Wrist,
}

/// IDs of the open-loop effectors of the superstructure
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum EffectorId {
    EndEffector,
    Climber,
}

/// IDs of all actuators available to the superstructure
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    Joint(JointId),
    Effector(EffectorId),
}

/// Errors reported by a [`MotorDriver`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MechError {
    #[error("Output demand must be between -1.0 and 1.0, got {0}")]
    InvalidOutput(f64),

    #[error("The motor controller did not respond")]
    NoResponse,

    #[error("The motor controller rejected the configuration: {0}")]
    ConfigRejected(String),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl JointId {
    /// All joints, in the order they are processed each tick.
    pub fn all() -> &'static [JointId] {
        &JOINT_IDS
    }
}

impl EffectorId {
    /// All effectors, in the order they are processed each tick.
    pub fn all() -> &'static [EffectorId] {
        &EFFECTOR_IDS
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for EffectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActId::Joint(j) => fmt::Display::fmt(j, f),
            ActId::Effector(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<D: MotorDriver + ?Sized> MotorDriver for Box<D> {
    fn read_position(&self) -> f64 {
        (**self).read_position()
    }

    fn read_velocity(&self) -> f64 {
        (**self).read_velocity()
    }

    fn write_output(&mut self, output: f64) -> Result<(), MechError> {
        (**self).write_output(output)
    }

    fn zero_position(&mut self) -> Result<(), MechError> {
        (**self).zero_position()
    }

    fn apply_current_limit(&mut self, amps: f64) -> Result<(), MechError> {
        (**self).apply_current_limit(amps)
    }

    fn set_brake_mode(&mut self, brake: bool) -> Result<(), MechError> {
        (**self).set_brake_mode(brake)
    }
}
