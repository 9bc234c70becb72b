//! # Effector telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::mech::EffectorId;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The game piece the superstructure is currently set up to handle.
///
/// Selected by preset activation, it picks which intake and outtake speeds the
/// end effector uses.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum GamePiece {
    Coral,
    Algae,
}

/// A command for one of the open-loop effectors.
///
/// Any new effector command preempts the one currently running on the same
/// effector.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub enum EffectorCmd {
    /// Run the end effector inwards at the current game piece's intake speed
    /// until stopped.
    Intake,

    /// Run the end effector outwards at the current game piece's outtake speed
    /// until stopped.
    Outtake,

    /// Intake for the configured timed run duration, then stop.
    TimedIntake,

    /// Outtake for the configured timed run duration, then stop.
    TimedOuttake,

    /// Run the climber upwards until stopped.
    ClimberUp,

    /// Run the climber downwards until stopped.
    ClimberDown,

    /// Stop the given effector.
    Stop(EffectorId),
}
