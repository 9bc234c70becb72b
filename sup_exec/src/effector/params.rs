//! Parameters structure for the effectors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{eqpt::mech::EffectorId, tc::GamePiece};
use serde::{Deserialize, Serialize};

use super::EffectorError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motor configuration of a single effector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorParams {
    /// Supply current limit.
    ///
    /// Units: amps
    pub current_limit_a: f64,

    /// Brake (true) or coast (false) when stopped.
    pub brake: bool,
}

/// Roller speeds used for one type of game piece.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PieceSpeeds {
    /// Normalised output when taking the piece in.
    pub intake: f64,

    /// Normalised output when ejecting the piece.
    pub outtake: f64,
}

/// Parameters for the effectors, as found in `effectors.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    pub end_effector: MotorParams,

    pub climber: MotorParams,

    pub coral: PieceSpeeds,

    pub algae: PieceSpeeds,

    /// Magnitude of the climber output, applied upwards or downwards.
    pub climber_speed: f64,

    /// Duration of a timed intake or outtake.
    ///
    /// Units: seconds
    pub timed_run_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn motor(&self, id: EffectorId) -> &MotorParams {
        match id {
            EffectorId::EndEffector => &self.end_effector,
            EffectorId::Climber => &self.climber,
        }
    }

    pub fn speeds(&self, piece: GamePiece) -> PieceSpeeds {
        match piece {
            GamePiece::Coral => self.coral,
            GamePiece::Algae => self.algae,
        }
    }

    pub fn validate(&self) -> Result<(), EffectorError> {
        let outputs = [
            ("coral.intake", self.coral.intake),
            ("coral.outtake", self.coral.outtake),
            ("algae.intake", self.algae.intake),
            ("algae.outtake", self.algae.outtake),
            ("climber_speed", self.climber_speed),
        ];

        for (name, val) in outputs.iter() {
            if !val.is_finite() || val.abs() > 1.0 {
                return Err(EffectorError::InvalidParams(format!(
                    "{} must be between -1 and 1, got {}", name, val
                )));
            }
        }

        if !self.timed_run_s.is_finite() || self.timed_run_s < 0.0 {
            return Err(EffectorError::InvalidParams(format!(
                "timed_run_s must not be negative, got {}", self.timed_run_s
            )));
        }

        Ok(())
    }
}
