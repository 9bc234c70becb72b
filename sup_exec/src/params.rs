//! # Superstructure Executable Parameters
//!
//! This module provide parameters for the superstructure executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::OperatingMode;
use serde::{Deserialize, Serialize};

use crate::{effector, joint_ctrl, preset_coord};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters from `sup_exec.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupExecParams {

    /// Target period of one cycle of the main loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Minimum time between recomputes of the joint control law.
    ///
    /// Units: seconds
    pub update_interval_s: f64,

    /// Operating mode at start up.
    pub initial_mode: OperatingMode,

    /// Rate the simulated motors move at under full output.
    ///
    /// Units: sensor units/second
    pub sim_max_rate_per_s: f64,
}

/// Errors in the superstructure parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error(transparent)]
    Load(#[from] util::params::LoadError),

    #[error("Invalid executable parameters: {0}")]
    InvalidExec(String),
}

/// Every parameter set needed to build the superstructure.
#[derive(Debug, Clone)]
pub struct SupParams {
    pub exec: SupExecParams,
    pub joints: joint_ctrl::JointsParams,
    pub presets: preset_coord::Params,
    pub effectors: effector::Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SupExecParams {
    /// Check the cycle period, update interval and simulated motor rate are
    /// all finite and positive.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let positive = [
            ("cycle_period_s", self.cycle_period_s),
            ("update_interval_s", self.update_interval_s),
            ("sim_max_rate_per_s", self.sim_max_rate_per_s),
        ];

        for (name, val) in positive.iter() {
            if !val.is_finite() || *val <= 0.0 {
                return Err(ParamsError::InvalidExec(format!(
                    "{} must be a positive number, got {}", name, val
                )));
            }
        }

        Ok(())
    }
}

impl SupParams {
    /// Load all parameter files from the parameters directory.
    pub fn load() -> Result<Self, ParamsError> {
        let exec: SupExecParams = util::params::load("sup_exec.toml")?;
        exec.validate()?;

        Ok(Self {
            exec,
            joints: util::params::load("joints.toml")?,
            presets: util::params::load("presets.toml")?,
            effectors: util::params::load("effectors.toml")?,
        })
    }
}

#[cfg(test)]
impl SupParams {
    /// The parameter files shipped with the software.
    pub(crate) fn shipped() -> Self {
        Self {
            exec: util::params::parse(include_str!("../../params/sup_exec.toml")).unwrap(),
            joints: util::params::parse(include_str!("../../params/joints.toml")).unwrap(),
            presets: util::params::parse(include_str!("../../params/presets.toml")).unwrap(),
            effectors: util::params::parse(include_str!("../../params/effectors.toml")).unwrap(),
        }
    }
}
