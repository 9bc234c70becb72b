//! Implementations for the PresetCoord state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::collections::{HashMap, HashSet};

// Internal
use super::{Params, PresetCoordError, PresetDef};
use crate::joint_ctrl::Joints;
use comms_if::eqpt::mech::{JointId, MotorDriver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Preset coordinator state
#[derive(Debug, Clone)]
pub struct PresetCoord {
    presets: HashMap<String, PresetDef>,

    /// The preset most recently activated, if the joints are still following
    /// it.
    active: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PresetCoord {
    /// Build the coordinator from the preset table.
    ///
    /// Each name must appear only once and every setpoint must be finite.
    pub fn new(params: Params) -> Result<Self, PresetCoordError> {
        let mut names = HashSet::new();

        for p in params.presets.iter() {
            if !names.insert(p.name.clone()) {
                return Err(PresetCoordError::DuplicatePreset(p.name.clone()));
            }

            if JointId::all().iter().any(|&id| !p.setpoint(id).is_finite()) {
                return Err(PresetCoordError::InvalidSetpoint(p.name.clone()));
            }
        }

        Ok(Self {
            presets: params.presets
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
            active: None,
        })
    }

    /// Send the setpoints of the named preset to all joints.
    ///
    /// Returns the preset's definition so that the caller can act on its game
    /// piece.
    pub fn activate<D: MotorDriver>(
        &mut self,
        name: &str,
        joints: &mut Joints<D>
    ) -> Result<&PresetDef, PresetCoordError> {
        let preset = self.presets
            .get(name)
            .ok_or_else(|| PresetCoordError::UnknownPreset(String::from(name)))?;

        for &id in JointId::all() {
            joints.get_mut(id).set_desired_position(preset.setpoint(id));
        }

        debug!(
            "Preset {} activated: elevator {}, elbow {}, wrist {}",
            preset.name, preset.elevator, preset.elbow, preset.wrist
        );

        self.active = Some(preset.name.clone());

        Ok(preset)
    }

    /// True once every joint has reached the active preset. Always false
    /// if no preset is active.
    pub fn is_complete<D: MotorDriver>(&self, joints: &Joints<D>) -> bool {
        self.active.is_some() && joints.iter().all(|j| j.at_setpoint())
    }

    /// Forget the active preset, for example after a joint was commanded on
    /// its own.
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&PresetDef> {
        self.presets.get(name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
