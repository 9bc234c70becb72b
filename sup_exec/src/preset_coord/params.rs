//! Parameters structure for PresetCoord

use comms_if::{eqpt::mech::JointId, tc::GamePiece};
use serde::{Deserialize, Serialize};

/// A single named superstructure position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetDef {
    pub name: String,

    pub elevator: f64,

    pub elbow: f64,

    pub wrist: f64,

    /// The game piece this preset handles, selecting the end effector speeds.
    pub game_piece: GamePiece,
}

/// Parameters for PresetCoord, as found in `presets.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {
    #[serde(rename = "preset", default)]
    pub presets: Vec<PresetDef>,
}

impl PresetDef {
    /// The setpoint of the given joint.
    pub fn setpoint(&self, id: JointId) -> f64 {
        match id {
            JointId::Elevator => self.elevator,
            JointId::Elbow => self.elbow,
            JointId::Wrist => self.wrist,
        }
    }
}
