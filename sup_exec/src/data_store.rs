//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use comms_if::{
    eqpt::mech::{ActId, EffectorId, JointId, MotorDriver},
    tc::{EffectorCmd, GamePiece, OperatingMode},
};
use log::{info, warn};
use serde::Serialize;
use util::module::State;

use crate::{
    effector::{self, EffectorError, EffectorSnapshot, IntakeEffector},
    joint_ctrl::{self, JointCtrlError, JointSnapshot, Joints},
    mode_arb::ModeArbiter,
    params::{ParamsError, SupParams},
    preset_coord::{PresetCoord, PresetCoordError},
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the superstructure has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize)]
pub enum SafeModeCause {
    MakeSafeTc,
    Shutdown,
}

/// Errors which can occur while building the data store.
#[derive(Debug, thiserror::Error)]
pub enum DataStoreInitError {
    #[error("{0}")]
    ExecParams(ParamsError),

    #[error("Failed to initialise the {0} joint: {1}")]
    Joint(JointId, JointCtrlError),

    #[error("Failed to initialise the {0}: {1}")]
    Effector(EffectorId, EffectorError),

    #[error("Invalid effector parameters: {0}")]
    EffectorParams(EffectorError),

    #[error("Invalid preset table: {0}")]
    Presets(PresetCoordError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore<D> {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session time of the current cycle
    pub now_s: f64,

    // Safe mode variables
    /// Determines if the superstructure is in safe mode.
    pub safe: bool,

    /// Gives the reason for the superstructure being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Modules
    pub mode_arb: ModeArbiter,

    pub joints: Joints<D>,

    pub end_effector: IntakeEffector<D>,

    pub climber: IntakeEffector<D>,

    pub preset_coord: PresetCoord,

    pub effector_params: effector::Params,

    /// The game piece selected by the last activated preset
    pub game_piece: GamePiece,

    /// Speed applied to each joint in manual mode
    pub manual_speeds: HashMap<JointId, f64>,

    // Module outputs
    pub joint_outputs: HashMap<JointId, joint_ctrl::OutputData>,
    pub joint_status_rpts: HashMap<JointId, joint_ctrl::StatusReport>,

    /// True once completion of the active preset has been reported
    preset_complete_reported: bool,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

/// Telemetry snapshot of the whole superstructure.
#[derive(Debug, Clone, Serialize)]
pub struct SupSnapshot {
    pub time_s: f64,
    pub num_cycles: u64,
    pub safe: bool,
    pub safe_cause: Option<SafeModeCause>,
    pub mode: OperatingMode,
    pub active_preset: Option<String>,
    pub preset_complete: bool,
    pub game_piece: GamePiece,
    pub joints: Vec<JointSnapshot>,
    pub effectors: Vec<EffectorSnapshot>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<D: MotorDriver> DataStore<D> {
    /// Build every module of the superstructure, taking each actuator's
    /// driver from `make_driver`.
    pub fn new<F>(params: &SupParams, mut make_driver: F) -> Result<Self, DataStoreInitError>
    where
        F: FnMut(ActId) -> D
    {
        params.exec.validate().map_err(DataStoreInitError::ExecParams)?;
        params.effectors.validate().map_err(DataStoreInitError::EffectorParams)?;

        let joints = Joints::new(
            &params.joints,
            params.exec.update_interval_s,
            |id| make_driver(ActId::Joint(id))
        ).map_err(|(id, e)| DataStoreInitError::Joint(id, e))?;

        let mut effector = |id: EffectorId| {
            IntakeEffector::new(
                id,
                params.effectors.motor(id),
                make_driver(ActId::Effector(id))
            ).map_err(|e| DataStoreInitError::Effector(id, e))
        };
        let end_effector = effector(EffectorId::EndEffector)?;
        let climber = effector(EffectorId::Climber)?;

        let preset_coord = PresetCoord::new(params.presets.clone())
            .map_err(DataStoreInitError::Presets)?;

        Ok(Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            now_s: 0.0,
            safe: false,
            safe_cause: None,
            mode_arb: ModeArbiter::new(params.exec.initial_mode),
            joints,
            end_effector,
            climber,
            preset_coord,
            effector_params: params.effectors.clone(),
            game_piece: GamePiece::Coral,
            manual_speeds: JointId::all().iter().map(|&id| (id, 0.0)).collect(),
            joint_outputs: HashMap::new(),
            joint_status_rpts: HashMap::new(),
            preset_complete_reported: false,
            num_consec_cycle_overruns: 0,
        })
    }

    /// Puts the superstructure into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.stop_all();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, now_s: f64) {
        let cycles_per_second = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.joint_outputs.clear();
        self.joint_status_rpts.clear();

        self.now_s = now_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Move all joints to the named preset.
    pub fn activate_preset(&mut self, name: &str) -> Result<(), PresetCoordError> {
        let preset = self.preset_coord.activate(name, &mut self.joints)?;

        if preset.game_piece != self.game_piece {
            info!("Game piece set to {:?}", preset.game_piece);
        }
        self.game_piece = preset.game_piece;

        self.preset_complete_reported = false;

        Ok(())
    }

    /// Execute an effector command, replacing whatever that effector was doing.
    pub fn exec_effector_cmd(&mut self, cmd: EffectorCmd, now_s: f64) -> Result<(), EffectorError> {
        let speeds = self.effector_params.speeds(self.game_piece);
        let timed_run_s = self.effector_params.timed_run_s;
        let climber_speed = self.effector_params.climber_speed;

        match cmd {
            EffectorCmd::Intake => self.end_effector.run(speeds.intake),
            EffectorCmd::Outtake => self.end_effector.run(speeds.outtake),
            EffectorCmd::TimedIntake => self.end_effector.run_for(speeds.intake, timed_run_s, now_s),
            EffectorCmd::TimedOuttake => self.end_effector.run_for(speeds.outtake, timed_run_s, now_s),
            EffectorCmd::ClimberUp => self.climber.run(climber_speed),
            EffectorCmd::ClimberDown => self.climber.run(-climber_speed),
            EffectorCmd::Stop(EffectorId::EndEffector) => self.end_effector.stop(),
            EffectorCmd::Stop(EffectorId::Climber) => self.climber.stop(),
        }
    }

    /// Run one tick of the whole superstructure at session time `now_s`.
    ///
    /// Effectors are processed first, then the joints. Errors are logged and
    /// never stop the tick.
    pub fn proc(&mut self, now_s: f64) {
        if self.safe {
            self.stop_all();
            return;
        }

        // ---- EFFECTORS ----

        let eff_input = effector::InputData { now_s };
        for eff in [&mut self.end_effector, &mut self.climber].iter_mut() {
            match eff.proc(&eff_input) {
                Ok((_, r)) if r.timed_run_complete => info!("{} timed run complete", eff.id()),
                Ok(_) => (),
                Err(e) => warn!("Error during {} processing: {}", eff.id(), e),
            }
        }

        // ---- JOINTS ----

        let mode = self.mode_arb.mode();
        for joint in self.joints.iter_mut() {
            let id = joint.id();
            let input = joint_ctrl::InputData {
                now_s,
                mode,
                manual_speed: self.manual_speeds.get(&id).copied().unwrap_or(0.0),
            };

            match joint.proc(&input) {
                Ok((o, r)) => {
                    self.joint_outputs.insert(id, o);
                    self.joint_status_rpts.insert(id, r);
                },
                Err(e) => warn!("Error during {} JointCtrl processing: {}", id, e),
            }
        }

        // ---- PRESET COMPLETION ----

        if !self.preset_complete_reported && self.preset_coord.is_complete(&self.joints) {
            if let Some(name) = self.preset_coord.active() {
                info!("Preset {} reached", name);
            }
            self.preset_complete_reported = true;
        }
    }

    /// Visit every actuator driver, for example to step a simulation.
    pub fn for_each_driver<F>(&mut self, mut f: F)
    where
        F: FnMut(ActId, &mut D)
    {
        for joint in self.joints.iter_mut() {
            f(ActId::Joint(joint.id()), joint.driver_mut());
        }
        f(ActId::Effector(EffectorId::EndEffector), self.end_effector.driver_mut());
        f(ActId::Effector(EffectorId::Climber), self.climber.driver_mut());
    }

    /// Take a telemetry snapshot of the superstructure.
    pub fn snapshot(&self) -> SupSnapshot {
        SupSnapshot {
            time_s: self.now_s,
            num_cycles: self.num_cycles as u64,
            safe: self.safe,
            safe_cause: self.safe_cause,
            mode: self.mode_arb.mode(),
            active_preset: self.preset_coord.active().map(String::from),
            preset_complete: self.preset_coord.is_complete(&self.joints),
            game_piece: self.game_piece,
            joints: self.joints.iter().map(|j| j.snapshot()).collect(),
            effectors: vec![self.end_effector.snapshot(), self.climber.snapshot()],
        }
    }

    /// Stop every joint, holding against gravity, and every effector.
    fn stop_all(&mut self) {
        for joint in self.joints.iter_mut() {
            if let Err(e) = joint.stop() {
                warn!("Could not stop {}: {}", joint.id(), e);
            }
        }

        for eff in [&mut self.end_effector, &mut self.climber].iter_mut() {
            if let Err(e) = eff.stop() {
                warn!("Could not stop {}: {}", eff.id(), e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{
        joint_ctrl::{JointsParams, Params as JointParams},
        sim_mech::SimMotor,
    };

    pub(crate) const DT_S: f64 = 0.02;

    /// Shipped parameters with plain proportional, gravity free joints, so
    /// the simulated approach is easy to predict.
    pub(crate) fn sim_params() -> SupParams {
        let mut params = SupParams::shipped();
        params.joints = JointsParams {
            elevator: JointParams::p_only(0.2),
            elbow: JointParams::p_only(0.2),
            wrist: JointParams::p_only(0.2),
        };
        params
    }

    pub(crate) fn sim_store() -> DataStore<SimMotor> {
        DataStore::new(&sim_params(), |_| SimMotor::new(50.0)).unwrap()
    }

    /// Run one cycle the way the executable does.
    pub(crate) fn step(ds: &mut DataStore<SimMotor>) {
        let now_s = ds.num_cycles as f64 * DT_S;
        ds.cycle_start(1.0 / DT_S, now_s);
        ds.proc(now_s);
        ds.for_each_driver(|_, d| d.advance(DT_S));
        ds.cycle_end();
    }

    #[test]
    fn test_shipped_params_build() {
        let ds = DataStore::new(&SupParams::shipped(), |_| SimMotor::new(50.0)).unwrap();

        assert_eq!(ds.mode_arb.mode(), OperatingMode::Automatic);
        assert_eq!(ds.game_piece, GamePiece::Coral);
        assert!(!ds.safe);
        assert!(ds.preset_coord.len() >= 13);
    }

    #[test]
    fn test_init_errors() {
        let mut params = sim_params();
        params.joints.wrist.reverse_limit = 200.0;

        match DataStore::new(&params, |_| SimMotor::new(50.0)) {
            Err(DataStoreInitError::Joint(JointId::Wrist, _)) => (),
            Err(e) => panic!("Expected a wrist init error, got {}", e),
            Ok(_) => panic!("Expected a wrist init error"),
        }

        let mut params = sim_params();
        params.exec.cycle_period_s = -0.02;

        match DataStore::new(&params, |_| SimMotor::new(50.0)) {
            Err(DataStoreInitError::ExecParams(ParamsError::InvalidExec(_))) => (),
            Err(e) => panic!("Expected an exec params error, got {}", e),
            Ok(_) => panic!("Expected an exec params error"),
        }

        let mut params = sim_params();
        params.presets.presets.push(params.presets.presets[0].clone());

        match DataStore::new(&params, |_| SimMotor::new(50.0)) {
            Err(DataStoreInitError::Presets(PresetCoordError::DuplicatePreset(_))) => (),
            Err(e) => panic!("Expected a duplicate preset error, got {}", e),
            Ok(_) => panic!("Expected a duplicate preset error"),
        }
    }

    #[test]
    fn test_drive_to_preset() {
        let mut ds = sim_store();
        ds.activate_preset("L4").unwrap();

        let mut reached = false;
        for _ in 0..500 {
            step(&mut ds);
            if ds.preset_coord.is_complete(&ds.joints) {
                reached = true;
                break;
            }
        }
        assert!(reached, "L4 not reached: {:#?}", ds.snapshot());

        let snap = ds.snapshot();
        assert!(snap.preset_complete);
        assert_eq!(snap.active_preset.as_deref(), Some("L4"));
        for j in snap.joints.iter() {
            assert!(j.at_setpoint);
        }
    }

    #[test]
    fn test_game_piece_selects_speeds() {
        let mut ds = sim_store();

        ds.exec_effector_cmd(EffectorCmd::Intake, 0.0).unwrap();
        assert_eq!(ds.end_effector.last_output(), -0.25);

        ds.activate_preset("Processor").unwrap();
        assert_eq!(ds.game_piece, GamePiece::Algae);
        ds.exec_effector_cmd(EffectorCmd::Intake, 0.0).unwrap();
        assert_eq!(ds.end_effector.last_output(), -1.0);

        // Every preset names its piece, including the non-scoring ones
        ds.activate_preset("AlgaeShoot").unwrap();
        assert_eq!(ds.game_piece, GamePiece::Coral);
        ds.activate_preset("GroundAlgae").unwrap();
        assert_eq!(ds.game_piece, GamePiece::Algae);
        ds.activate_preset("Stow").unwrap();
        assert_eq!(ds.game_piece, GamePiece::Coral);

        ds.activate_preset("L1").unwrap();
        ds.exec_effector_cmd(EffectorCmd::Outtake, 0.0).unwrap();
        assert_eq!(ds.end_effector.last_output(), 0.25);
    }

    #[test]
    fn test_timed_outtake() {
        let mut ds = sim_store();
        ds.exec_effector_cmd(EffectorCmd::TimedOuttake, 0.0).unwrap();

        // Shipped duration is 0.6 s, at 20 ms per cycle
        for _ in 0..30 {
            step(&mut ds);
            assert_eq!(ds.end_effector.last_output(), 0.25);
        }
        for _ in 0..2 {
            step(&mut ds);
        }
        assert_eq!(ds.end_effector.last_output(), 0.0);
    }

    #[test]
    fn test_climber() {
        let mut ds = sim_store();

        ds.exec_effector_cmd(EffectorCmd::ClimberDown, 0.0).unwrap();
        assert_eq!(ds.climber.last_output(), -0.5);
        ds.exec_effector_cmd(EffectorCmd::ClimberUp, 0.0).unwrap();
        assert_eq!(ds.climber.last_output(), 0.5);
        ds.exec_effector_cmd(EffectorCmd::Stop(EffectorId::Climber), 0.0).unwrap();
        assert_eq!(ds.climber.last_output(), 0.0);
    }

    #[test]
    fn test_safe_mode_stops_everything() {
        let mut params = sim_params();
        params.joints.elbow.gravity = joint_ctrl::GravityModel::Constant { k_g: 0.1 };
        let mut ds = DataStore::new(&params, |_| SimMotor::new(50.0)).unwrap();

        ds.activate_preset("L3").unwrap();
        ds.exec_effector_cmd(EffectorCmd::Intake, 0.0).unwrap();
        step(&mut ds);
        assert!(ds.joints.elevator.last_output() > 0.0);

        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert!(ds.safe);

        for _ in 0..5 {
            step(&mut ds);
            assert_eq!(ds.joints.elevator.driver().output(), 0.0);
            assert_eq!(ds.joints.elbow.driver().output(), 0.1);
            assert_eq!(ds.end_effector.driver().output(), 0.0);
        }

        // Only the root cause clears safe mode
        assert_eq!(ds.make_unsafe(SafeModeCause::Shutdown), Err(()));
        assert!(ds.safe);
        assert_eq!(ds.make_unsafe(SafeModeCause::MakeSafeTc), Ok(()));
        assert!(!ds.safe);

        // The joints resume towards the preset
        step(&mut ds);
        assert!(ds.joints.elevator.last_output() > 0.0);
    }

    #[test]
    fn test_no_integral_windup_in_safe_mode() {
        let mut params = sim_params();
        params.joints.elevator = JointParams::p_only(0.0);
        params.joints.elevator.k_i = 0.01;
        let mut ds = DataStore::new(&params, |_| SimMotor::new(50.0)).unwrap();

        ds.activate_preset("L4").unwrap();
        step(&mut ds);
        assert_eq!(ds.joints.elevator.last_output(), 0.0);

        // 30 s in safe mode, the elevator stays at the bottom
        ds.make_safe(SafeModeCause::MakeSafeTc);
        for _ in 0..1500 {
            step(&mut ds);
        }
        assert_eq!(ds.joints.elevator.driver().read_position(), 0.0);
        ds.make_unsafe(SafeModeCause::MakeSafeTc).unwrap();

        // The first tick back doesn't integrate the time spent safe
        step(&mut ds);
        assert_eq!(ds.joints.elevator.last_output(), 0.0);
    }

    #[test]
    fn test_manual_mode() {
        let mut ds = sim_store();
        ds.mode_arb.set(OperatingMode::Manual);
        ds.manual_speeds.insert(JointId::Wrist, 0.4);

        step(&mut ds);

        assert_eq!(ds.joints.wrist.last_output(), 0.4);
        assert_eq!(ds.joints.elbow.last_output(), 0.0);
        assert!(ds.joints.wrist.driver().read_position() > 0.0);
    }

    #[test]
    fn test_one_hz_flag() {
        let mut ds = sim_store();
        let mut flags = Vec::new();

        for _ in 0..101 {
            step(&mut ds);
            flags.push(ds.is_1_hz_cycle);
        }

        let set: Vec<usize> = flags.iter()
            .enumerate()
            .filter(|(_, &f)| f)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(set, vec![0, 50, 100]);
    }

    #[test]
    fn test_snapshot_serialises() {
        let mut ds = sim_store();
        step(&mut ds);

        let json = serde_json::to_value(ds.snapshot()).unwrap();
        assert_eq!(json["mode"], "Automatic");
        assert_eq!(json["joints"].as_array().map(|j| j.len()), Some(3));
        assert_eq!(json["effectors"][1]["id"], "Climber");
    }
}
