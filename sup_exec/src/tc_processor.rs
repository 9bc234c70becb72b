//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::{
    eqpt::mech::MotorDriver,
    tc::{Tc, TcResponse},
};
use crate::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand at session time `now_s`.
///
/// Mutates the datastore to send commands to different modules. While the
/// superstructure is safe only `MakeUnsafe` is executed.
pub fn exec<D: MotorDriver>(ds: &mut DataStore<D>, tc: &Tc, now_s: f64) -> TcResponse {

    if ds.safe && *tc != Tc::MakeUnsafe {
        debug!("In safe mode, rejecting {:?}", tc);
        return TcResponse::CannotExecute;
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        },
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            if ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err() {
                return TcResponse::CannotExecute;
            }
        },
        Tc::ToggleMode => {
            ds.mode_arb.toggle();
        },
        Tc::SetMode(m) => {
            ds.mode_arb.set(*m);
        },
        Tc::ActivatePreset(name) => {
            debug!("Recieved ActivatePreset({}) command", name);
            if let Err(e) = ds.activate_preset(name) {
                warn!("Cannot activate preset: {}", e);
                return TcResponse::Invalid(e.to_string());
            }
        },
        Tc::SetPosition { joint, position } => {
            if !position.is_finite() {
                return invalid(format!("{} position must be finite", joint));
            }
            debug!("Recieved SetPosition({}, {}) command", joint, position);

            ds.joints.get_mut(*joint).set_desired_position(*position);
            ds.preset_coord.clear_active();
        },
        Tc::AdjustOffset { joint, delta } => {
            if !delta.is_finite() {
                return invalid(format!("{} offset adjustment must be finite", joint));
            }
            debug!("Recieved AdjustOffset({}, {}) command", joint, delta);

            ds.joints.get_mut(*joint).adjust_offset(*delta);
        },
        Tc::ManualSpeed { joint, speed } => {
            if !speed.is_finite() || speed.abs() > 1.0 {
                return invalid(format!(
                    "{} manual speed must be between -1 and 1, got {}", joint, speed
                ));
            }

            ds.manual_speeds.insert(*joint, *speed);
        },
        Tc::StopJoint(joint) => {
            debug!("Recieved StopJoint({}) command", joint);

            ds.manual_speeds.insert(*joint, 0.0);
            ds.preset_coord.clear_active();

            if let Err(e) = ds.joints.get_mut(*joint).hold() {
                warn!("Could not stop {}: {}", joint, e);
                return TcResponse::CannotExecute;
            }
        },
        Tc::Effector(cmd) => {
            debug!("Recieved Effector({:?}) command", cmd);

            if let Err(e) = ds.exec_effector_cmd(*cmd, now_s) {
                warn!("Could not execute effector command: {}", e);
                return TcResponse::CannotExecute;
            }
        }
    }

    TcResponse::Ok
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn invalid(msg: String) -> TcResponse {
    warn!("Invalid TC: {}", msg);
    TcResponse::Invalid(msg)
}
