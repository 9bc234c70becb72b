//! Implementations for the JointCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{edge_stop, FeedforwardModel, JointCtrlError, Params, PidController};
use crate::update_sched::UpdateScheduler;
use comms_if::{
    eqpt::mech::{JointId, MotorDriver},
    tc::OperatingMode,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint control module state
pub struct JointCtrl<D> {
    id: JointId,

    params: Params,

    driver: D,

    pid: PidController,

    feedforward: Box<dyn FeedforwardModel + Send>,

    sched: UpdateScheduler,

    /// The position commanded by the operator or a preset. May lie outside
    /// the soft limits, it is clamped when used.
    setpoint: f64,

    /// Operator trim added to the setpoint.
    trim_offset: f64,

    /// The last output written to the driver, re-issued between recomputes.
    last_output: f64,
}

/// Input data to Joint Control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Current session time.
    ///
    /// Units: seconds
    pub now_s: f64,

    /// The operating mode for this tick.
    pub mode: OperatingMode,

    /// Raw speed to apply in manual mode, between -1 and +1.
    pub manual_speed: f64,
}

/// Output of one JointCtrl tick.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct OutputData {
    /// The normalised output written to the driver this tick.
    pub output: f64,

    /// True if the output was computed this tick, false if the previous one
    /// was re-issued.
    pub recomputed: bool,
}

/// Status report for JointCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct StatusReport {
    /// The demand was zeroed by the forward soft limit
    pub fwd_limited: bool,

    /// The demand was zeroed by the reverse soft limit
    pub rev_limited: bool,

    /// The setpoint plus trim lay outside the soft limits and was clamped
    pub target_clamped: bool,

    /// The final output was outside [-1, 1] and was clamped
    pub output_saturated: bool,

    /// The computed output was not finite and was replaced by zero
    pub output_non_finite: bool,
}

/// Read-only view of a joint, used for telemetry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JointSnapshot {
    pub id: JointId,
    pub position: f64,
    pub velocity: f64,
    pub setpoint: f64,
    pub trim_offset: f64,
    pub target: f64,
    pub output: f64,
    pub at_setpoint: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: MotorDriver> JointCtrl<D> {
    /// Create a new joint controller.
    ///
    /// The sensor is zeroed, so the joint must be at its home position when
    /// this is called. The motor's current limit and brake mode are then
    /// configured. Any driver error here is fatal.
    pub fn new(
        id: JointId,
        params: Params,
        update_interval_s: f64,
        mut driver: D
    ) -> Result<Self, JointCtrlError> {
        params.validate()?;

        if !update_interval_s.is_finite() || update_interval_s <= 0.0 {
            return Err(JointCtrlError::InvalidParams(format!(
                "update interval must be a positive number of seconds, got {}",
                update_interval_s
            )));
        }

        driver.zero_position()?;
        driver.apply_current_limit(params.current_limit_a)?;
        driver.set_brake_mode(true)?;

        Ok(Self {
            id,
            pid: PidController::new(params.k_p, params.k_i, params.k_d),
            feedforward: Box::new(params.gravity),
            params,
            driver,
            sched: UpdateScheduler::new(update_interval_s),
            setpoint: 0.0,
            trim_offset: 0.0,
            last_output: 0.0,
        })
    }

    /// Replace the feedforward model built from the parameters.
    pub fn with_feedforward<F>(mut self, feedforward: F) -> Self
    where
        F: FeedforwardModel + Send + 'static
    {
        self.feedforward = Box::new(feedforward);
        self
    }

    /// Set the position the joint should move to.
    ///
    /// Nothing moves until the next automatic recompute.
    pub fn set_desired_position(&mut self, position: f64) {
        if !position.is_finite() {
            warn!("{}: ignoring non-finite setpoint {}", self.id, position);
            return;
        }
        self.setpoint = position;
    }

    /// Add `delta` to the trim offset.
    pub fn adjust_offset(&mut self, delta: f64) {
        if !delta.is_finite() {
            warn!("{}: ignoring non-finite offset adjustment {}", self.id, delta);
            return;
        }
        self.trim_offset += delta;
    }

    /// Returns true if the joint is within tolerance of its target.
    ///
    /// The position is sampled now, so this may change between ticks.
    pub fn at_setpoint(&self) -> bool {
        (self.target() - self.driver.read_position()).abs() <= self.params.tolerance
    }

    /// Stop driving the joint, leaving only the feedforward term to hold it.
    pub fn stop(&mut self) -> Result<(), JointCtrlError> {
        let ff = self.feedforward.output(self.driver.read_position());
        let output = if ff.is_finite() {
            ff.max(-1.0).min(1.0)
        }
        else {
            0.0
        };

        self.suspend_auto();

        self.write(output)
    }

    /// Stop the joint and make its current position the new target, so that
    /// automatic control holds it where it is.
    pub fn hold(&mut self) -> Result<(), JointCtrlError> {
        self.setpoint = self.driver.read_position() - self.trim_offset;
        self.stop()
    }

    /// The setpoint plus trim, clamped into the soft limits.
    pub fn target(&self) -> f64 {
        (self.setpoint + self.trim_offset)
            .max(self.params.reverse_limit)
            .min(self.params.forward_limit)
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn trim_offset(&self) -> f64 {
        self.trim_offset
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Take a snapshot of the joint for telemetry.
    pub fn snapshot(&self) -> JointSnapshot {
        JointSnapshot {
            id: self.id,
            position: self.driver.read_position(),
            velocity: self.driver.read_velocity(),
            setpoint: self.setpoint,
            trim_offset: self.trim_offset,
            target: self.target(),
            output: self.last_output,
            at_setpoint: self.at_setpoint(),
        }
    }

    /// Leave automatic control. It recomputes on its first tick back and
    /// doesn't integrate the time spent away.
    fn suspend_auto(&mut self) {
        self.sched.reset();
        self.pid.pause();
    }

    /// Apply the edge stop and feedforward to a drive demand, producing the
    /// final output.
    fn shape_output(&self, position: f64, demand: f64, report: &mut StatusReport) -> f64 {
        let fwd = self.params.forward_limit;
        let rev = self.params.reverse_limit;

        let drive = edge_stop(position, demand, rev, fwd);
        report.fwd_limited = position >= fwd && demand > 0.0;
        report.rev_limited = position <= rev && demand < 0.0;

        let output = drive + self.feedforward.output(position);

        if !output.is_finite() {
            warn!("{}: non-finite output computed, commanding zero", self.id);
            report.output_non_finite = true;
            return 0.0;
        }

        let clamped = output.max(-1.0).min(1.0);
        report.output_saturated = clamped != output;
        clamped
    }

    /// Write an output to the driver. On failure a zero output is attempted
    /// before the error is returned.
    fn write(&mut self, output: f64) -> Result<(), JointCtrlError> {
        match self.driver.write_output(output) {
            Ok(()) => {
                self.last_output = output;
                Ok(())
            },
            Err(e) => {
                warn!("{}: failed to write output {:.4}: {}", self.id, output, e);

                if let Err(e) = self.driver.write_output(0.0) {
                    warn!("{}: failed to write zero output: {}", self.id, e);
                }
                self.last_output = 0.0;

                Err(JointCtrlError::Driver(e))
            }
        }
    }
}

impl<D: MotorDriver> State for JointCtrl<D> {
    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = JointCtrlError;

    /// Perform cyclic processing of Joint Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();
        let position = self.driver.read_position();

        let (output, recomputed) = match input_data.mode {
            OperatingMode::Manual => {
                self.suspend_auto();

                let out = self.shape_output(position, input_data.manual_speed, &mut report);
                (out, true)
            },
            OperatingMode::Automatic => {
                if self.sched.is_due(input_data.now_s) {
                    let target = self.target();
                    report.target_clamped = target != self.setpoint + self.trim_offset;

                    let demand = self.pid.get(target - position, input_data.now_s);
                    let out = self.shape_output(position, demand, &mut report);
                    (out, true)
                }
                else {
                    (self.last_output, false)
                }
            }
        };

        self.write(output)?;

        trace!(
            "{} {:?}: pos {:.3}, target {:.3}, output {:.4}{}",
            self.id,
            input_data.mode,
            position,
            self.target(),
            output,
            if recomputed { "" } else { " (held)" }
        );

        Ok((OutputData { output, recomputed }, report))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{joint_ctrl::GravityModel, sim_mech::SimMotor};
    use comms_if::eqpt::mech::MechError;

    const INTERVAL_S: f64 = 0.05;

    fn joint(params: Params) -> JointCtrl<SimMotor> {
        JointCtrl::new(JointId::Elbow, params, INTERVAL_S, SimMotor::new(50.0)).unwrap()
    }

    fn auto(now_s: f64) -> InputData {
        InputData {
            now_s,
            mode: OperatingMode::Automatic,
            manual_speed: 0.0,
        }
    }

    fn manual(now_s: f64, manual_speed: f64) -> InputData {
        InputData {
            now_s,
            mode: OperatingMode::Manual,
            manual_speed,
        }
    }

    #[test]
    fn test_construction() {
        let mut motor = SimMotor::new(50.0);
        motor.set_position(12.0);

        let jc = JointCtrl::new(JointId::Wrist, Params::p_only(0.1), INTERVAL_S, motor).unwrap();

        assert_eq!(jc.driver().read_position(), 0.0);
        assert_eq!(jc.driver().num_zeroes(), 1);
        assert_eq!(jc.driver().current_limit_a(), Some(40.0));
        assert!(jc.driver().brake());
        assert_eq!(jc.setpoint(), 0.0);
        assert!(jc.at_setpoint());
    }

    #[test]
    fn test_construction_rejects_bad_config() {
        let mut params = Params::p_only(0.1);
        params.reverse_limit = 10.0;
        params.forward_limit = -10.0;

        match JointCtrl::new(JointId::Elevator, params, INTERVAL_S, SimMotor::new(1.0)) {
            Err(JointCtrlError::InvalidParams(_)) => (),
            Err(e) => panic!("Expected InvalidParams, got {}", e),
            Ok(_) => panic!("Expected InvalidParams, got a controller"),
        }

        for &interval in [0.0, -0.05, f64::NAN].iter() {
            match JointCtrl::new(JointId::Wrist, Params::p_only(0.1), interval, SimMotor::new(1.0)) {
                Err(JointCtrlError::InvalidParams(_)) => (),
                Err(e) => panic!("Expected InvalidParams for {}, got {}", interval, e),
                Ok(_) => panic!("Expected InvalidParams for {}, got a controller", interval),
            }
        }

        // Current limit rejected by the driver
        let mut params = Params::p_only(0.1);
        params.current_limit_a = 0.0;

        match JointCtrl::new(JointId::Elevator, params, INTERVAL_S, SimMotor::new(1.0)) {
            Err(JointCtrlError::Driver(MechError::ConfigRejected(_))) => (),
            Err(e) => panic!("Expected a driver error, got {}", e),
            Ok(_) => panic!("Expected a driver error, got a controller"),
        }
    }

    #[test]
    fn test_edge_stop_in_manual() {
        let mut params = Params::p_only(0.1);
        params.reverse_limit = 0.0;
        params.forward_limit = 45.0;
        let mut jc = joint(params);

        jc.driver_mut().set_position(45.0);
        let (out, report) = jc.proc(&manual(0.0, 0.8)).unwrap();
        assert_eq!(out.output, 0.0);
        assert!(report.fwd_limited);

        // Retreating from the limit is unrestricted
        let (out, report) = jc.proc(&manual(0.02, -0.8)).unwrap();
        assert_eq!(out.output, -0.8);
        assert!(!report.fwd_limited);

        jc.driver_mut().set_position(-1.0);
        let (out, report) = jc.proc(&manual(0.04, -0.3)).unwrap();
        assert_eq!(out.output, 0.0);
        assert!(report.rev_limited);
    }

    #[test]
    fn test_edge_stop_excludes_feedforward() {
        let mut params = Params::p_only(0.1);
        params.forward_limit = 10.0;
        params.gravity = GravityModel::Constant { k_g: 0.1 };
        let mut jc = joint(params);

        jc.driver_mut().set_position(10.0);
        let (out, _) = jc.proc(&manual(0.0, 0.5)).unwrap();
        assert_eq!(out.output, 0.1);
    }

    #[test]
    fn test_automatic_edge_stop() {
        let mut params = Params::p_only(1.0);
        params.forward_limit = 10.0;
        let mut jc = joint(params);

        // Pushed past the limit while the target is above the joint
        jc.set_desired_position(50.0);
        jc.driver_mut().set_position(10.5);

        let (out, report) = jc.proc(&auto(0.0)).unwrap();

        // The target is clamped to 10, the error is -0.5, so the PID drives
        // the joint back down which is allowed
        assert!(report.target_clamped);
        assert_eq!(out.output, -0.5);
        assert!(!report.fwd_limited);
    }

    #[test]
    fn test_cumulative_trim() {
        let mut a = joint(Params::p_only(0.1));
        let mut b = joint(Params::p_only(0.1));

        a.adjust_offset(0.1);
        a.adjust_offset(0.2);
        b.adjust_offset(0.1 + 0.2);

        assert_eq!(a.trim_offset(), b.trim_offset());
        assert_eq!(a.target(), b.target());

        let (out_a, _) = a.proc(&auto(0.0)).unwrap();
        let (out_b, _) = b.proc(&auto(0.0)).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_idempotent_setpoint() {
        let mut params = Params::p_only(0.05);
        params.k_i = 0.2;
        params.k_d = 0.01;

        let mut once = joint(params.clone());
        let mut twice = joint(params);

        once.set_desired_position(30.0);
        twice.set_desired_position(30.0);
        twice.set_desired_position(30.0);

        for i in 0..20 {
            let t = i as f64 * 0.02;
            let (out_once, _) = once.proc(&auto(t)).unwrap();
            let (out_twice, _) = twice.proc(&auto(t)).unwrap();
            assert_eq!(out_once, out_twice);

            // Calling it again mid-approach doesn't disturb the loop either
            twice.set_desired_position(30.0);
        }
    }

    #[test]
    fn test_rate_limiting() {
        let mut params = Params::p_only(0.01);
        params.k_i = 0.5;
        let mut jc = joint(params);
        jc.set_desired_position(20.0);

        let (first, _) = jc.proc(&auto(1.0)).unwrap();
        assert!(first.recomputed);

        // 10 ms later the previous output is re-issued unchanged
        let (held, _) = jc.proc(&auto(1.01)).unwrap();
        assert!(!held.recomputed);
        assert_eq!(held.output, first.output);
        assert_eq!(jc.driver().output(), first.output);

        // 60 ms after the first step the error is still non-zero and the
        // integral has grown, so the output must differ
        let (next, _) = jc.proc(&auto(1.06)).unwrap();
        assert!(next.recomputed);
        assert!(next.output != first.output);
    }

    #[test]
    fn test_mode_switch() {
        let mut params = Params::p_only(0.1);
        params.gravity = GravityModel::Constant { k_g: 0.05 };
        let mut jc = joint(params);
        jc.set_desired_position(40.0);

        // Approaching in automatic
        let (out, _) = jc.proc(&auto(0.0)).unwrap();
        assert_eq!(out.output, 1.0);
        jc.driver_mut().set_position(5.0);

        // Manual input applies on the very next tick, inside the automatic
        // hold period
        let (out, _) = jc.proc(&manual(0.01, -0.3)).unwrap();
        assert!(out.recomputed);
        assert_eq!(out.output, -0.3 + 0.05);

        // And switching back recomputes immediately instead of re-issuing the
        // manual output
        let (out, _) = jc.proc(&auto(0.02)).unwrap();
        assert!(out.recomputed);
        assert_eq!(out.output, 1.0);
    }

    #[test]
    fn test_no_integral_windup_outside_automatic() {
        let mut params = Params::p_only(0.0);
        params.k_i = 0.01;
        let mut jc = joint(params);
        jc.set_desired_position(10.0);

        let (out, _) = jc.proc(&auto(0.0)).unwrap();
        assert_eq!(out.output, 0.0);

        // 30 s of manual control with the joint standing still
        for i in 1..=1500 {
            jc.proc(&manual(i as f64 * 0.02, 0.0)).unwrap();
        }

        // Back in automatic the gap adds nothing to the integral
        let (out, _) = jc.proc(&auto(30.02)).unwrap();
        assert!(out.recomputed);
        assert_eq!(out.output, 0.0);

        // Accumulation resumes from the next interval only
        let (out, _) = jc.proc(&auto(30.12)).unwrap();
        assert!((out.output - 0.01 * 10.0 * 0.1).abs() < 1e-9);

        // Same again across a stop
        jc.stop().unwrap();
        let before = jc.proc(&auto(60.0)).unwrap().0.output;
        assert!((before - 0.01 * 10.0 * 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_stop_holds_feedforward() {
        let mut params = Params::p_only(0.1);
        params.gravity = GravityModel::Constant { k_g: 0.08 };
        let mut jc = joint(params);
        jc.set_desired_position(40.0);

        jc.proc(&auto(0.0)).unwrap();
        assert_eq!(jc.last_output(), 1.0);

        jc.stop().unwrap();
        assert_eq!(jc.driver().output(), 0.08);
        assert_eq!(jc.last_output(), 0.08);
    }

    #[test]
    fn test_stop_with_custom_feedforward() {
        let jc = joint(Params::p_only(0.1));
        let mut jc = jc.with_feedforward(|p: f64| 0.01 * p);

        jc.driver_mut().set_position(20.0);
        jc.stop().unwrap();
        assert_eq!(jc.driver().output(), 0.01 * 20.0);
    }

    #[test]
    fn test_hold() {
        let mut jc = joint(Params::p_only(0.1));
        jc.adjust_offset(2.0);
        jc.set_desired_position(40.0);
        jc.driver_mut().set_position(12.0);

        jc.hold().unwrap();

        assert_eq!(jc.target(), 12.0);
        assert!(jc.at_setpoint());

        let (out, _) = jc.proc(&auto(0.0)).unwrap();
        assert_eq!(out.output, 0.0);
    }

    #[test]
    fn test_at_setpoint_uses_clamped_target() {
        let mut params = Params::p_only(0.1);
        params.forward_limit = 45.0;
        params.tolerance = 0.5;
        let mut jc = joint(params);

        jc.set_desired_position(60.0);
        jc.driver_mut().set_position(44.6);
        assert!(jc.at_setpoint());

        jc.driver_mut().set_position(44.4);
        assert!(!jc.at_setpoint());

        // The raw setpoint is kept
        assert_eq!(jc.setpoint(), 60.0);
        assert_eq!(jc.target(), 45.0);
    }

    #[test]
    fn test_output_saturation() {
        let mut params = Params::p_only(1.0);
        params.gravity = GravityModel::Constant { k_g: 0.5 };
        let mut jc = joint(params);
        jc.set_desired_position(-50.0);

        let (out, report) = jc.proc(&auto(0.0)).unwrap();
        assert_eq!(out.output, -1.0);
        assert!(report.output_saturated);
    }

    #[test]
    fn test_non_finite_output() {
        let jc = joint(Params::p_only(0.1));
        let mut jc = jc.with_feedforward(|_: f64| f64::NAN);

        let (out, report) = jc.proc(&manual(0.0, 0.2)).unwrap();
        assert_eq!(out.output, 0.0);
        assert!(report.output_non_finite);
    }

    #[test]
    fn test_write_failure() {
        let mut jc = joint(Params::p_only(0.1));
        jc.set_desired_position(5.0);
        jc.proc(&auto(0.0)).unwrap();
        assert_eq!(jc.last_output(), 0.5);

        jc.driver_mut().set_fail_writes(true);
        match jc.proc(&auto(0.1)) {
            Err(JointCtrlError::Driver(MechError::NoResponse)) => (),
            r => panic!("Expected a driver error, got {:?}", r.map(|_| ())),
        }
        assert_eq!(jc.last_output(), 0.0);

        // Once the driver recovers the loop carries on
        jc.driver_mut().set_fail_writes(false);
        let (out, _) = jc.proc(&auto(0.2)).unwrap();
        assert_eq!(out.output, 0.5);
    }

    #[test]
    fn test_non_finite_commands_ignored() {
        let mut jc = joint(Params::p_only(0.1));
        jc.set_desired_position(3.0);
        jc.set_desired_position(f64::NAN);
        jc.adjust_offset(f64::INFINITY);

        assert_eq!(jc.setpoint(), 3.0);
        assert_eq!(jc.trim_offset(), 0.0);
    }
}
