//! # Simulated mechanisms
//!
//! A first order motor model standing in for the motor controllers when no
//! hardware is attached. The motor moves at `output * max_rate_per_s` and the
//! position only changes when [`SimMotor::advance`] is called, which keeps the
//! simulation deterministic in tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{MechError, MotorDriver};
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SimMotor {
    /// Position in sensor units
    position: f64,

    /// Velocity in sensor units per second, updated on `advance`
    velocity: f64,

    /// Last accepted output demand
    output: f64,

    /// Rate the motor moves at under full output
    max_rate_per_s: f64,

    current_limit_a: Option<f64>,

    brake: bool,

    /// Number of times the position has been zeroed
    num_zeroes: usize,

    /// When set every write is rejected with `NoResponse`
    fail_writes: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotor {
    pub fn new(max_rate_per_s: f64) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            output: 0.0,
            max_rate_per_s,
            current_limit_a: None,
            brake: false,
            num_zeroes: 0,
            fail_writes: false,
        }
    }

    /// Integrate the motor over `dt_s` seconds at the current output.
    pub fn advance(&mut self, dt_s: f64) {
        self.velocity = self.output * self.max_rate_per_s;
        self.position += self.velocity * dt_s;
    }

    /// Move the motor to a position directly, as if pushed there by hand.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Make every following write fail, or recover from that.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn current_limit_a(&self) -> Option<f64> {
        self.current_limit_a
    }

    pub fn brake(&self) -> bool {
        self.brake
    }

    pub fn num_zeroes(&self) -> usize {
        self.num_zeroes
    }
}

impl MotorDriver for SimMotor {
    fn read_position(&self) -> f64 {
        self.position
    }

    fn read_velocity(&self) -> f64 {
        self.velocity
    }

    fn write_output(&mut self, output: f64) -> Result<(), MechError> {
        if self.fail_writes {
            return Err(MechError::NoResponse);
        }
        if !output.is_finite() || output.abs() > 1.0 {
            return Err(MechError::InvalidOutput(output));
        }

        self.output = output;
        Ok(())
    }

    fn zero_position(&mut self) -> Result<(), MechError> {
        self.position = 0.0;
        self.num_zeroes += 1;
        Ok(())
    }

    fn apply_current_limit(&mut self, amps: f64) -> Result<(), MechError> {
        if !amps.is_finite() || amps <= 0.0 {
            return Err(MechError::ConfigRejected(format!(
                "current limit must be positive, got {} A",
                amps
            )));
        }

        self.current_limit_a = Some(amps);
        Ok(())
    }

    fn set_brake_mode(&mut self, brake: bool) -> Result<(), MechError> {
        self.brake = brake;
        Ok(())
    }
}
