//! # PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Time the previous error was passed in
    prev_time_s: Option<f64>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None
        }
    }

    /// Get the value of the controller for the given error at time `now_s`.
    ///
    /// The integral is never reset, the only way to clear it is to create a
    /// new controller.
    pub fn get(&mut self, error: f64, now_s: f64) -> f64 {
        // Calculate dt, ignoring repeated or out of order samples
        let dt = match self.prev_time_s {
            Some(t0) if now_s > t0 => Some(now_s - t0),
            _ => None
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        // since adding on the raw error would produce a large spike.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };

        // Calculate the derivative. Without a previous sample there is none.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64
        };

        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time_s = Some(now_s);

        out
    }

    /// Forget the previous sample, keeping the integral.
    ///
    /// Used when the controller stops being run, so that the next call
    /// neither integrates nor differentiates across the gap.
    pub fn pause(&mut self) {
        self.prev_time_s = None;
        self.prev_error = None;
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
