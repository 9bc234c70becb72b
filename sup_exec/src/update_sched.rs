//! # Update scheduler
//!
//! Rate limits the automatic control law of a joint. The actuator command is
//! still written every tick, only the recomputation is held back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-joint recompute scheduler.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateScheduler {
    /// Minimum time between two recomputes
    ///
    /// Units: seconds
    interval_s: f64,

    /// Time of the last recompute, `None` until the first one.
    ///
    /// Units: seconds
    last_update_s: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl UpdateScheduler {
    pub fn new(interval_s: f64) -> Self {
        Self {
            interval_s,
            last_update_s: None,
        }
    }

    /// Returns `true` if the control law should recompute at `now_s`, recording `now_s` as the
    /// last update time if so.
    ///
    /// The first call after creation or [`UpdateScheduler::reset`] is always due.
    pub fn is_due(&mut self, now_s: f64) -> bool {
        let due = match self.last_update_s {
            Some(last) => now_s - last >= self.interval_s,
            None => true,
        };

        if due {
            self.last_update_s = Some(now_s);
        }

        due
    }

    /// Forget the last update so that the next call to `is_due` recomputes.
    pub fn reset(&mut self) {
        self.last_update_s = None;
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    pub fn last_update_s(&self) -> Option<f64> {
        self.last_update_s
    }
}
