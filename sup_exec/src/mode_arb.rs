//! # Mode arbiter
//!
//! Owner of the superstructure's operating mode. The mode is read by every
//! joint on every tick, so switching takes effect on all joints at once.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::OperatingMode;
use log::info;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ModeArbiter {
    mode: OperatingMode,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ModeArbiter {
    pub fn new(initial_mode: OperatingMode) -> Self {
        Self { mode: initial_mode }
    }

    /// The current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Swap to the other mode, returning the new one.
    pub fn toggle(&mut self) -> OperatingMode {
        self.set(self.mode.toggled());
        self.mode
    }

    /// Select the given mode.
    pub fn set(&mut self, mode: OperatingMode) {
        if mode != self.mode {
            info!("Control mode swapped: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new(OperatingMode::Automatic)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut arb = ModeArbiter::default();
        assert_eq!(arb.mode(), OperatingMode::Automatic);

        assert_eq!(arb.toggle(), OperatingMode::Manual);
        assert_eq!(arb.mode(), OperatingMode::Manual);

        assert_eq!(arb.toggle(), OperatingMode::Automatic);
    }

    #[test]
    fn test_set() {
        let mut arb = ModeArbiter::new(OperatingMode::Manual);

        arb.set(OperatingMode::Manual);
        assert_eq!(arb.mode(), OperatingMode::Manual);

        arb.set(OperatingMode::Automatic);
        assert_eq!(arb.mode(), OperatingMode::Automatic);
    }
}
