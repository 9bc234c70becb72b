//! # Joint control module
//!
//! Closed loop position control of a single superstructure joint (elevator,
//! elbow or wrist). Each joint runs a PID loop on the error between its
//! clamped target and the measured position, stops driving into its soft
//! limits, and adds a gravity feedforward term on top.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod feedforward;
mod joints;
mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use feedforward::*;
pub use joints::*;
pub use params::*;
pub use pid::*;
pub use state::*;

use comms_if::eqpt::mech::MechError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during JointCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum JointCtrlError {
    #[error("Invalid joint parameters: {0}")]
    InvalidParams(String),

    #[error("Motor driver error: {0}")]
    Driver(#[from] MechError),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply the soft limit edge stop to a drive demand.
///
/// A demand pushing further past a limit the joint is already at or beyond is
/// replaced by exactly zero. Demands back towards the allowed range pass
/// through unchanged.
pub fn edge_stop(position: f64, demand: f64, reverse_limit: f64, forward_limit: f64) -> f64 {
    if position >= forward_limit && demand > 0.0 {
        0.0
    }
    else if position <= reverse_limit && demand < 0.0 {
        0.0
    }
    else {
        demand
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_edge_stop() {
        let limits = [(-10.0, 10.0), (0.0, 45.0), (-0.5, -0.1), (3.0, 3.0)];
        let speeds = [-1.0, -0.25, -1e-9, 0.0, 1e-9, 0.25, 1.0];

        for &(rev, fwd) in limits.iter() {
            let positions = [rev - 5.0, rev, (rev + fwd) / 2.0, fwd, fwd + 5.0];

            for &p in positions.iter() {
                for &s in speeds.iter() {
                    let out = edge_stop(p, s, rev, fwd);

                    if p >= fwd && s > 0.0 {
                        assert_eq!(out, 0.0, "p = {}, s = {}, [{}, {}]", p, s, rev, fwd);
                    }
                    else if p <= rev && s < 0.0 {
                        assert_eq!(out, 0.0, "p = {}, s = {}, [{}, {}]", p, s, rev, fwd);
                    }
                    else {
                        assert_eq!(out, s, "p = {}, s = {}, [{}, {}]", p, s, rev, fwd);
                    }
                }
            }
        }
    }

    #[test]
    fn test_edge_stop_allows_retreat() {
        // Past the forward limit, driving back is unrestricted
        assert_eq!(edge_stop(50.0, -0.7, 0.0, 45.0), -0.7);

        // Below the reverse limit, driving up is unrestricted
        assert_eq!(edge_stop(-2.0, 0.4, 0.0, 45.0), 0.4);
    }
}
