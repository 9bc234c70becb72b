//! # Communications interface crate.
//!
//! Provides all common interfaces between the superstructure control core and
//! its collaborators: the operator (telecommands) and the motor driver layer
//! (equipment).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Interface definitions for equipment (motors and their sensors)
pub mod eqpt;
