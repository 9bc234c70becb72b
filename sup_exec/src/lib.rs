//! # Superstructure library.
//!
//! This library allows other crates in the workspace (and the benches) to access items defined
//! inside the superstructure crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store - owns every module and runs one tick of the whole superstructure
pub mod data_store;

/// End effector and climber control - open loop runs, continuous or timed
pub mod effector;

/// Joint control module - closed loop position control of a single joint
pub mod joint_ctrl;

/// Mode arbiter - holds the automatic/manual operating mode
pub mod mode_arb;

/// Executable parameters
pub mod params;

/// Preset coordinator - moves all joints to named positions at once
pub mod preset_coord;

/// Simulated motors, used in place of hardware by the executable and the tests
pub mod sim_mech;

/// Telecommand processor - applies operator commands to the data store
pub mod tc_processor;

/// Update scheduler - limits how often the joint control law recomputes
pub mod update_sched;
