//! # Equipment Interface
//!
//! This module defines the interfaces the control core uses to talk to the
//! equipment driver layer.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod mech;
