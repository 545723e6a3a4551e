//! # Guidance library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access the items
//! defined inside the guidance executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Guidance control module - keeps the aircraft on the given path in wind
pub mod guid_ctrl;

/// Simulation module - a kinematic fixed-wing model used to fly the guidance in closed loop
pub mod sim;
