//! # Communications interface crate.
//!
//! Provides the interface types exchanged between the control core and its
//! collaborators: telecommands in, equipment demands out and sensor data in.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Demand and sensor data definitions for equipment (joints, drivetrain)
pub mod eqpt;
