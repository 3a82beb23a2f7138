//! # Robot library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the robot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - the global state of the executable
pub mod data_store;

/// Drive control - converts driver commands and trajectory demands into drivetrain demands
pub mod drive_ctrl;

/// Planar geometry - translations, poses and twists
pub mod geom;

/// Localisation - dead reckoning pose estimate maintained on a background thread
pub mod loc;

/// Plant simulation - stands in for the motors and sensors
pub mod sim;

/// Superstructure control - safe motion planning and execution for the elevator and arm
pub mod superstructure;

/// Telecommand processor - applies telecommands to the data store
pub mod tc_processor;

/// Trajectory control - keeps the robot on a timed trajectory
pub mod traj_ctrl;

/// Physical quantities
pub mod units;
