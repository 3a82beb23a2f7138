//! # Trajectory control module
//!
//! Trajectory control keeps the robot on a precomputed timed trajectory. Each trajectory is a
//! sequence of samples, each giving the pose, curvature, velocity and acceleration the robot
//! should have at a given time. The trajectory is sampled at the time elapsed since tracking
//! began, and a tracking law compares the reference sample with the current pose estimate to
//! produce a chassis velocity demand.
//!
//! The chassis demand is converted into left and right wheel velocities by a differential drive
//! model, and handed to drive control.
//!
//! A trajectory can also be built on the fly towards a fixed target pose, see `pose_target`.
//!
//! Three tracking laws are provided:
//!  - Ramsete, a nonlinear time-varying feedback law on the pose error (the default),
//!  - Pure pursuit, which steers towards a lookahead point on the trajectory,
//!  - Feedforward, which ignores the pose estimate entirely.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod drive_model;
mod laws;
mod params;
mod pose_target;
mod tracker;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use drive_model::*;
pub use laws::*;
pub use params::Params;
pub use pose_target::*;
pub use tracker::*;
pub use trajectory::*;

use crate::loc::LocError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory control.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Trajectory control has not been initialised")]
    NotInitialised,

    #[error("No trajectory is being tracked")]
    NotTracking,

    #[error("Could not request a pose reset: {0}")]
    PoseResetFailed(LocError),

    #[error("Invalid trajectory: {0}")]
    TrajectoryError(TrajectoryError),
}
