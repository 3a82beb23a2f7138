//! # Drive telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::eqpt::drive::Gear;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command for the drivetrain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DriveCmd {
    /// Split arcade drive, as from a pair of joystick axes.
    Arcade {
        /// Forward demand in [-1, 1].
        linear: f64,

        /// Turn demand in [-1, 1], positive anticlockwise.
        rotation: f64,

        /// Square the inputs (preserving sign) for finer control at low speed.
        #[serde(default)]
        square_inputs: bool,
    },

    /// Curvature ("cheesy") drive.
    Curvature {
        /// Forward demand in [-1, 1].
        linear: f64,

        /// Curvature demand in [-1, 1], positive anticlockwise.
        curvature: f64,

        /// Allow turning in place.
        #[serde(default)]
        quick_turn: bool,
    },

    /// Stop the drivetrain, cancelling any trajectory being followed.
    Stop,

    /// Shift into the given gear.
    SetGear { gear: Gear },

    /// Follow the precomputed trajectory stored at the given path.
    ///
    /// Relative paths are relative to the software root.
    FollowTrajectory {
        path: PathBuf,

        /// Reset the pose estimate to the first pose of the trajectory before starting.
        #[serde(default)]
        reset_pose: bool,

        /// Tracking law to use, if `None` the configured default is used.
        #[serde(default)]
        law: Option<TrackingLawKind>,
    },

    /// Drive straight for a distance measured by the wheel odometry, under closed loop velocity
    /// control.
    DriveDistance {
        /// Distance to travel, negative to reverse.
        ///
        /// Units: meters
        distance_m: f64,

        /// Units: meters/second
        max_speed_ms: f64,

        /// Give up after this long, if `None` the configured timeout is used.
        ///
        /// Units: seconds
        #[serde(default)]
        timeout_s: Option<f64>,
    },

    /// Drive from the current pose estimate to a fixed target pose, such as a scoring location
    /// found by a vision system.
    FollowPose {
        /// Units: meters
        x_m: f64,

        /// Units: meters
        y_m: f64,

        /// Units: degrees
        heading_deg: f64,

        /// Tracking law to use, if `None` the configured default is used.
        #[serde(default)]
        law: Option<TrackingLawKind>,
    },
}

/// Trajectory tracking laws.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackingLawKind {
    Ramsete,
    PurePursuit,
    FeedForward,
}
