//! Tank drive odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    geom::{Pose2, Translation2},
    units::{Angle, Length},
};
use comms_if::eqpt::drive::DriveSens;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dead reckoning from the wheel encoders and the gyro.
///
/// Each update moves the pose forward by the mean wheel travel since the last update, along the
/// mid-point of the previous and current headings. The heading itself comes from the gyro, offset
/// so that it matches the pose last reset to.
#[derive(Debug, Clone, Default)]
pub struct Odometer {
    pose: Pose2,

    /// Gyro heading minus pose heading
    heading_offset: Angle,

    /// Sensor data from the previous update, `None` before the first update after a reset
    prev: Option<DriveSens>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Odometer {
    pub fn new(pose: Pose2) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }

    pub fn pose(&self) -> Pose2 {
        self.pose
    }

    /// Reset the pose. The heading offset is recalculated on the next update.
    pub fn reset(&mut self, pose: Pose2) {
        self.pose = pose;
        self.prev = None;
    }

    /// Integrate one set of sensor data, returning the new pose.
    pub fn update(&mut self, sens: &DriveSens) -> Pose2 {
        let gyro = Angle::from_rad(sens.heading_rad);

        let prev = match self.prev.replace(*sens) {
            Some(p) => p,
            None => {
                // First data since reset, only the heading offset can be found
                self.heading_offset = (gyro - self.pose.rotation).wrapped();
                return self.pose;
            }
        };

        let dist = Length::from_m(
            0.5 * ((sens.left_dist_m - prev.left_dist_m) + (sens.right_dist_m - prev.right_dist_m)),
        );

        let heading = (gyro - self.heading_offset).wrapped();
        let mid_heading = self.pose.rotation + 0.5 * (heading - self.pose.rotation).wrapped();

        self.pose = Pose2::new(
            self.pose.translation + Translation2::from_polar(dist, mid_heading),
            heading,
        );

        self.pose
    }
}
