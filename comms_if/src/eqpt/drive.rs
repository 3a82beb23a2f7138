//! # Drivetrain Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the drivetrain motor controllers.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct DriveDems {
    pub left: SideDemand,
    pub right: SideDemand,

    /// The gear the shifters should be in.
    pub gear: Gear,
}

/// Drivetrain sensor data.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct DriveSens {
    /// Accumulated distance travelled by the left side wheels.
    ///
    /// Units: meters
    pub left_dist_m: f64,

    /// Accumulated distance travelled by the right side wheels.
    ///
    /// Units: meters
    pub right_dist_m: f64,

    /// Units: meters/second
    pub left_vel_ms: f64,

    /// Units: meters/second
    pub right_vel_ms: f64,

    /// Gyro heading, positive anticlockwise viewed from above.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Demand for one side of the drivetrain.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum SideDemand {
    /// Open loop output, normalised to [-1, 1].
    Power(f64),

    /// Closed loop velocity with an arbitrary feedforward term.
    Velocity {
        /// Units: meters/second
        vel_ms: f64,

        /// Feedforward added to the controller output, normalised to [-1, 1].
        ff: f64,
    },

    /// No output.
    Neutral,
}

/// Transmission gear.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Gear {
    Low,
    High,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// Both sides neutral in the given gear.
    pub fn neutral(gear: Gear) -> Self {
        Self {
            left: SideDemand::Neutral,
            right: SideDemand::Neutral,
            gear,
        }
    }
}

impl Default for DriveDems {
    fn default() -> Self {
        Self::neutral(Gear::default())
    }
}

impl Default for Gear {
    fn default() -> Self {
        Gear::High
    }
}
