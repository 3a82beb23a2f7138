//! # Superstructure Equipment Interface
//!
//! Demands sent to the elevator, elbow and wrist motor controllers, and the joint measurements
//! read back from their encoders.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands for each joint of the superstructure.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct JointDems {
    /// Elevator demand.
    ///
    /// Units: meters
    pub elevator: JointDemand,

    /// Elbow demand.
    ///
    /// Units: radians
    pub elbow: JointDemand,

    /// Wrist demand.
    ///
    /// Units: radians
    pub wrist: JointDemand,
}

/// Measured positions of each joint, plus the piece currently in the intake.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct JointSens {
    /// Height of the elevator carriage above its lowest position.
    ///
    /// Units: meters
    pub elevator_height_m: f64,

    /// Angle of the elbow, zero pointing forwards, positive upwards.
    ///
    /// Units: radians
    pub elbow_angle_rad: f64,

    /// Angle of the wrist in the same frame as the elbow (not relative to it).
    ///
    /// Units: radians
    pub wrist_angle_rad: f64,

    /// The piece held by the intake, as reported by the intake sensors.
    pub held_piece: HeldPiece,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Demand for a single joint.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum JointDemand {
    /// Closed loop position setpoint, in the units of the joint.
    Position(f64),

    /// No output, motor left in its neutral (brake) mode.
    Neutral,
}

/// Game piece held in the intake.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeldPiece {
    None,
    Hatch,
    Cargo,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointDems {
    /// All joints neutral.
    pub fn neutral() -> Self {
        Self {
            elevator: JointDemand::Neutral,
            elbow: JointDemand::Neutral,
            wrist: JointDemand::Neutral,
        }
    }
}

impl Default for JointDems {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Default for HeldPiece {
    fn default() -> Self {
        HeldPiece::None
    }
}
