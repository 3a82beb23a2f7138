//! # Superstructure telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::eqpt::superstructure::HeldPiece;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A requested superstructure configuration.
///
/// Units are the ones the mechanism is designed in, so that goals can be written by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GoalRequest {
    /// Units: inches
    pub elevator_height_in: f64,

    /// Units: degrees
    pub elbow_angle_deg: f64,

    /// Units: degrees
    pub wrist_angle_deg: f64,

    /// The piece the intake should be holding at the goal.
    #[serde(default)]
    pub held_piece: HeldPiece,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Preset superstructure configurations, the values of which are parameters of the robot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Arm folded up against the elevator.
    Stowed,

    /// Intake at floor level ready to pick up cargo.
    CargoGrab,

    /// Intake pointing down for placing cargo.
    CargoDown,

    /// Intake vertical for placing or collecting hatches.
    Hatch,
}
