//! Simulation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::drive_ctrl::GearLimits;
use comms_if::eqpt::superstructure::HeldPiece;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the plant simulation
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- SUPERSTRUCTURE ----
    /// Time constant of each joint's response to a position demand.
    ///
    /// Units: seconds
    pub joint_time_constant_s: f64,

    /// Units: inches/second
    pub elevator_max_rate_ins: f64,

    /// Units: degrees/second
    pub elbow_max_rate_degs: f64,

    /// Units: degrees/second
    pub wrist_max_rate_degs: f64,

    /// Units: inches
    pub initial_elevator_height_in: f64,

    /// Units: degrees
    pub initial_elbow_deg: f64,

    /// Units: degrees
    pub initial_wrist_deg: f64,

    #[serde(default)]
    pub initial_held_piece: HeldPiece,

    // ---- DRIVE ----
    /// Time constant of each side's response to a velocity demand.
    ///
    /// Units: seconds
    pub drive_time_constant_s: f64,

    /// Units: meters
    pub track_width_m: f64,

    /// Speed of each side at full power.
    ///
    /// Units: meters/second
    pub max_speed_ms: GearLimits,
}
