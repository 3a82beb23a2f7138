//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::drive_ctrl::GearLimits;
use comms_if::tc::drive::TrackingLawKind;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Tracking law used when a trajectory command doesn't give one
    pub default_law: TrackingLawKind,

    /// Ramsete convergence gain, larger values correct pose errors more aggressively.
    ///
    /// Units: radians^2/meters^2
    pub ramsete_beta: f64,

    /// Ramsete damping ratio, between 0 and 1.
    pub ramsete_zeta: f64,

    /// Pure pursuit gain on the along-track error.
    ///
    /// Units: 1/seconds
    pub pure_pursuit_k_lat: f64,

    /// How far ahead in time the pure pursuit lookahead point is.
    ///
    /// Units: seconds
    pub pure_pursuit_lookahead_time_s: f64,

    /// Minimum distance from the robot to the pure pursuit lookahead point.
    ///
    /// Units: meters
    pub pure_pursuit_min_lookahead_m: f64,

    /// If set, tracking only finishes once the robot is within this distance of the end of the
    /// trajectory.
    ///
    /// Units: meters
    #[serde(default)]
    pub finish_tolerance_m: Option<f64>,

    /// Top speed when driving to a pose target.
    ///
    /// Units: meters/second
    pub pose_target_max_speed_ms: f64,

    /// Acceleration when driving to a pose target.
    ///
    /// Units: meters/second^2
    pub pose_target_max_accel_mss: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// Units: meters
    pub wheel_radius_m: f64,

    /// Maximum speed of either side of the drivetrain.
    ///
    /// Units: meters/second
    pub max_speed_ms: GearLimits,

    /// Velocity feedforward gain.
    ///
    /// Units: volts/(meters/second)
    pub ff_kv_vpms: f64,

    /// Acceleration feedforward gain.
    ///
    /// Units: volts/(meters/second^2)
    pub ff_ka_vpmss: f64,

    /// Static friction feedforward.
    ///
    /// Units: volts
    pub ff_ks_v: f64,

    /// Voltage that feedforwards are normalised against.
    ///
    /// Units: volts
    pub nominal_voltage_v: f64,
}
