//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::eqpt::drive::Gear;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Joystick inputs smaller than this are ignored.
    pub deadband: f64,

    /// Below this linear demand quick turns feed the quick stop accumulator.
    pub quick_stop_threshold: f64,

    /// Smoothing factor of the quick stop accumulator.
    pub quick_stop_alpha: f64,

    /// Forward demand is scaled by this in high gear when not quick turning.
    pub high_gear_forward_scale: f64,

    /// The gear to start in.
    pub initial_gear: Gear,

    /// Maximum speed of each side of the drivetrain.
    ///
    /// Units: meters/second
    pub max_speed_ms: GearLimits,

    /// Maximum acceleration of each side of the drivetrain.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: GearLimits,

    /// Proportional gain from remaining distance to speed when driving a set distance.
    ///
    /// Units: 1/seconds
    pub distance_kp: f64,

    /// A set distance is complete once the remaining distance is within this tolerance.
    ///
    /// Units: meters
    pub distance_tolerance_m: f64,

    /// Time after which a set distance drive is abandoned, unless the command gives its own.
    ///
    /// Units: seconds
    pub distance_timeout_s: f64,
}

/// A limit which depends on the gear.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GearLimits {
    pub low: f64,
    pub high: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GearLimits {
    pub fn get(&self, gear: Gear) -> f64 {
        match gear {
            Gear::Low => self.low,
            Gear::High => self.high,
        }
    }
}

impl Params {
    /// Maximum rate of change of a normalised power demand in the given gear.
    ///
    /// Units: 1/second
    pub fn max_power_rate(&self, gear: Gear) -> f64 {
        self.max_accel_mss.get(gear) / self.max_speed_ms.get(gear)
    }
}
