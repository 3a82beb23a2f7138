//! Differential drive model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Chassis velocity demand.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct ChassisVel {
    /// Units: meters/second
    pub v_ms: f64,

    /// Units: radians/second
    pub omega_rads: f64,
}

/// Demand for the wheels on one side of the drivetrain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct WheelDem {
    /// Surface speed of the wheels.
    ///
    /// Units: meters/second
    pub vel_ms: f64,

    /// Feedforward, normalised to the nominal voltage.
    pub ff: f64,
}

/// Demands for both sides of the drivetrain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct WheelDems {
    pub left: WheelDem,
    pub right: WheelDem,
}

/// Kinematics and feedforward of a skid steer drivetrain.
#[derive(Debug, Copy, Clone)]
pub struct DiffDriveModel {
    /// Units: meters
    pub track_width_m: f64,

    /// Units: meters
    pub wheel_radius_m: f64,

    kv: f64,
    ka: f64,
    ks: f64,
    nominal_voltage_v: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiffDriveModel {
    pub fn new(params: &Params) -> Self {
        Self {
            track_width_m: params.track_width_m,
            wheel_radius_m: params.wheel_radius_m,
            kv: params.ff_kv_vpms,
            ka: params.ff_ka_vpmss,
            ks: params.ff_ks_v,
            nominal_voltage_v: params.nominal_voltage_v,
        }
    }

    /// Left and right wheel surface speeds for a chassis velocity.
    ///
    /// Units: meters/second
    pub fn wheel_speeds(&self, chassis: &ChassisVel) -> (f64, f64) {
        let half_diff = 0.5 * chassis.omega_rads * self.track_width_m;
        (chassis.v_ms - half_diff, chassis.v_ms + half_diff)
    }

    /// Chassis velocity from left and right wheel surface speeds.
    pub fn chassis_vel(&self, left_ms: f64, right_ms: f64) -> ChassisVel {
        ChassisVel {
            v_ms: 0.5 * (left_ms + right_ms),
            omega_rads: (right_ms - left_ms) / self.track_width_m,
        }
    }

    /// Wheel angular speed for a surface speed.
    ///
    /// Units: radians/second
    pub fn wheel_rate_rads(&self, surface_ms: f64) -> f64 {
        surface_ms / self.wheel_radius_m
    }

    /// Normalised feedforward for a wheel moving at `vel_ms` and accelerating at `accel_mss`.
    pub fn feedforward(&self, vel_ms: f64, accel_mss: f64) -> f64 {
        let ks = if vel_ms.abs() > 1e-6 {
            self.ks.copysign(vel_ms)
        } else {
            0.0
        };

        (self.kv * vel_ms + self.ka * accel_mss + ks) / self.nominal_voltage_v
    }

    /// Convert a chassis demand into wheel demands, limiting both wheels proportionally so that
    /// neither exceeds `max_speed_ms`.
    pub fn wheel_dems(
        &self,
        chassis: &ChassisVel,
        accel: &ChassisVel,
        max_speed_ms: f64,
    ) -> WheelDems {
        let (mut left, mut right) = self.wheel_speeds(chassis);
        let (left_accel, right_accel) = self.wheel_speeds(accel);

        let max = left.abs().max(right.abs());
        if max > max_speed_ms {
            left *= max_speed_ms / max;
            right *= max_speed_ms / max;
        }

        WheelDems {
            left: WheelDem {
                vel_ms: left,
                ff: self.feedforward(left, left_accel),
            },
            right: WheelDem {
                vel_ms: right,
                ff: self.feedforward(right, right_accel),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use approx::assert_relative_eq;

    pub fn model() -> DiffDriveModel {
        DiffDriveModel {
            track_width_m: 0.6,
            wheel_radius_m: 0.075,
            kv: 2.0,
            ka: 0.5,
            ks: 1.0,
            nominal_voltage_v: 12.0,
        }
    }

    #[test]
    fn test_kinematics() {
        let m = model();
        let c = ChassisVel {
            v_ms: 1.0,
            omega_rads: 1.0,
        };

        let (l, r) = m.wheel_speeds(&c);
        assert_relative_eq!(l, 0.7);
        assert_relative_eq!(r, 1.3);

        let back = m.chassis_vel(l, r);
        assert_relative_eq!(back.v_ms, 1.0);
        assert_relative_eq!(back.omega_rads, 1.0);

        assert_relative_eq!(m.wheel_rate_rads(1.5), 20.0);
    }

    #[test]
    fn test_wheel_limit_keeps_ratio() {
        let m = model();
        let dems = m.wheel_dems(
            &ChassisVel {
                v_ms: 3.0,
                omega_rads: 2.0,
            },
            &ChassisVel::default(),
            2.0,
        );

        // Unlimited speeds are 2.4 and 3.6
        assert_relative_eq!(dems.right.vel_ms, 2.0);
        assert_relative_eq!(dems.left.vel_ms, 2.0 * 2.4 / 3.6);
    }

    #[test]
    fn test_feedforward() {
        let m = model();
        assert_relative_eq!(m.feedforward(1.0, 2.0), (2.0 + 1.0 + 1.0) / 12.0);
        assert_relative_eq!(m.feedforward(-1.0, 0.0), (-2.0 - 1.0) / 12.0);
        assert_eq!(m.feedforward(0.0, 0.0), 0.0);
    }
}
