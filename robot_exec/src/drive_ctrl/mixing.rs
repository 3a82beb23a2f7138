//! Mixing of driver commands into left and right side powers
//!
//! All powers are normalised to [-1, 1]. Positive rotation and curvature turn the robot
//! anticlockwise, i.e. the right side runs faster than the left.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::maths::limit;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Power for each side of the drivetrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SidePowers {
    pub left: f64,
    pub right: f64,
}

/// Curvature ("cheesy") drive.
///
/// Turning in place is smoothed by a quick stop accumulator, which counteracts the robot's
/// rotational momentum once the driver leaves quick turn.
#[derive(Debug, Clone, Default)]
pub struct CurvatureDrive {
    quick_stop_threshold: f64,
    quick_stop_alpha: f64,
    quick_stop_accumulator: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CurvatureDrive {
    pub fn new(quick_stop_threshold: f64, quick_stop_alpha: f64) -> Self {
        Self {
            quick_stop_threshold,
            quick_stop_alpha,
            quick_stop_accumulator: 0.0,
        }
    }

    pub fn accumulator(&self) -> f64 {
        self.quick_stop_accumulator
    }

    pub fn drive(&mut self, linear: f64, curvature: f64, quick_turn: bool) -> SidePowers {
        let angular;
        let overpower;

        if quick_turn {
            if linear.abs() < self.quick_stop_threshold {
                self.quick_stop_accumulator = (1.0 - self.quick_stop_alpha)
                    * self.quick_stop_accumulator
                    + self.quick_stop_alpha * limit(curvature, 1.0) * 2.0;
            }

            overpower = true;
            angular = curvature;
        } else {
            overpower = false;
            angular = linear.abs() * curvature - self.quick_stop_accumulator;

            // Decay the accumulator
            if self.quick_stop_accumulator > 1.0 {
                self.quick_stop_accumulator -= 1.0;
            } else if self.quick_stop_accumulator < -1.0 {
                self.quick_stop_accumulator += 1.0;
            } else {
                self.quick_stop_accumulator = 0.0;
            }
        }

        let mut left = linear - angular;
        let mut right = linear + angular;

        // Keep the turn at the cost of the linear demand
        if overpower {
            if left > 1.0 {
                right -= left - 1.0;
                left = 1.0;
            } else if right > 1.0 {
                left -= right - 1.0;
                right = 1.0;
            } else if left < -1.0 {
                right -= left + 1.0;
                left = -1.0;
            } else if right < -1.0 {
                left -= right + 1.0;
                right = -1.0;
            }
        }

        normalise(left, right)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Zero inside the deadband, rescaled outside it so the output is continuous and still reaches
/// +/-1.
pub fn deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() <= deadband {
        0.0
    } else {
        (value - deadband.copysign(value)) / (1.0 - deadband)
    }
}

/// Scale both sides by the same factor so that neither exceeds 1 in magnitude.
pub fn normalise(left: f64, right: f64) -> SidePowers {
    let max = left.abs().max(right.abs());

    if max > 1.0 {
        SidePowers {
            left: left / max,
            right: right / max,
        }
    } else {
        SidePowers { left, right }
    }
}

/// Arcade drive, the linear demand drives both sides and the rotation demand is mixed in.
pub fn arcade_drive(linear: f64, rotation: f64, square_inputs: bool, db: f64) -> SidePowers {
    let mut linear = deadband(limit(linear, 1.0), db);
    let mut rotation = deadband(limit(rotation, 1.0), db);

    // Finer control at low speed while still permitting full power
    if square_inputs {
        linear = (linear * linear).copysign(linear);
        rotation = (rotation * rotation).copysign(rotation);
    }

    let max_input = linear.abs().max(rotation.abs()).copysign(linear);

    let (left, right) = if linear >= 0.0 {
        if rotation >= 0.0 {
            (linear - rotation, max_input)
        } else {
            (max_input, linear + rotation)
        }
    } else if rotation >= 0.0 {
        (max_input, linear + rotation)
    } else {
        (linear - rotation, max_input)
    };

    normalise(left, right)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deadband() {
        assert_eq!(deadband(0.05, 0.07), 0.0);
        assert_eq!(deadband(-0.07, 0.07), 0.0);
        assert_relative_eq!(deadband(1.0, 0.07), 1.0);
        assert_relative_eq!(deadband(-1.0, 0.07), -1.0);
        assert_relative_eq!(deadband(0.535, 0.07), 0.5);

        // Continuous at the edge of the band
        assert!(deadband(0.0701, 0.07) < 1e-3);
    }

    #[test]
    fn test_normalise() {
        let p = normalise(0.5, -0.25);
        assert_eq!(p, SidePowers { left: 0.5, right: -0.25 });

        let p = normalise(3.0, -1.5);
        assert_relative_eq!(p.left, 1.0);
        assert_relative_eq!(p.right, -0.5);
    }

    #[test]
    fn test_arcade() {
        // Straight
        let p = arcade_drive(0.5, 0.0, false, 0.0);
        assert_relative_eq!(p.left, 0.5);
        assert_relative_eq!(p.right, 0.5);

        // Anticlockwise spin on the spot
        let p = arcade_drive(0.0, 1.0, false, 0.0);
        assert_relative_eq!(p.left, -1.0);
        assert_relative_eq!(p.right, 1.0);

        // Forward and turning left, right side leads
        let p = arcade_drive(0.8, 0.2, false, 0.0);
        assert_relative_eq!(p.left, 0.6);
        assert_relative_eq!(p.right, 0.8);

        // Reversing and turning right
        let p = arcade_drive(-0.8, -0.2, false, 0.0);
        assert_relative_eq!(p.left, -0.6);
        assert_relative_eq!(p.right, -0.8);

        // Squared
        let p = arcade_drive(-0.5, 0.0, true, 0.0);
        assert_relative_eq!(p.left, -0.25);
        assert_relative_eq!(p.right, -0.25);

        // Inside the deadband
        let p = arcade_drive(0.05, -0.05, true, 0.07);
        assert_eq!(p, SidePowers::default());
    }

    #[test]
    fn test_curvature_ratio_preserved() {
        let cases = [(1.0f64, 0.5f64), (0.9, -1.0), (-1.0, 0.8), (0.6, 0.9)];

        for &(linear, curvature) in cases.iter() {
            let mut cd = CurvatureDrive::new(0.2, 0.1);
            let raw_left = linear - linear.abs() * curvature;
            let raw_right = linear + linear.abs() * curvature;

            let p = cd.drive(linear, curvature, false);

            assert_relative_eq!(p.left.abs().max(p.right.abs()), 1.0, epsilon = 1e-12);
            assert_relative_eq!(p.left * raw_right, p.right * raw_left, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quick_turn_accumulator() {
        let mut cd = CurvatureDrive::new(0.2, 0.1);

        // Quick turn in place builds the accumulator
        let p = cd.drive(0.0, 1.0, true);
        assert_relative_eq!(cd.accumulator(), 0.2);
        assert_relative_eq!(p.left, -1.0);
        assert_relative_eq!(p.right, 1.0);

        for _ in 0..50 {
            cd.drive(0.0, 1.0, true);
        }
        assert!(cd.accumulator() > 1.0);

        // Fast quick turns don't feed the accumulator
        let acc = cd.accumulator();
        cd.drive(0.5, 1.0, true);
        assert_eq!(cd.accumulator(), acc);

        // Leaving quick turn counter-steers then decays
        let p = cd.drive(0.0, 0.0, false);
        assert!(p.left > 0.0 && p.right < 0.0);
        assert_relative_eq!(cd.accumulator(), acc - 1.0, epsilon = 1e-12);
        cd.drive(0.0, 0.0, false);
        assert_eq!(cd.accumulator(), 0.0);
    }

    #[test]
    fn test_quick_turn_overpower() {
        let mut cd = CurvatureDrive::new(0.2, 0.1);

        // Full forward with a quick turn, the turn is kept
        let p = cd.drive(1.0, 0.5, true);
        assert_relative_eq!(p.left, 0.0);
        assert_relative_eq!(p.right, 1.0);
    }
}
