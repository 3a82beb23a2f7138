//! # Planar geometry
//!
//! Value types for positions and poses in a plane. These are used in two unrelated frames: the
//! field frame (robot pose, x downfield, y left) and the superstructure side view (x forward from
//! the elevator centreline, y up from the lowest carriage position).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use crate::units::{Angle, Length};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D position.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation2 {
    pub x: Length,
    pub y: Length,
}

/// A 2D position plus heading.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    pub translation: Translation2,

    /// Heading, positive anticlockwise from the x axis.
    pub rotation: Angle,
}

/// A small motion expressed in the moving body's own frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist2 {
    /// Forward motion
    pub dx: Length,

    /// Leftward motion
    pub dy: Length,

    pub dtheta: Angle,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Translation2 {
    pub fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub fn from_m(x_m: f64, y_m: f64) -> Self {
        Self::new(Length::from_m(x_m), Length::from_m(y_m))
    }

    /// A translation of length `length` pointing along `angle`.
    pub fn from_polar(length: Length, angle: Angle) -> Self {
        Self::new(length * angle.cos(), length * angle.sin())
    }

    /// Get the position as a vector in meters.
    pub fn to_vector_m(&self) -> Vector2<f64> {
        Vector2::new(self.x.m(), self.y.m())
    }

    pub fn from_vector_m(v: &Vector2<f64>) -> Self {
        Self::from_m(v[0], v[1])
    }

    pub fn norm(&self) -> Length {
        Length::from_m(self.to_vector_m().norm())
    }

    pub fn distance(&self, other: &Translation2) -> Length {
        (*other - *self).norm()
    }

    /// Rotate the translation about the origin.
    pub fn rotate_by(&self, angle: Angle) -> Self {
        Self::from_vector_m(&(Rotation2::new(angle.rad()) * self.to_vector_m()))
    }
}

impl Add for Translation2 {
    type Output = Translation2;

    fn add(self, rhs: Translation2) -> Translation2 {
        Translation2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Translation2 {
    type Output = Translation2;

    fn sub(self, rhs: Translation2) -> Translation2 {
        Translation2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Pose2 {
    pub fn new(translation: Translation2, rotation: Angle) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_m_rad(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self::new(Translation2::from_m(x_m, y_m), Angle::from_rad(heading_rad))
    }

    /// Express this pose in the frame of `other`.
    ///
    /// The result's translation is the position of `self` seen from `other`, and its rotation
    /// the heading difference wrapped into (-pi, pi].
    pub fn relative_to(&self, other: &Pose2) -> Pose2 {
        Pose2::new(
            (self.translation - other.translation).rotate_by(-other.rotation),
            (self.rotation - other.rotation).wrapped(),
        )
    }

    /// Apply a body frame twist to this pose, integrating along a constant curvature arc.
    pub fn exp(&self, twist: &Twist2) -> Pose2 {
        let dtheta = twist.dtheta.rad();
        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta.powi(2) / 6.0, 0.5 * dtheta)
        } else {
            (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
        };

        let local = Translation2::new(
            twist.dx * s - twist.dy * c,
            twist.dx * c + twist.dy * s,
        );

        Pose2::new(
            self.translation + local.rotate_by(self.rotation),
            (self.rotation + twist.dtheta).wrapped(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_relative_to() {
        let a = Pose2::from_m_rad(1.0, 1.0, PI / 2.0);
        let b = Pose2::from_m_rad(1.0, 2.0, PI / 2.0);

        // b is one meter ahead of a
        let r = b.relative_to(&a);
        assert_relative_eq!(r.translation.x.m(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.translation.y.m(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.rotation.rad(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exp() {
        // Straight line
        let p = Pose2::default().exp(&Twist2 {
            dx: Length::from_m(2.0),
            dy: Length::ZERO,
            dtheta: Angle::ZERO,
        });
        assert_relative_eq!(p.translation.x.m(), 2.0);
        assert_relative_eq!(p.translation.y.m(), 0.0);

        // Quarter circle of radius 1
        let p = Pose2::default().exp(&Twist2 {
            dx: Length::from_m(PI / 2.0),
            dy: Length::ZERO,
            dtheta: Angle::from_rad(PI / 2.0),
        });
        assert_relative_eq!(p.translation.x.m(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.translation.y.m(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.rotation.rad(), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polar() {
        let t = Translation2::from_polar(Length::from_in(10.0), Angle::from_deg(90.0));
        assert_relative_eq!(t.x.inches(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(t.y.inches(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(t.norm().inches(), 10.0, epsilon = 1e-9);
    }
}
