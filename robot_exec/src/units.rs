//! # Physical units
//!
//! `Length` and `Angle` are thin wrappers around an `f64` stored in SI units (meters and radians).
//! They exist so that the superstructure geometry, which is designed in inches and degrees, can't
//! accidentally add a height to an angle or mix up unit systems.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of meters in an inch
pub const METERS_PER_INCH: f64 = 0.0254;

/// Number of meters in a foot
pub const METERS_PER_FOOT: f64 = 12.0 * METERS_PER_INCH;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A length.
///
/// Units: meters
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Length(f64);

/// An angle.
///
/// Units: radians
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Length {
    pub const ZERO: Length = Length(0.0);

    pub fn from_m(m: f64) -> Self {
        Self(m)
    }

    pub fn from_in(inches: f64) -> Self {
        Self(inches * METERS_PER_INCH)
    }

    pub fn from_ft(feet: f64) -> Self {
        Self(feet * METERS_PER_FOOT)
    }

    pub fn m(self) -> f64 {
        self.0
    }

    pub fn inches(self) -> f64 {
        self.0 / METERS_PER_INCH
    }

    pub fn ft(self) -> f64 {
        self.0 / METERS_PER_FOOT
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Clamp into `[min, max]`.
    pub fn clamp(self, min: Length, max: Length) -> Self {
        Self(util::maths::clamp(self.0, min.0, max.0))
    }

    pub fn signum(self) -> f64 {
        self.0.signum()
    }
}

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn from_rad(rad: f64) -> Self {
        Self(rad)
    }

    pub fn from_deg(deg: f64) -> Self {
        Self(deg.to_radians())
    }

    pub fn rad(self) -> f64 {
        self.0
    }

    pub fn deg(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// The arcsine of `ratio`, or `None` if the ratio is outside of `[-1, 1]`.
    pub fn asin(ratio: f64) -> Option<Self> {
        if ratio.is_finite() && (-1.0..=1.0).contains(&ratio) {
            Some(Self(ratio.asin()))
        } else {
            None
        }
    }

    /// The same angle wrapped into (-pi, pi].
    pub fn wrapped(self) -> Self {
        Self(wrap_pi(self.0))
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Clamp into `[min, max]`.
    pub fn clamp(self, min: Angle, max: Angle) -> Self {
        Self(util::maths::clamp(self.0, min.0, max.0))
    }
}

macro_rules! impl_quantity_ops {
    ($t:ident) => {
        impl Add for $t {
            type Output = $t;

            fn add(self, rhs: $t) -> $t {
                $t(self.0 + rhs.0)
            }
        }

        impl AddAssign for $t {
            fn add_assign(&mut self, rhs: $t) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $t {
            type Output = $t;

            fn sub(self, rhs: $t) -> $t {
                $t(self.0 - rhs.0)
            }
        }

        impl SubAssign for $t {
            fn sub_assign(&mut self, rhs: $t) {
                self.0 -= rhs.0;
            }
        }

        impl Neg for $t {
            type Output = $t;

            fn neg(self) -> $t {
                $t(-self.0)
            }
        }

        impl Mul<f64> for $t {
            type Output = $t;

            fn mul(self, rhs: f64) -> $t {
                $t(self.0 * rhs)
            }
        }

        impl Mul<$t> for f64 {
            type Output = $t;

            fn mul(self, rhs: $t) -> $t {
                $t(self * rhs.0)
            }
        }

        impl Div<f64> for $t {
            type Output = $t;

            fn div(self, rhs: f64) -> $t {
                $t(self.0 / rhs)
            }
        }

        /// Ratio of two like quantities.
        impl Div<$t> for $t {
            type Output = f64;

            fn div(self, rhs: $t) -> f64 {
                self.0 / rhs.0
            }
        }
    };
}

impl_quantity_ops!(Length);
impl_quantity_ops!(Angle);

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} in", self.inches())
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} deg", self.deg())
    }
}
