//! # Pose targets
//!
//! Builds a trajectory from the robot's pose to a fixed target pose, so that a target (for
//! example one picked out by a vision system) can be tracked with the same laws as a precomputed
//! trajectory.
//!
//! The path is a cubic Hermite spline whose end tangents follow the start and target headings.
//! It is driven forwards with a trapezoidal speed profile, starting and ending at rest.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use super::{TimedSample, TimedTrajectory, TrajectoryError};
use crate::geom::Pose2;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of spline segments the path is sampled with.
const NUM_SEGMENTS: usize = 50;

/// Targets closer than this are treated as already reached.
///
/// Units: meters
const MIN_PATH_LENGTH_M: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed profile limits for a pose target.
#[derive(Debug, Clone, Copy)]
pub struct ProfileLimits {
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,
}

/// Cubic Hermite spline between two poses.
struct Hermite {
    p0: Vector2<f64>,
    m0: Vector2<f64>,
    p1: Vector2<f64>,
    m1: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Hermite {
    fn new(start: &Pose2, target: &Pose2) -> Self {
        let p0 = start.translation.to_vector_m();
        let p1 = target.translation.to_vector_m();
        let scale = (p1 - p0).norm();

        Self {
            p0,
            m0: heading_vector(start) * scale,
            p1,
            m1: heading_vector(target) * scale,
        }
    }

    fn position(&self, u: f64) -> Vector2<f64> {
        let (u2, u3) = (u * u, u * u * u);

        self.p0 * (2.0 * u3 - 3.0 * u2 + 1.0)
            + self.m0 * (u3 - 2.0 * u2 + u)
            + self.p1 * (-2.0 * u3 + 3.0 * u2)
            + self.m1 * (u3 - u2)
    }

    fn first_derivative(&self, u: f64) -> Vector2<f64> {
        let u2 = u * u;

        self.p0 * (6.0 * u2 - 6.0 * u)
            + self.m0 * (3.0 * u2 - 4.0 * u + 1.0)
            + self.p1 * (-6.0 * u2 + 6.0 * u)
            + self.m1 * (3.0 * u2 - 2.0 * u)
    }

    fn second_derivative(&self, u: f64) -> Vector2<f64> {
        self.p0 * (12.0 * u - 6.0)
            + self.m0 * (6.0 * u - 4.0)
            + self.p1 * (-12.0 * u + 6.0)
            + self.m1 * (6.0 * u - 2.0)
    }

    /// Heading and curvature of the path at `u`.
    fn heading_curvature(&self, u: f64) -> (f64, f64) {
        let d1 = self.first_derivative(u);
        let d2 = self.second_derivative(u);
        let speed = d1.norm();

        if speed < 1e-9 {
            return (d2[1].atan2(d2[0]), 0.0);
        }

        (
            d1[1].atan2(d1[0]),
            (d1[0] * d2[1] - d1[1] * d2[0]) / speed.powi(3),
        )
    }
}

impl ProfileLimits {
    /// Speed and acceleration of the profile at distance `s_m` along a path of length `length_m`.
    fn at(&self, s_m: f64, length_m: f64) -> (f64, f64) {
        let accel_limit = (2.0 * self.max_accel_mss * s_m.max(0.0)).sqrt();
        let decel_limit = (2.0 * self.max_accel_mss * (length_m - s_m).max(0.0)).sqrt();

        if accel_limit < decel_limit && accel_limit < self.max_speed_ms {
            (accel_limit, self.max_accel_mss)
        } else if decel_limit < self.max_speed_ms {
            (decel_limit, -self.max_accel_mss)
        } else {
            (self.max_speed_ms, 0.0)
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a trajectory from `start` to `target`, with the first sample at time `t0_s`.
///
/// A target within a millimeter of the start gives a single sample trajectory at rest on the
/// target, which finishes immediately. Turning on the spot is not done.
pub fn trajectory_to_pose(
    start: &Pose2,
    target: &Pose2,
    limits: &ProfileLimits,
    t0_s: f64,
) -> Result<TimedTrajectory, TrajectoryError> {
    let rest = |t_s: f64, pose: &Pose2| TimedSample {
        t_s,
        x_m: pose.translation.x.m(),
        y_m: pose.translation.y.m(),
        heading_rad: pose.rotation.rad(),
        ..Default::default()
    };

    if start.translation.distance(&target.translation).m() < MIN_PATH_LENGTH_M {
        return TimedTrajectory::new(vec![rest(t0_s, target)]);
    }

    let spline = Hermite::new(start, target);

    // Distance along the path of each knot
    let knots: Vec<Vector2<f64>> = (0..=NUM_SEGMENTS)
        .map(|i| spline.position(i as f64 / NUM_SEGMENTS as f64))
        .collect();
    let mut dist_m = vec![0.0; knots.len()];
    for i in 1..knots.len() {
        dist_m[i] = dist_m[i - 1] + (knots[i] - knots[i - 1]).norm();
    }
    let length_m = dist_m[NUM_SEGMENTS];

    let mut samples = Vec::with_capacity(knots.len());
    let mut t_s = t0_s;
    let mut prev_vel_ms = 0.0;

    for (i, knot) in knots.iter().enumerate() {
        let (vel_ms, accel_mss) = limits.at(dist_m[i], length_m);

        if i > 0 {
            let ds = dist_m[i] - dist_m[i - 1];
            let mean_vel = 0.5 * (prev_vel_ms + vel_ms);

            // Segments too short to give a time step are merged into the next one
            if mean_vel <= 0.0 || ds <= 0.0 {
                continue;
            }
            t_s += ds / mean_vel;
        }

        let (heading_rad, curvature_m) = spline.heading_curvature(i as f64 / NUM_SEGMENTS as f64);

        samples.push(TimedSample {
            t_s,
            x_m: knot[0],
            y_m: knot[1],
            heading_rad,
            curvature_m,
            vel_ms,
            accel_mss,
        });
        prev_vel_ms = vel_ms;
    }

    TimedTrajectory::new(samples)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn heading_vector(pose: &Pose2) -> Vector2<f64> {
    Vector2::new(pose.rotation.cos(), pose.rotation.sin())
}
