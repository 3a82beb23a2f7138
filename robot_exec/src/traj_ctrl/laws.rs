//! # Tracking laws
//!
//! Each law compares the robot's pose with the reference sample of the trajectory and gives the
//! chassis velocity that should bring the robot back onto it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geom::Pose2;
use comms_if::tc::drive::TrackingLawKind;
use util::maths::sinc;

use super::{ChassisVel, Params, TimedSample, TimedTrajectory};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trajectory tracking law.
pub trait TrackingLaw: Send {
    /// Compute the chassis velocity demand.
    ///
    /// # Inputs
    /// - `pose`: current pose estimate of the robot
    /// - `reference`: the trajectory sampled at `t_s`
    /// - `trajectory`: the whole trajectory, for laws which look ahead
    /// - `t_s`: trajectory time of the reference
    fn chassis_vel(
        &self,
        pose: &Pose2,
        reference: &TimedSample,
        trajectory: &TimedTrajectory,
        t_s: f64,
    ) -> ChassisVel;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ramsete tracking law.
#[derive(Debug, Clone, Copy)]
pub struct Ramsete {
    pub beta: f64,
    pub zeta: f64,
}

/// Pure pursuit tracking law.
#[derive(Debug, Clone, Copy)]
pub struct PurePursuit {
    pub k_lat: f64,

    /// Units: seconds
    pub lookahead_time_s: f64,

    /// Units: meters
    pub min_lookahead_m: f64,
}

/// Open loop tracking, the reference velocities are used as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedForward;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrackingLaw for Ramsete {
    fn chassis_vel(
        &self,
        pose: &Pose2,
        reference: &TimedSample,
        _trajectory: &TimedTrajectory,
        _t_s: f64,
    ) -> ChassisVel {
        // Error in the robot's frame
        let err = reference.pose().relative_to(pose);
        let e_x = err.translation.x.m();
        let e_y = err.translation.y.m();
        let e_theta = err.rotation.rad();

        let v_r = reference.vel_ms;
        let omega_r = reference.omega_rads();

        let k = 2.0 * self.zeta * (omega_r.powi(2) + self.beta * v_r.powi(2)).sqrt();

        ChassisVel {
            v_ms: v_r * e_theta.cos() + k * e_x,
            omega_rads: omega_r + k * e_theta + self.beta * v_r * sinc(e_theta) * e_y,
        }
    }
}

impl TrackingLaw for PurePursuit {
    fn chassis_vel(
        &self,
        pose: &Pose2,
        reference: &TimedSample,
        trajectory: &TimedTrajectory,
        t_s: f64,
    ) -> ChassisVel {
        let lookahead = self.lookahead(pose, trajectory, t_s).relative_to(pose);
        let along_track_err_m = reference.pose().relative_to(pose).translation.x.m();

        let dist_sq = lookahead.translation.x.m().powi(2) + lookahead.translation.y.m().powi(2);
        let curvature = if dist_sq > 1e-12 {
            2.0 * lookahead.translation.y.m() / dist_sq
        } else {
            0.0
        };

        let v = reference.vel_ms * lookahead.rotation.cos() + self.k_lat * along_track_err_m;

        ChassisVel {
            v_ms: v,
            omega_rads: v * curvature,
        }
    }
}

impl PurePursuit {
    /// Find the lookahead pose: the trajectory a fixed time ahead, pushed further along until it
    /// is at least the minimum lookahead distance from the robot.
    fn lookahead(&self, pose: &Pose2, trajectory: &TimedTrajectory, t_s: f64) -> Pose2 {
        let t_ahead = t_s + self.lookahead_time_s;
        let mut lookahead = trajectory.sample(t_ahead).pose();

        if let Some(start) = trajectory.next_index(t_ahead) {
            for s in trajectory.samples()[start..].iter() {
                if lookahead.translation.distance(&pose.translation).m() >= self.min_lookahead_m {
                    break;
                }
                lookahead = s.pose();
            }
        }

        lookahead
    }
}

impl TrackingLaw for FeedForward {
    fn chassis_vel(
        &self,
        _pose: &Pose2,
        reference: &TimedSample,
        _trajectory: &TimedTrajectory,
        _t_s: f64,
    ) -> ChassisVel {
        ChassisVel {
            v_ms: reference.vel_ms,
            omega_rads: reference.omega_rads(),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the tracking law of the given kind from the parameters.
pub fn build_law(kind: TrackingLawKind, params: &Params) -> Box<dyn TrackingLaw> {
    match kind {
        TrackingLawKind::Ramsete => Box::new(Ramsete {
            beta: params.ramsete_beta,
            zeta: params.ramsete_zeta,
        }),
        TrackingLawKind::PurePursuit => Box::new(PurePursuit {
            k_lat: params.pure_pursuit_k_lat,
            lookahead_time_s: params.pure_pursuit_lookahead_time_s,
            min_lookahead_m: params.pure_pursuit_min_lookahead_m,
        }),
        TrackingLawKind::FeedForward => Box::new(FeedForward),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn reference(x_m: f64, y_m: f64, heading_rad: f64, vel_ms: f64, curvature_m: f64) -> TimedSample {
        TimedSample {
            t_s: 0.0,
            x_m,
            y_m,
            heading_rad,
            curvature_m,
            vel_ms,
            accel_mss: 0.0,
        }
    }

    fn straight() -> TimedTrajectory {
        TimedTrajectory::new(vec![
            reference(0.0, 0.0, 0.0, 1.0, 0.0),
            TimedSample {
                t_s: 10.0,
                ..reference(10.0, 0.0, 0.0, 1.0, 0.0)
            },
        ])
        .unwrap()
    }

    const RAMSETE: Ramsete = Ramsete {
        beta: 2.0,
        zeta: 0.7,
    };

    #[test]
    fn test_ramsete_on_track_is_feedforward() {
        let r = reference(1.0, 2.0, 0.5, 1.5, 0.2);
        let out = RAMSETE.chassis_vel(&r.pose(), &r, &straight(), 0.0);
        let ff = FeedForward.chassis_vel(&r.pose(), &r, &straight(), 0.0);

        assert_relative_eq!(out.v_ms, ff.v_ms, epsilon = 1e-12);
        assert_relative_eq!(out.omega_rads, ff.omega_rads, epsilon = 1e-12);
        assert_relative_eq!(ff.omega_rads, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_ramsete_corrects_errors() {
        let r = reference(0.0, 0.0, 0.0, 1.0, 0.0);
        let k = 2.0 * 0.7 * (2.0f64).sqrt();

        // Behind the reference, speed up
        let out = RAMSETE.chassis_vel(&Pose2::from_m_rad(-0.1, 0.0, 0.0), &r, &straight(), 0.0);
        assert_relative_eq!(out.v_ms, 1.0 + k * 0.1, epsilon = 1e-12);
        assert_relative_eq!(out.omega_rads, 0.0, epsilon = 1e-12);

        // Right of the reference, turn left
        let out = RAMSETE.chassis_vel(&Pose2::from_m_rad(0.0, -0.1, 0.0), &r, &straight(), 0.0);
        assert_relative_eq!(out.omega_rads, 2.0 * 0.1, epsilon = 1e-12);

        // Pointing right of the reference, turn left
        let out = RAMSETE.chassis_vel(&Pose2::from_m_rad(0.0, 0.0, -0.2), &r, &straight(), 0.0);
        assert!(out.omega_rads > 0.0);
    }

    #[test]
    fn test_pure_pursuit() {
        let pp = PurePursuit {
            k_lat: 1.0,
            lookahead_time_s: 1.0,
            min_lookahead_m: 0.5,
        };
        let traj = straight();

        // On the path, drive straight
        let r = traj.sample(2.0);
        let out = pp.chassis_vel(&r.pose(), &r, &traj, 2.0);
        assert_relative_eq!(out.v_ms, 1.0, epsilon = 1e-12);
        assert_relative_eq!(out.omega_rads, 0.0, epsilon = 1e-12);

        // Left of the path, lookahead point 1 m ahead and 1 m right
        let out = pp.chassis_vel(&Pose2::from_m_rad(2.0, 1.0, 0.0), &r, &traj, 2.0);
        assert_relative_eq!(out.omega_rads, out.v_ms * 2.0 * -1.0 / 2.0, epsilon = 1e-12);
        assert!(out.omega_rads < 0.0);
    }

    #[test]
    fn test_pure_pursuit_min_lookahead() {
        let pp = PurePursuit {
            k_lat: 0.0,
            lookahead_time_s: 0.0,
            min_lookahead_m: 3.0,
        };
        let traj = TimedTrajectory::new(
            (0..=10)
                .map(|i| TimedSample {
                    t_s: i as f64,
                    ..reference(i as f64, 0.0, 0.0, 1.0, 0.0)
                })
                .collect(),
        )
        .unwrap();

        // Robot 1 m left of the path at x = 2, the lookahead must be pushed out to x = 5
        let pose = Pose2::from_m_rad(2.0, 1.0, 0.0);
        let l = pp.lookahead(&pose, &traj, 2.0);
        assert_relative_eq!(l.translation.x.m(), 5.0);
    }
}
