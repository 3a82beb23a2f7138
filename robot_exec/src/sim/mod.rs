//! # Plant simulation
//!
//! A simple simulation of the superstructure joints and the drivetrain, used in place of the motor
//! controllers and sensors so the control software can be run end to end on a development
//! machine.
//!
//! Each joint moves towards its position demand with a first order response, rate limited to the
//! joint's maximum speed. A neutral joint holds its position. Each side of the drivetrain follows
//! its speed demand with a first order response, and the robot's motion is integrated as a skid
//! steer vehicle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    geom::{Pose2, Twist2},
    loc::OdometrySource,
    units::{Angle, Length},
};
use comms_if::eqpt::{
    drive::{DriveDems, DriveSens, SideDemand},
    superstructure::{JointDemand, JointDems, JointSens},
};

pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated plant.
#[derive(Debug, Clone)]
pub struct SimPlant {
    params: Params,

    joints: JointSens,

    drive: DriveSens,

    /// True pose of the robot
    pose: Pose2,
}

/// Shared access to a simulated plant.
#[derive(Debug, Clone)]
pub struct SimHandle(Arc<Mutex<SimPlant>>);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("The simulation lock was poisoned")]
    PoisonError,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimPlant {
    pub fn new(params: Params) -> Self {
        let joints = JointSens {
            elevator_height_m: Length::from_in(params.initial_elevator_height_in).m(),
            elbow_angle_rad: Angle::from_deg(params.initial_elbow_deg).rad(),
            wrist_angle_rad: Angle::from_deg(params.initial_wrist_deg).rad(),
            held_piece: params.initial_held_piece,
        };

        Self {
            params,
            joints,
            drive: DriveSens::default(),
            pose: Pose2::default(),
        }
    }

    pub fn joint_sens(&self) -> JointSens {
        self.joints
    }

    pub fn drive_sens(&self) -> DriveSens {
        self.drive
    }

    pub fn true_pose(&self) -> Pose2 {
        self.pose
    }

    /// Advance the simulation by `dt_s` seconds under the given demands.
    pub fn step(&mut self, dt_s: f64, joint_dems: &JointDems, drive_dems: &DriveDems) {
        if dt_s <= 0.0 {
            return;
        }

        let p = &self.params;

        self.joints.elevator_height_m = joint_response(
            self.joints.elevator_height_m,
            joint_dems.elevator,
            Length::from_in(p.elevator_max_rate_ins).m(),
            p.joint_time_constant_s,
            dt_s,
        );
        self.joints.elbow_angle_rad = joint_response(
            self.joints.elbow_angle_rad,
            joint_dems.elbow,
            Angle::from_deg(p.elbow_max_rate_degs).rad(),
            p.joint_time_constant_s,
            dt_s,
        );
        self.joints.wrist_angle_rad = joint_response(
            self.joints.wrist_angle_rad,
            joint_dems.wrist,
            Angle::from_deg(p.wrist_max_rate_degs).rad(),
            p.joint_time_constant_s,
            dt_s,
        );

        // ---- DRIVE ----

        let max_speed = p.max_speed_ms.get(drive_dems.gear);
        let alpha = first_order_alpha(p.drive_time_constant_s, dt_s);

        let left_target = side_speed(drive_dems.left, max_speed);
        let right_target = side_speed(drive_dems.right, max_speed);
        self.drive.left_vel_ms += alpha * (left_target - self.drive.left_vel_ms);
        self.drive.right_vel_ms += alpha * (right_target - self.drive.right_vel_ms);

        let dl = self.drive.left_vel_ms * dt_s;
        let dr = self.drive.right_vel_ms * dt_s;
        self.drive.left_dist_m += dl;
        self.drive.right_dist_m += dr;

        let twist = Twist2 {
            dx: Length::from_m(0.5 * (dl + dr)),
            dy: Length::ZERO,
            dtheta: Angle::from_rad((dr - dl) / p.track_width_m),
        };
        self.pose = self.pose.exp(&twist);
        self.drive.heading_rad = self.pose.rotation.rad();

        trace!("Sim joints: {:?}, pose: {:?}", self.joints, self.pose);
    }
}

impl SimHandle {
    pub fn new(plant: SimPlant) -> Self {
        Self(Arc::new(Mutex::new(plant)))
    }

    pub fn step(
        &self,
        dt_s: f64,
        joint_dems: &JointDems,
        drive_dems: &DriveDems,
    ) -> Result<(), SimError> {
        self.0.lock()?.step(dt_s, joint_dems, drive_dems);
        Ok(())
    }

    pub fn joint_sens(&self) -> Result<JointSens, SimError> {
        Ok(self.0.lock()?.joint_sens())
    }

    pub fn drive_sens(&self) -> Result<DriveSens, SimError> {
        Ok(self.0.lock()?.drive_sens())
    }

    pub fn true_pose(&self) -> Result<Pose2, SimError> {
        Ok(self.0.lock()?.true_pose())
    }
}

impl OdometrySource for SimHandle {
    fn read_odometry(&mut self) -> Option<DriveSens> {
        self.0.lock().ok().map(|p| p.drive_sens())
    }
}

impl<G> From<PoisonError<G>> for SimError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Fraction of the remaining error removed in one step of a first order response.
fn first_order_alpha(time_constant_s: f64, dt_s: f64) -> f64 {
    if time_constant_s <= 0.0 {
        1.0
    } else {
        1.0 - (-dt_s / time_constant_s).exp()
    }
}

fn joint_response(
    position: f64,
    demand: JointDemand,
    max_rate: f64,
    time_constant_s: f64,
    dt_s: f64,
) -> f64 {
    match demand {
        JointDemand::Neutral => position,
        JointDemand::Position(target) => {
            let step = first_order_alpha(time_constant_s, dt_s) * (target - position);
            let max_step = max_rate * dt_s;
            position + util::maths::limit(step, max_step)
        }
    }
}

fn side_speed(demand: SideDemand, max_speed_ms: f64) -> f64 {
    match demand {
        SideDemand::Power(p) => util::maths::limit(p, 1.0) * max_speed_ms,
        SideDemand::Velocity { vel_ms, .. } => util::maths::limit(vel_ms, max_speed_ms),
        SideDemand::Neutral => 0.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::GearLimits;
    use approx::assert_relative_eq;
    use comms_if::eqpt::{drive::Gear, superstructure::HeldPiece};

    fn params() -> Params {
        Params {
            joint_time_constant_s: 0.0,
            elevator_max_rate_ins: 50.0,
            elbow_max_rate_degs: 180.0,
            wrist_max_rate_degs: 360.0,
            initial_elevator_height_in: 5.0,
            initial_elbow_deg: 0.0,
            initial_wrist_deg: 0.0,
            initial_held_piece: HeldPiece::None,
            drive_time_constant_s: 0.0,
            track_width_m: 0.5,
            max_speed_ms: GearLimits { low: 2.0, high: 4.0 },
        }
    }

    #[test]
    fn test_joint_rate_limit() {
        let mut sim = SimPlant::new(params());
        let dems = JointDems {
            elevator: JointDemand::Position(Length::from_in(25.0).m()),
            elbow: JointDemand::Neutral,
            wrist: JointDemand::Position(Angle::from_deg(10.0).rad()),
        };

        sim.step(0.1, &dems, &DriveDems::neutral(Gear::Low));
        let s = sim.joint_sens();
        assert_relative_eq!(Length::from_m(s.elevator_height_m).inches(), 10.0, epsilon = 1e-9);
        assert_eq!(s.elbow_angle_rad, 0.0);
        assert_relative_eq!(Angle::from_rad(s.wrist_angle_rad).deg(), 10.0, epsilon = 1e-9);

        for _ in 0..10 {
            sim.step(0.1, &dems, &DriveDems::neutral(Gear::Low));
        }
        assert_relative_eq!(
            Length::from_m(sim.joint_sens().elevator_height_m).inches(),
            25.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_drive_spin() {
        let mut sim = SimPlant::new(params());
        let dems = DriveDems {
            left: SideDemand::Power(-0.5),
            right: SideDemand::Power(0.5),
            gear: Gear::Low,
        };

        // 1 m/s each way on a 0.5 m track is 4 rad/s
        sim.step(0.1, &JointDems::neutral(), &dems);
        assert_relative_eq!(sim.drive_sens().heading_rad, 0.4, epsilon = 1e-12);
        assert_relative_eq!(sim.true_pose().translation.x.m(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(sim.drive_sens().left_dist_m, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_handle_odometry() {
        let mut handle = SimHandle::new(SimPlant::new(params()));
        let dems = DriveDems {
            left: SideDemand::Velocity { vel_ms: 1.0, ff: 0.0 },
            right: SideDemand::Velocity { vel_ms: 1.0, ff: 0.0 },
            gear: Gear::High,
        };

        handle.step(0.5, &JointDems::neutral(), &dems).unwrap();
        let odo = handle.read_odometry().unwrap();
        assert_relative_eq!(odo.left_dist_m, 0.5);
        assert_relative_eq!(handle.true_pose().unwrap().translation.x.m(), 0.5);
    }
}
