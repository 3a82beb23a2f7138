//! Trajectory tracker state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::{geom::Pose2, loc::LocHandle};
use comms_if::{eqpt::drive::Gear, tc::drive::TrackingLawKind};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A pose estimate this close to a requested reset pose shows the reset has been applied.
///
/// Units: meters
const POSE_RESET_TOLERANCE_M: f64 = 0.05;

/// Units: radians
const POSE_RESET_TOLERANCE_RAD: f64 = 0.05;

/// Tracking starts anyway if a pose reset hasn't shown up after this long.
///
/// Units: seconds
const POSE_RESET_TIMEOUT_S: f64 = 0.25;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory tracker module state
#[derive(Default)]
pub struct TrajTracker {
    params: Option<Params>,

    state: TrackerState,

    trajectory: Option<TimedTrajectory>,

    law: Option<Box<dyn TrackingLaw>>,

    model: Option<DiffDriveModel>,

    /// Pose reset sent to localisation which hasn't been seen in the estimate yet
    pending_reset: Option<PendingReset>,

    /// Time given to the last reset
    start_time_s: f64,

    /// Tracking time, never goes backwards
    elapsed_s: f64,

    /// Distance between the robot and the reference on the last cycle
    ///
    /// Units: meters
    position_error_m: f64,

    report: StatusReport,
}

#[derive(Debug, Clone, Copy)]
struct PendingReset {
    pose: Pose2,
    requested_s: f64,
}

/// Input data to the tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Current pose estimate
    pub pose: Pose2,

    /// Current time, on the same clock as the time given to `reset`.
    ///
    /// Units: seconds
    pub now_s: f64,

    /// Current drivetrain gear, which sets the speed limit
    pub gear: Gear,
}

/// Status report for trajectory tracking.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub state: TrackerState,

    /// The trajectory sample being tracked
    pub reference: Option<TimedSample>,

    /// Units: meters
    pub position_error_m: f64,

    /// Units: seconds
    pub elapsed_s: f64,

    /// Chassis velocity given by the wheel demands, after speed limiting
    pub commanded: ChassisVel,

    /// Left and right wheel angular speeds of the wheel demands.
    ///
    /// Units: radians/second
    pub wheel_rates_rads: (f64, f64),

    /// Set on the cycle the trajectory finished
    pub just_finished: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerState {
    /// No trajectory loaded
    Init,

    /// Holding still until a requested pose reset shows up in the estimate
    AwaitingPoseReset,

    Tracking,

    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrackerState {
    fn default() -> Self {
        TrackerState::Init
    }
}

impl State for TrajTracker {
    type Params = Params;

    type InputData = InputData;
    type OutputData = Option<WheelDems>;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    fn from_params(params: Params) -> Self {
        Self {
            model: Some(DiffDriveModel::new(&params)),
            params: Some(params),
            ..Default::default()
        }
    }

    /// Track the current trajectory.
    ///
    /// Outputs `None` when no trajectory has been loaded, and zero wheel demands once the
    /// trajectory has finished.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        let output = match self.state {
            TrackerState::Init => None,
            _ => Some(self.next_state(&input_data.pose, input_data.now_s, input_data.gear)?),
        };

        self.report.state = self.state;
        self.report.elapsed_s = self.elapsed_s;
        self.report.position_error_m = self.position_error_m;

        Ok((output, self.report))
    }
}

impl TrajTracker {
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Start tracking `trajectory` from time `now_s`.
    ///
    /// If `pose_reset` is given the localisation worker is asked to reset the pose estimate to the
    /// first pose of the trajectory, and tracking only starts once the estimate has been reset.
    /// The law defaults to the one in the parameters.
    pub fn reset(
        &mut self,
        trajectory: TimedTrajectory,
        law: Option<TrackingLawKind>,
        now_s: f64,
        pose_reset: Option<&LocHandle>,
    ) -> Result<(), TrajCtrlError> {
        let params = self.params.as_ref().ok_or(TrajCtrlError::NotInitialised)?;

        self.pending_reset = None;
        if let Some(loc) = pose_reset {
            let pose = trajectory.first().pose();
            loc.request_reset(pose)
                .map_err(TrajCtrlError::PoseResetFailed)?;
            self.pending_reset = Some(PendingReset {
                pose,
                requested_s: now_s,
            });
        }

        let law = law.unwrap_or(params.default_law);
        self.law = Some(build_law(law, params));

        info!(
            "Tracking trajectory of {} samples ({:.2} s) with {:?}",
            trajectory.samples().len(),
            trajectory.duration_s(),
            law
        );

        self.trajectory = Some(trajectory);
        self.start_time_s = now_s;
        self.elapsed_s = 0.0;
        self.position_error_m = 0.0;
        self.state = match self.pending_reset {
            Some(_) => TrackerState::AwaitingPoseReset,
            None => TrackerState::Tracking,
        };

        Ok(())
    }

    /// Drive from `pose` to the fixed `target` pose, starting at time `now_s`.
    pub fn follow_pose(
        &mut self,
        pose: &Pose2,
        target: &Pose2,
        law: Option<TrackingLawKind>,
        now_s: f64,
    ) -> Result<(), TrajCtrlError> {
        let params = self.params.as_ref().ok_or(TrajCtrlError::NotInitialised)?;
        let limits = ProfileLimits {
            max_speed_ms: params.pose_target_max_speed_ms,
            max_accel_mss: params.pose_target_max_accel_mss,
        };

        let trajectory = trajectory_to_pose(pose, target, &limits, 0.0)
            .map_err(TrajCtrlError::TrajectoryError)?;

        info!("Driving to target pose {:?}", target);

        self.reset(trajectory, law, now_s, None)
    }

    /// Stop tracking, dropping the current trajectory.
    pub fn stop(&mut self) {
        if matches!(
            self.state,
            TrackerState::Tracking | TrackerState::AwaitingPoseReset
        ) {
            warn!("Trajectory tracking stopped before the end of the trajectory");
        }

        self.pending_reset = None;
        self.trajectory = None;
        self.law = None;
        self.state = TrackerState::Init;
    }

    /// Get the wheel demands for the current pose and time.
    pub fn next_state(
        &mut self,
        pose: &Pose2,
        now_s: f64,
        gear: Gear,
    ) -> Result<WheelDems, TrajCtrlError> {
        let params = self.params.as_ref().ok_or(TrajCtrlError::NotInitialised)?;

        if self.state == TrackerState::Finished {
            return Ok(WheelDems::default());
        }

        if let Some(pending) = self.pending_reset {
            let offset = pose.relative_to(&pending.pose);
            let applied = offset.translation.norm().m() <= POSE_RESET_TOLERANCE_M
                && offset.rotation.rad().abs() <= POSE_RESET_TOLERANCE_RAD;
            let timed_out = now_s - pending.requested_s >= POSE_RESET_TIMEOUT_S;

            if !applied && !timed_out {
                return Ok(WheelDems::default());
            }
            if !applied {
                warn!(
                    "Pose reset to {:?} not seen after {} s, tracking from {:?}",
                    pending.pose, POSE_RESET_TIMEOUT_S, pose
                );
            }

            self.pending_reset = None;
            self.start_time_s = now_s;
            self.state = TrackerState::Tracking;
        }

        let (trajectory, law, model) = match (&self.trajectory, &self.law, &self.model) {
            (Some(t), Some(l), Some(m)) => (t, l, m),
            _ => return Err(TrajCtrlError::NotTracking),
        };

        // Time only moves forwards
        self.elapsed_s = self.elapsed_s.max(now_s - self.start_time_s);

        let t_s = trajectory.start_time_s() + self.elapsed_s;
        let reference = trajectory.sample(t_s);

        self.position_error_m = pose.translation.distance(&reference.pose().translation).m();
        self.report.reference = Some(reference);

        let max_speed_ms = params.max_speed_ms.get(gear);
        let mut chassis = law.chassis_vel(pose, &reference, trajectory, t_s);
        chassis.v_ms = util::maths::limit(chassis.v_ms, max_speed_ms);

        let accel = ChassisVel {
            v_ms: reference.accel_mss,
            omega_rads: reference.accel_mss * reference.curvature_m,
        };

        let dems = model.wheel_dems(&chassis, &accel, max_speed_ms);
        self.report.commanded = model.chassis_vel(dems.left.vel_ms, dems.right.vel_ms);
        self.report.wheel_rates_rads = (
            model.wheel_rate_rads(dems.left.vel_ms),
            model.wheel_rate_rads(dems.right.vel_ms),
        );

        if self.is_finished() {
            info!(
                "Trajectory finished after {:.2} s, {:.3} m from the end",
                self.elapsed_s, self.position_error_m
            );
            self.state = TrackerState::Finished;
            self.report.just_finished = true;
            self.report.commanded = ChassisVel::default();
            self.report.wheel_rates_rads = (0.0, 0.0);
            return Ok(WheelDems::default());
        }

        debug!("Tracking {:?} -> {:?}", reference, dems);

        Ok(dems)
    }

    /// True once the whole trajectory has been played and, if a finish tolerance is set, the
    /// robot is close enough to its end.
    pub fn is_finished(&self) -> bool {
        let (params, trajectory) = match (&self.params, &self.trajectory) {
            (Some(p), Some(t)) => (p, t),
            _ => return false,
        };

        if self.state == TrackerState::Finished {
            return true;
        }

        let time_done = self.elapsed_s >= trajectory.duration_s();
        let position_done = match params.finish_tolerance_m {
            Some(tol) => self.position_error_m <= tol,
            None => true,
        };

        self.state == TrackerState::Tracking && time_done && position_done
    }
}
