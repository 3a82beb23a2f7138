//! # Plan executor
//!
//! Runs a `MotionPlan` one control cycle at a time, producing joint demands.
//!
//! Launch rules:
//!
//! - A `Sequential` step must complete before any later step is launched.
//! - A `ParallelWithNext` step is launched together with the step after it.
//!
//! Each joint is owned by at most one step at a time. A step which acquires a joint owned by
//! another step interrupts that step, and any joint the interrupted step owned which isn't taken
//! over goes neutral. Joints not owned by any step hold the last setpoint that completed on them,
//! or the measured position at the start of the plan.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use serde::Serialize;

use super::{ArmState, MotionKind, MotionPlan, Params, StepOrdering, SuperStructureState};
use crate::units::{Angle, Length};
use comms_if::eqpt::superstructure::{JointDemand, JointDems};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NUM_JOINTS: usize = 3;

const ARM_JOINTS: [Joint; 2] = [Joint::Elbow, Joint::Wrist];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Executes motion plans.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor {
    plan: MotionPlan,

    /// Status of each step in the plan
    status: Vec<StepStatus>,

    /// Index of the next waypoint of each step (only used by passthroughs)
    progress: Vec<usize>,

    /// Index of the next step to launch
    next: usize,

    /// The step owning each joint
    owners: [Option<usize>; NUM_JOINTS],

    /// Setpoints of joints not owned by any step. `None` is neutral.
    holds: [Option<f64>; NUM_JOINTS],

    /// True between `start` and `cancel`
    active: bool,

    stowed: ArmState,
    elevator_done_tolerance: Length,
    arm_done_tolerance: Angle,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A joint of the superstructure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Joint {
    Elevator = 0,
    Elbow = 1,
    Wrist = 2,
}

/// Status of a single step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    /// Not yet launched.
    Pending,

    /// Launched, waiting for a condition before acquiring its joints.
    Waiting,

    /// Driving its joints.
    Running,

    Complete,

    /// Lost a joint to another step.
    Interrupted,
}

/// Status of the executor as a whole.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ExecutorStatus {
    /// No plan loaded.
    Idle,

    Running,

    /// Every step of the plan has finished.
    Complete,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ExecutorStatus {
    fn default() -> Self {
        ExecutorStatus::Idle
    }
}

impl StepStatus {
    fn is_active(&self) -> bool {
        matches!(self, StepStatus::Waiting | StepStatus::Running)
    }

    fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Complete | StepStatus::Interrupted)
    }
}

impl PlanExecutor {
    pub fn new(params: &Params) -> Self {
        Self {
            plan: MotionPlan::default(),
            status: vec![],
            progress: vec![],
            next: 0,
            owners: [None; NUM_JOINTS],
            holds: [None; NUM_JOINTS],
            active: false,
            stowed: params.stowed_arm(),
            elevator_done_tolerance: Length::from_in(params.elevator_done_tolerance_in),
            arm_done_tolerance: Angle::from_deg(params.arm_done_tolerance_deg),
        }
    }

    /// Load a new plan, replacing any current one.
    ///
    /// Joints hold their measured positions until a step takes them.
    pub fn start(&mut self, plan: MotionPlan, measured: &SuperStructureState) {
        let num_steps = plan.len();

        self.plan = plan;
        self.status = vec![StepStatus::Pending; num_steps];
        self.progress = vec![0; num_steps];
        self.next = 0;
        self.owners = [None; NUM_JOINTS];
        self.holds = [
            Some(measured.elevator_height().m()),
            Some(measured.elbow_angle().rad()),
            Some(measured.wrist_angle().rad()),
        ];
        self.active = true;

        debug!("Executor started plan with {} steps", num_steps);
    }

    /// Stop the current plan, all joints go neutral.
    pub fn cancel(&mut self) {
        if self.status() == ExecutorStatus::Running {
            info!("Cancelling superstructure plan");
        }

        self.plan = MotionPlan::default();
        self.status.clear();
        self.progress.clear();
        self.next = 0;
        self.owners = [None; NUM_JOINTS];
        self.holds = [None; NUM_JOINTS];
        self.active = false;
    }

    pub fn status(&self) -> ExecutorStatus {
        if !self.active {
            ExecutorStatus::Idle
        } else if self.next >= self.plan.len() && self.status.iter().all(|s| s.is_terminal()) {
            ExecutorStatus::Complete
        } else {
            ExecutorStatus::Running
        }
    }

    pub fn step_statuses(&self) -> &[StepStatus] {
        &self.status
    }

    /// The step currently owning the given joint.
    pub fn owner(&self, joint: Joint) -> Option<usize> {
        self.owners[joint as usize]
    }

    /// Advance the plan by one cycle and get the joint demands.
    pub fn tick(&mut self, measured: &SuperStructureState) -> JointDems {
        // ---- UPDATE ACTIVE STEPS ----

        for i in 0..self.next {
            match self.status[i] {
                StepStatus::Waiting => self.check_wait(i, measured),
                StepStatus::Running => {
                    if self.is_step_complete(i, measured) {
                        self.complete(i);
                    }
                }
                _ => (),
            }
        }

        // ---- LAUNCH NEW STEPS ----

        while self.next < self.plan.len() && !self.is_blocked() {
            let i = self.next;
            self.next += 1;
            self.launch(i, measured);
        }

        // ---- DEMANDS ----

        let dems = JointDems {
            elevator: self.demand(Joint::Elevator),
            elbow: self.demand(Joint::Elbow),
            wrist: self.demand(Joint::Wrist),
        };

        trace!("Superstructure demands: {:?}", dems);

        dems
    }

    /// True if a launched sequential step hasn't finished yet.
    fn is_blocked(&self) -> bool {
        (0..self.next).any(|i| {
            self.plan.steps[i].ordering == StepOrdering::Sequential && self.status[i].is_active()
        })
    }

    fn launch(&mut self, i: usize, measured: &SuperStructureState) {
        debug!("Launching step {}: {:?}", i, self.plan.steps[i].kind);

        match self.plan.steps[i].kind {
            MotionKind::PassThrough { .. } | MotionKind::StowArm => {
                self.status[i] = StepStatus::Running;
                self.acquire(i, &ARM_JOINTS);
            }
            MotionKind::ArmWaitForElevator { .. } => {
                self.status[i] = StepStatus::Waiting;
                self.check_wait(i, measured);
            }
            MotionKind::ElevatorMove { .. } => {
                self.status[i] = StepStatus::Running;
                self.acquire(i, &[Joint::Elevator]);
            }
        }
    }

    /// Start a waiting arm move if the elevator has reached its threshold.
    fn check_wait(&mut self, i: usize, measured: &SuperStructureState) {
        if let MotionKind::ArmWaitForElevator {
            height,
            tolerance,
            direction,
            ..
        } = self.plan.steps[i].kind
        {
            if direction.threshold_met(measured.elevator_height(), height, tolerance) {
                debug!("Step {} elevator threshold reached, moving arm", i);
                self.status[i] = StepStatus::Running;
                self.acquire(i, &ARM_JOINTS);
            }
        }
    }

    /// Give the joints to step `i`, interrupting any other owner.
    fn acquire(&mut self, i: usize, joints: &[Joint]) {
        for &joint in joints {
            if let Some(j) = self.owners[joint as usize] {
                if j != i {
                    self.interrupt(j);
                }
            }
            self.owners[joint as usize] = Some(i);
        }
    }

    /// Interrupt step `j`, its joints are released to neutral.
    fn interrupt(&mut self, j: usize) {
        warn!("Superstructure step {} interrupted", j);
        self.status[j] = StepStatus::Interrupted;

        for joint in 0..NUM_JOINTS {
            if self.owners[joint] == Some(j) {
                self.owners[joint] = None;
                self.holds[joint] = None;
            }
        }
    }

    /// Complete step `i`, its joints hold their final setpoints.
    fn complete(&mut self, i: usize) {
        debug!("Superstructure step {} complete", i);
        self.status[i] = StepStatus::Complete;

        for joint in 0..NUM_JOINTS {
            if self.owners[joint] == Some(i) {
                self.holds[joint] = self.setpoint(i, joint);
                self.owners[joint] = None;
            }
        }
    }

    fn is_step_complete(&mut self, i: usize, measured: &SuperStructureState) -> bool {
        let arm_tol = self.arm_done_tolerance;

        match self.plan.steps[i].kind {
            MotionKind::PassThrough { ref waypoints, .. } => {
                // Advance through the waypoints as each is reached
                while self.progress[i] < waypoints.len()
                    && measured.arm.within(&waypoints[self.progress[i]], arm_tol)
                {
                    self.progress[i] += 1;
                }
                self.progress[i] >= waypoints.len()
            }
            MotionKind::StowArm => measured.arm.within(&self.stowed, arm_tol),
            MotionKind::ArmWaitForElevator { ref arm, .. } => measured.arm.within(arm, arm_tol),
            MotionKind::ElevatorMove { height } => {
                (measured.elevator_height() - height).abs() <= self.elevator_done_tolerance
            }
        }
    }

    /// The setpoint step `i` demands of the joint, in meters or radians.
    fn setpoint(&self, i: usize, joint: usize) -> Option<f64> {
        let arm = match self.plan.steps[i].kind {
            MotionKind::PassThrough { ref waypoints, .. } => {
                let idx = self.progress[i].min(waypoints.len().saturating_sub(1));
                waypoints.get(idx).copied()
            }
            MotionKind::StowArm => Some(self.stowed),
            MotionKind::ArmWaitForElevator { arm, .. } => Some(arm),
            MotionKind::ElevatorMove { height } => {
                return if joint == Joint::Elevator as usize {
                    Some(height.m())
                } else {
                    None
                };
            }
        }?;

        match joint {
            j if j == Joint::Elbow as usize => Some(arm.elbow.angle().rad()),
            j if j == Joint::Wrist as usize => Some(arm.wrist.angle().rad()),
            _ => None,
        }
    }

    fn demand(&self, joint: Joint) -> JointDemand {
        let j = joint as usize;

        let setpoint = match self.owners[j] {
            Some(i) => self.setpoint(i, j),
            None => self.holds[j],
        };

        match setpoint {
            Some(s) => JointDemand::Position(s),
            None => JointDemand::Neutral,
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::{params::test_params::params, planner};
    use super::*;
    use approx::assert_relative_eq;
    use comms_if::eqpt::superstructure::HeldPiece;

    fn state(h_in: f64, elbow_deg: f64, wrist_deg: f64) -> SuperStructureState {
        SuperStructureState::new(
            Length::from_in(h_in),
            Angle::from_deg(elbow_deg),
            Angle::from_deg(wrist_deg),
            HeldPiece::None,
        )
    }

    fn position(d: JointDemand) -> f64 {
        match d {
            JointDemand::Position(p) => p,
            JointDemand::Neutral => panic!("Expected a position demand"),
        }
    }

    #[test]
    fn test_crossbar_plan_execution() {
        let p = params();
        let current = state(5.0, 0.0, 0.0);
        let goal = state(25.0, 0.0, 0.0);
        let report = planner::plan(&goal, &current, &p);

        let mut ex = PlanExecutor::new(&p);
        ex.start(report.plan, &current);

        // Stow runs alone, the elevator holds where it is
        let dems = ex.tick(&current);
        assert_eq!(ex.step_statuses()[0], StepStatus::Running);
        assert_eq!(ex.step_statuses()[1], StepStatus::Pending);
        assert_relative_eq!(position(dems.elevator), Length::from_in(5.0).m());
        assert_relative_eq!(position(dems.elbow), 90f64.to_radians());

        // Arm reaches stow, the elevator move starts with the arm waiting
        let stowed = state(5.0, 90.0, 90.0);
        let dems = ex.tick(&stowed);
        assert_eq!(ex.step_statuses()[0], StepStatus::Complete);
        assert_eq!(ex.step_statuses()[1], StepStatus::Waiting);
        assert_eq!(ex.step_statuses()[2], StepStatus::Running);
        assert_relative_eq!(position(dems.elevator), Length::from_in(25.0).m());
        assert_relative_eq!(position(dems.elbow), 90f64.to_radians());

        // Elevator close to the goal, the arm moves out
        let dems = ex.tick(&state(23.0, 90.0, 90.0));
        assert_eq!(ex.step_statuses()[1], StepStatus::Running);
        assert_relative_eq!(position(dems.elbow), 0.0);
        assert_eq!(ex.owner(Joint::Elbow), Some(1));

        // The elevator is within its done tolerance too, it holds the goal height
        assert_eq!(ex.step_statuses()[2], StepStatus::Complete);
        assert_eq!(ex.owner(Joint::Elevator), None);
        assert_relative_eq!(position(dems.elevator), Length::from_in(25.0).m());

        // Everything arrives
        ex.tick(&goal);
        assert_eq!(ex.status(), ExecutorStatus::Complete);

        // Joints keep holding the final setpoints
        let dems = ex.tick(&goal);
        assert_relative_eq!(position(dems.elevator), Length::from_in(25.0).m());
        assert_relative_eq!(position(dems.wrist), 0.0);
    }

    #[test]
    fn test_long_climb_arm_wait_interrupts_stow() {
        let p = params();
        let current = state(30.0, 0.0, 0.0);
        let goal = state(65.0, 10.0, 0.0);
        let report = planner::plan(&goal, &current, &p);
        assert_eq!(report.plan.len(), 3);

        let mut ex = PlanExecutor::new(&p);
        ex.start(report.plan, &current);

        // All three launch together, stow owns the arm
        ex.tick(&current);
        assert_eq!(ex.step_statuses()[0], StepStatus::Running);
        assert_eq!(ex.step_statuses()[1], StepStatus::Waiting);
        assert_eq!(ex.step_statuses()[2], StepStatus::Running);
        assert_eq!(ex.owner(Joint::Elbow), Some(0));

        // Elevator nearly there before the arm finished stowing
        let dems = ex.tick(&state(63.0, 60.0, 60.0));
        assert_eq!(ex.step_statuses()[0], StepStatus::Interrupted);
        assert_eq!(ex.owner(Joint::Elbow), Some(1));
        assert_relative_eq!(position(dems.elbow), 10f64.to_radians());

        ex.tick(&goal);
        assert_eq!(ex.status(), ExecutorStatus::Complete);
    }

    #[test]
    fn test_passthrough_waypoints() {
        let p = params();
        let current = state(40.0, 20.0, 0.0);
        let goal = state(40.0, 160.0, 180.0);
        let report = planner::plan(&goal, &current, &p);

        let mut ex = PlanExecutor::new(&p);
        ex.start(report.plan, &current);

        // First fold the wrist in place
        let dems = ex.tick(&current);
        assert_relative_eq!(position(dems.elbow), 20f64.to_radians());
        assert_relative_eq!(position(dems.wrist), 90f64.to_radians());

        // Then swing the elbow over
        let dems = ex.tick(&state(40.0, 20.0, 90.0));
        assert_relative_eq!(position(dems.elbow), 150f64.to_radians());
        assert_relative_eq!(position(dems.wrist), 90f64.to_radians());
        assert_eq!(ex.step_statuses()[0], StepStatus::Running);

        // Passthrough done, arm and elevator steps launch
        ex.tick(&state(40.0, 150.0, 90.0));
        assert_eq!(ex.step_statuses()[0], StepStatus::Complete);
        assert_eq!(ex.step_statuses()[1], StepStatus::Running);
    }

    #[test]
    fn test_cancel_goes_neutral() {
        let p = params();
        let current = state(5.0, 0.0, 0.0);
        let report = planner::plan(&state(25.0, 0.0, 0.0), &current, &p);

        let mut ex = PlanExecutor::new(&p);
        ex.start(report.plan, &current);
        ex.tick(&current);

        ex.cancel();
        assert_eq!(ex.status(), ExecutorStatus::Idle);
        assert_eq!(ex.tick(&current), JointDems::neutral());
    }

    #[test]
    fn test_empty_plan_holds() {
        let p = params();
        let current = state(5.0, 0.0, 0.0);

        let mut ex = PlanExecutor::new(&p);
        assert_eq!(ex.status(), ExecutorStatus::Idle);

        ex.start(MotionPlan::default(), &current);
        let dems = ex.tick(&current);
        assert_eq!(ex.status(), ExecutorStatus::Complete);
        assert_relative_eq!(position(dems.elevator), Length::from_in(5.0).m());
    }
}
