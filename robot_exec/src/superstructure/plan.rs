//! Motion plan data model
//!
//! A plan is an ordered list of steps. Each step is plain data describing a joint motion, which
//! is interpreted by the `PlanExecutor`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::BTreeSet;

use super::{ArmState, Hazard, SuperStructureState};
use crate::units::Length;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered list of motion steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotionPlan {
    pub steps: Vec<MotionStep>,
}

/// A single step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionStep {
    pub kind: MotionKind,
    pub ordering: StepOrdering,
}

/// The output of the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub plan: MotionPlan,

    /// The goal after the safety envelope corrections.
    pub safe_goal: SuperStructureState,

    pub hazards: BTreeSet<Hazard>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a step is ordered relative to the one after it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum StepOrdering {
    /// Must complete before the next step starts.
    Sequential,

    /// Starts at the same time as the next step.
    ParallelWithNext,
}

/// The motion a step performs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MotionKind {
    /// Fold the intake and swing the arm through the elevator, visiting each waypoint in turn.
    PassThrough {
        direction: PassThroughDirection,
        waypoints: Vec<ArmState>,
    },

    /// Move the arm to its stowed position.
    StowArm,

    /// Wait for the elevator to come within `tolerance` of `height`, then move the arm.
    ArmWaitForElevator {
        arm: ArmState,
        height: Length,
        tolerance: Length,
        direction: ElevatorDirection,
    },

    /// Move the elevator.
    ElevatorMove { height: Length },
}

/// Direction of a passthrough.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PassThroughDirection {
    /// Front of the robot to the back.
    Forward,

    /// Back of the robot to the front.
    Reverse,
}

/// Direction the elevator moves in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ElevatorDirection {
    Rising,
    Falling,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn push(&mut self, kind: MotionKind, ordering: StepOrdering) {
        self.steps.push(MotionStep { kind, ordering })
    }

    /// Index of the first step matching the predicate.
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&MotionKind) -> bool,
    {
        self.steps.iter().position(|s| pred(&s.kind))
    }
}

impl MotionKind {
    pub fn is_stow(&self) -> bool {
        matches!(self, MotionKind::StowArm)
    }

    pub fn is_elevator_move(&self) -> bool {
        matches!(self, MotionKind::ElevatorMove { .. })
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, MotionKind::PassThrough { .. })
    }
}

impl ElevatorDirection {
    /// Has the elevator reached the point at which a waiting arm move may start?
    pub fn threshold_met(&self, measured: Length, goal: Length, tolerance: Length) -> bool {
        match self {
            ElevatorDirection::Rising => measured >= goal - tolerance,
            ElevatorDirection::Falling => measured <= goal + tolerance,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_threshold() {
        let goal = Length::from_in(30.0);
        let tol = Length::from_in(3.0);

        assert!(!ElevatorDirection::Rising.threshold_met(Length::from_in(20.0), goal, tol));
        assert!(ElevatorDirection::Rising.threshold_met(Length::from_in(28.0), goal, tol));
        assert!(ElevatorDirection::Falling.threshold_met(Length::from_in(32.0), goal, tol));
        assert!(!ElevatorDirection::Falling.threshold_met(Length::from_in(40.0), goal, tol));
    }
}
