//! # Superstructure motion planner
//!
//! Turns a goal configuration into a plan of joint motions which avoids the crossbar, the floor
//! and the elevator frame. Planning is a pure function of the goal, the current state and the
//! parameters.
//!
//! The plan is built in priority order:
//!
//! 1. Nothing to do if the goal matches the current state.
//! 2. The goal is passed through the safety envelope, which corrects it and reports hazards.
//! 3. A passthrough is done first, on its own, since no other joint can move freely until the arm
//!    has cleared the frame.
//! 4. A long climb stows the arm alongside the elevator move.
//! 5. Otherwise, if the crossbar is in the way, the arm is stowed before the elevator moves.
//! 6. The arm moves to its goal once the elevator is close to its goal height, while the elevator
//!    moves.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{
    envelope, ArmState, ElevatorDirection, Hazard, MotionKind, MotionPlan, Params,
    PassThroughDirection, PlanReport, StepOrdering, SuperStructureState,
};
use crate::units::{Angle, Length};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Plan the motion from `current` to `goal`.
pub fn plan(
    goal: &SuperStructureState,
    current: &SuperStructureState,
    params: &Params,
) -> PlanReport {
    let tolerances = params.tolerances();

    // Nothing to do
    if goal.approx_eq(current, &tolerances) {
        return PlanReport {
            plan: MotionPlan::default(),
            safe_goal: *goal,
            hazards: Default::default(),
        };
    }

    let env = envelope::check(goal, current, params);
    let safe_goal = env.safe_goal;

    let mut plan = MotionPlan::default();

    // The corrected goal may have collapsed onto the current state
    if safe_goal.approx_eq(current, &tolerances) {
        debug!("Corrected goal matches the current state, nothing to plan");
        return PlanReport {
            plan,
            safe_goal,
            hazards: env.hazards,
        };
    }

    // ---- PASSTHROUGH ----

    let passthrough = if env.has(Hazard::PassthroughForward) {
        Some(PassThroughDirection::Forward)
    } else if env.has(Hazard::PassthroughReverse) {
        Some(PassThroughDirection::Reverse)
    } else {
        None
    };

    if let Some(direction) = passthrough {
        plan.push(
            MotionKind::PassThrough {
                direction,
                waypoints: passthrough_waypoints(direction, current, params),
            },
            StepOrdering::Sequential,
        );
    }

    // ---- STOW ----

    if env.has(Hazard::LongClimb) {
        plan.push(MotionKind::StowArm, StepOrdering::ParallelWithNext);
    } else if env.has(Hazard::CrossbarRisk) {
        plan.push(MotionKind::StowArm, StepOrdering::Sequential);
    }

    // ---- ARM AND ELEVATOR ----

    let direction = if safe_goal.elevator_height() < current.elevator_height() {
        ElevatorDirection::Falling
    } else {
        ElevatorDirection::Rising
    };

    plan.push(
        MotionKind::ArmWaitForElevator {
            arm: safe_goal.arm,
            height: safe_goal.elevator_height(),
            tolerance: Length::from_in(params.arm_wait_tolerance_in),
            direction,
        },
        StepOrdering::ParallelWithNext,
    );
    plan.push(
        MotionKind::ElevatorMove {
            height: safe_goal.elevator_height(),
        },
        StepOrdering::Sequential,
    );

    debug!(
        "Planned {} steps from {} to {} (hazards: {:?})",
        plan.len(),
        current,
        safe_goal,
        env.hazards
    );

    PlanReport {
        plan,
        safe_goal,
        hazards: env.hazards,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Fold the wrist in place, then swing the elbow to the far side with the wrist folded.
fn passthrough_waypoints(
    direction: PassThroughDirection,
    current: &SuperStructureState,
    params: &Params,
) -> Vec<ArmState> {
    let fold = Angle::from_deg(params.passthrough_fold_wrist_deg);
    let far_elbow = match direction {
        PassThroughDirection::Forward => Angle::from_deg(params.passthrough_back_elbow_deg),
        PassThroughDirection::Reverse => Angle::from_deg(params.passthrough_front_elbow_deg),
    };

    vec![
        ArmState::new(current.elbow_angle(), fold),
        ArmState::new(far_elbow, fold),
    ]
}

#[cfg(test)]
mod test {
    use super::super::params::test_params::params;
    use super::*;
    use comms_if::eqpt::superstructure::HeldPiece;

    fn state(h_in: f64, elbow_deg: f64, wrist_deg: f64) -> SuperStructureState {
        SuperStructureState::new(
            Length::from_in(h_in),
            Angle::from_deg(elbow_deg),
            Angle::from_deg(wrist_deg),
            HeldPiece::None,
        )
    }

    #[test]
    fn test_same_state_gives_empty_plan() {
        let p = params();

        for s in [
            state(5.0, 0.0, 0.0),
            state(60.0, 170.0, 200.0),
            state(0.0, -30.0, -10.0),
        ]
        .iter()
        {
            let r = plan(s, s, &p);
            assert!(r.plan.is_empty());
            assert!(r.hazards.is_empty());
        }
    }

    #[test]
    fn test_crossbar_stows_before_elevator() {
        let p = params();
        let r = plan(&state(25.0, 0.0, 0.0), &state(5.0, 0.0, 0.0), &p);

        assert!(r.hazards.contains(&Hazard::CrossbarRisk));

        let stow = r.plan.position(MotionKind::is_stow).unwrap();
        let elevator = r.plan.position(MotionKind::is_elevator_move).unwrap();
        assert!(stow < elevator);
        assert_eq!(r.plan.steps[stow].ordering, StepOrdering::Sequential);

        // Stow, then the arm waits for the elevator alongside the elevator move
        assert_eq!(r.plan.len(), 3);
        match &r.plan.steps[1].kind {
            MotionKind::ArmWaitForElevator {
                arm,
                height,
                direction,
                ..
            } => {
                assert_eq!(*arm, state(25.0, 0.0, 0.0).arm);
                assert_eq!(*height, Length::from_in(25.0));
                assert_eq!(*direction, ElevatorDirection::Rising);
            }
            k => panic!("Expected an arm wait, got {:?}", k),
        }
        assert_eq!(r.plan.steps[1].ordering, StepOrdering::ParallelWithNext);
    }

    #[test]
    fn test_crossbar_crossing_from_below() {
        let p = params();

        // Every pair starting below the crossbar and ending above it
        for start in [0.0, 5.0, 10.0, 19.5].iter() {
            for end in [24.5, 30.0, 45.0, 70.0].iter() {
                let r = plan(&state(*end, 0.0, 0.0), &state(*start, 0.0, 0.0), &p);
                let stow = r.plan.position(MotionKind::is_stow).unwrap();
                let elevator = r.plan.position(MotionKind::is_elevator_move).unwrap();
                assert!(stow < elevator, "{} -> {}", start, end);
            }
        }
    }

    #[test]
    fn test_long_climb_stows_in_parallel() {
        let p = params();
        let r = plan(&state(50.0, 0.0, 0.0), &state(30.0 - 5.0, 0.0, 0.0), &p);
        assert!(!r.hazards.contains(&Hazard::LongClimb));

        let r = plan(&state(65.0, 0.0, 0.0), &state(30.0, 0.0, 0.0), &p);
        assert!(r.hazards.contains(&Hazard::LongClimb));
        assert_eq!(r.plan.steps[0].kind, MotionKind::StowArm);
        assert_eq!(r.plan.steps[0].ordering, StepOrdering::ParallelWithNext);
    }

    #[test]
    fn test_falling_arm_wait() {
        let p = params();
        let r = plan(&state(30.0, 10.0, 0.0), &state(40.0, 0.0, 0.0), &p);

        assert_eq!(r.plan.len(), 2);
        match r.plan.steps[0].kind {
            MotionKind::ArmWaitForElevator { direction, .. } => {
                assert_eq!(direction, ElevatorDirection::Falling)
            }
            ref k => panic!("Expected an arm wait, got {:?}", k),
        }
        assert!(r.plan.steps[1].kind.is_elevator_move());
    }

    #[test]
    fn test_passthrough_is_first() {
        let p = params();

        let r = plan(&state(40.0, 160.0, 180.0), &state(40.0, 20.0, 0.0), &p);
        match &r.plan.steps[0].kind {
            MotionKind::PassThrough {
                direction,
                waypoints,
            } => {
                assert_eq!(*direction, PassThroughDirection::Forward);
                assert_eq!(waypoints.len(), 2);
                assert_eq!(waypoints[0].elbow.angle(), Angle::from_deg(20.0));
                assert_eq!(waypoints[1].elbow.angle(), Angle::from_deg(150.0));
            }
            k => panic!("Expected a passthrough, got {:?}", k),
        }
        assert_eq!(r.plan.steps[0].ordering, StepOrdering::Sequential);

        let r = plan(&state(40.0, 20.0, 0.0), &state(40.0, 160.0, 180.0), &p);
        match &r.plan.steps[0].kind {
            MotionKind::PassThrough { direction, .. } => {
                assert_eq!(*direction, PassThroughDirection::Reverse)
            }
            k => panic!("Expected a passthrough, got {:?}", k),
        }
    }

    #[test]
    fn test_stowing_from_the_back_has_no_passthrough() {
        let p = params();
        let stowed = state(40.0, 90.0, 90.0);
        let back = state(40.0, 160.0, 180.0);

        for (goal, current) in [(&stowed, &back), (&back, &stowed)].iter() {
            let r = plan(goal, current, &p);
            assert!(r.plan.position(MotionKind::is_passthrough).is_none());
            assert!(!r.hazards.contains(&Hazard::PassthroughForward));
            assert!(!r.hazards.contains(&Hazard::PassthroughReverse));

            // The elbow never swings past the front of the robot
            for step in r.plan.steps.iter() {
                if let MotionKind::ArmWaitForElevator { arm, .. } = step.kind {
                    assert!(arm.elbow.angle().deg() >= 90.0 - 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_held_piece_only_change_is_empty() {
        let p = params();
        let current = state(10.0, 0.0, 0.0);
        let r = plan(&current.with_held_piece(HeldPiece::Hatch), &current, &p);

        assert!(r.plan.is_empty());
        assert!(r.hazards.contains(&Hazard::HeldPieceMismatch));
        assert_eq!(r.safe_goal.held_piece, HeldPiece::None);
    }

    #[test]
    fn test_limit_clamped_goal() {
        let p = params();
        let r = plan(&state(90.0, 0.0, 0.0), &state(60.0, 0.0, 0.0), &p);

        assert!(r.hazards.contains(&Hazard::LimitExceeded));
        assert_eq!(r.safe_goal.elevator_height(), p.elevator_max());
        assert_eq!(
            r.plan.steps.last().map(|s| s.kind.clone()),
            Some(MotionKind::ElevatorMove {
                height: p.elevator_max()
            })
        );
    }
}
