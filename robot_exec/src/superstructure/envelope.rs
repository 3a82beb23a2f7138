//! # Safety envelope
//!
//! Checks a requested superstructure goal against the mechanism's limits and the obstacles in its
//! workspace, producing a goal which is safe to move to and the set of hazards found along the
//! way.
//!
//! The checker works on a side view of the mechanism with three landmarks:
//!
//! - the elevator carriage at `(0, h)`,
//! - the elbow pivot (wrist axis) at `carriage + L_elbow * (cos(elbow), sin(elbow))`,
//! - the intake tip at `elbow_pivot + L_wrist * (cos(wrist), sin(wrist))`.
//!
//! The checker never fails. Any problem it can correct is corrected and reported as a hazard, and
//! anything it can't solve falls back to the stowed angle of the offending joint.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::f64::consts::PI;

use super::{Params, SuperStructureState};
use crate::geom::Translation2;
use crate::units::{Angle, Length};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack used when comparing landmark positions, so that a point placed exactly on the floor by a
/// previous check is not moved again, and a vertical arm sits on the centreline.
const GEOMETRY_EPSILON_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The projected side view positions of the superstructure's landmarks.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Landmarks {
    pub carriage: Translation2,
    pub elbow_pivot: Translation2,
    pub intake_tip: Translation2,
}

/// The result of checking a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeReport {
    /// The corrected goal, safe to move to.
    pub safe_goal: SuperStructureState,

    /// All hazards found while checking.
    pub hazards: BTreeSet<Hazard>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Non-fatal conditions found while checking a goal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Hazard {
    /// A joint goal was outside of its limits and was clamped.
    LimitExceeded,

    /// The elbow pivot or intake tip would have hit the electronics box.
    FloorClearance,

    /// The elevator passes the crossbar, or stops inside it.
    CrossbarRisk,

    /// The elevator travel is large enough that the arm should be stowed.
    LongClimb,

    /// The arm must fold through the elevator from the front to the back.
    PassthroughForward,

    /// The arm must fold through the elevator from the back to the front.
    PassthroughReverse,

    /// Floor clearance couldn't be solved for, the stowed angle was used instead.
    UnsolvableGeometry,

    /// The goal asked for a different held piece than the current one.
    HeldPieceMismatch,
}

/// Which side of the elevator a landmark is on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Side {
    Front,
    Centre,
    Back,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Side {
    fn of(x: Length) -> Self {
        if x > Length::from_m(GEOMETRY_EPSILON_M) {
            Side::Front
        } else if x < Length::from_m(-GEOMETRY_EPSILON_M) {
            Side::Back
        } else {
            Side::Centre
        }
    }
}

impl Landmarks {
    /// Project the landmarks of the given state.
    pub fn project(state: &SuperStructureState, params: &Params) -> Self {
        let carriage = Translation2::new(Length::ZERO, state.elevator_height());
        let elbow_pivot =
            carriage + Translation2::from_polar(params.elbow_length(), state.elbow_angle());
        let intake_tip =
            elbow_pivot + Translation2::from_polar(params.wrist_length(), state.wrist_angle());

        Self {
            carriage,
            elbow_pivot,
            intake_tip,
        }
    }
}

impl EnvelopeReport {
    pub fn has(&self, hazard: Hazard) -> bool {
        self.hazards.contains(&hazard)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check a goal against the current state.
pub fn check(
    goal: &SuperStructureState,
    current: &SuperStructureState,
    params: &Params,
) -> EnvelopeReport {
    let mut hazards = BTreeSet::new();
    let mut goal = *goal;

    // ---- HELD PIECE ----

    // The superstructure can't pick up or drop a piece by itself
    if goal.held_piece != current.held_piece {
        warn!(
            "Goal held piece ({:?}) differs from current ({:?}), keeping current",
            goal.held_piece, current.held_piece
        );
        goal = goal.with_held_piece(current.held_piece);
        hazards.insert(Hazard::HeldPieceMismatch);
    }

    // ---- LIMITS ----

    let height = goal
        .elevator_height()
        .clamp(params.elevator_min(), params.elevator_max());
    if height != goal.elevator_height() {
        debug!(
            "Elevator goal {} outside limits, clamped to {}",
            goal.elevator_height(),
            height
        );
        goal = goal.with_elevator_height(height);
        hazards.insert(Hazard::LimitExceeded);
    }

    let elbow = goal
        .elbow_angle()
        .clamp(params.elbow_min(), params.elbow_max());
    if elbow != goal.elbow_angle() {
        debug!(
            "Elbow goal {} outside limits, clamped to {}",
            goal.elbow_angle(),
            elbow
        );
        goal = goal.with_elbow_angle(elbow);
        hazards.insert(Hazard::LimitExceeded);
    }

    let wrist = goal
        .wrist_angle()
        .clamp(params.wrist_min(), params.wrist_max());
    if wrist != goal.wrist_angle() {
        debug!(
            "Wrist goal {} outside limits, clamped to {}",
            goal.wrist_angle(),
            wrist
        );
        goal = goal.with_wrist_angle(wrist);
        hazards.insert(Hazard::LimitExceeded);
    }

    // ---- FLOOR CLEARANCE ----

    let floor = params.electronics_height();
    let stowed = params.stowed_arm();

    let mut goal_lm = Landmarks::project(&goal, params);

    if is_below(goal_lm.elbow_pivot.y, floor) {
        hazards.insert(Hazard::FloorClearance);

        let elbow = match solve_clearance(
            goal_lm.carriage.y,
            floor,
            params.elbow_length(),
            goal.elbow_angle(),
            (params.elbow_min(), params.elbow_max()),
        ) {
            Some(a) => a,
            None => {
                warn!("Cannot solve elbow floor clearance, using stowed elbow angle");
                hazards.insert(Hazard::UnsolvableGeometry);
                stowed.elbow.angle()
            }
        };

        goal = goal.with_elbow_angle(elbow);
        goal_lm = Landmarks::project(&goal, params);
    }

    if is_below(goal_lm.intake_tip.y, floor) {
        hazards.insert(Hazard::FloorClearance);

        let wrist = match solve_clearance(
            goal_lm.elbow_pivot.y,
            floor,
            params.wrist_length(),
            goal.wrist_angle(),
            (params.wrist_min(), params.wrist_max()),
        ) {
            Some(a) => a,
            None => {
                warn!("Cannot solve wrist floor clearance, using stowed wrist angle");
                hazards.insert(Hazard::UnsolvableGeometry);
                stowed.wrist.angle()
            }
        };

        goal = goal.with_wrist_angle(wrist);
        goal_lm = Landmarks::project(&goal, params);
    }

    // ---- CROSSBAR ----

    let bottom = params.crossbar_bottom();
    let top = bottom + params.crossbar_width();
    let g = goal.elevator_height();
    let s = current.elevator_height();

    if (g < bottom && s > bottom) || (g > bottom && s < bottom) || (g > bottom && g < top) {
        hazards.insert(Hazard::CrossbarRisk);
    }

    // ---- LONG CLIMB ----

    if (g - s).abs() >= params.long_climb_threshold() {
        hazards.insert(Hazard::LongClimb);
    }

    // ---- PASSTHROUGH ----

    let start_lm = Landmarks::project(current, params);

    match (
        Side::of(start_lm.elbow_pivot.x),
        Side::of(goal_lm.elbow_pivot.x),
    ) {
        (Side::Back, Side::Front) => {
            hazards.insert(Hazard::PassthroughReverse);
        }
        (Side::Front, Side::Back) => {
            hazards.insert(Hazard::PassthroughForward);
        }
        _ => (),
    }

    EnvelopeReport {
        safe_goal: goal,
        hazards,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn is_below(y: Length, floor: Length) -> bool {
    y < floor - Length::from_m(GEOMETRY_EPSILON_M)
}

/// Solve for the angle of a link of length `length` pivoting at height `pivot_y` such that its
/// end is at height `floor`.
///
/// The solution is kept on the same side (front or back) as `current`. Returns `None` if there is
/// no solution or the solution is outside of `limits`.
fn solve_clearance(
    pivot_y: Length,
    floor: Length,
    length: Length,
    current: Angle,
    limits: (Angle, Angle),
) -> Option<Angle> {
    let front = Angle::asin((floor - pivot_y) / length)?;

    let angle = if current.cos() < 0.0 {
        Angle::from_rad(PI) - front
    } else {
        front
    };

    if angle < limits.0 || angle > limits.1 {
        None
    } else {
        Some(angle)
    }
}
