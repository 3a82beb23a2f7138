//! Joint and superstructure state snapshots
//!
//! All states are immutable values, "modifying" one produces a new state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

use super::params::Tolerances;
use crate::units::{Angle, Length};
use comms_if::{
    eqpt::superstructure::{HeldPiece, JointSens},
    tc::superstructure::GoalRequest,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Elevator carriage height.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevatorState {
    height: Length,
}

/// Elbow angle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElbowState {
    angle: Angle,
}

/// Wrist angle, absolute in the side view frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WristState {
    angle: Angle,
}

/// The two arm joints together.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmState {
    pub elbow: ElbowState,
    pub wrist: WristState,
}

/// A full superstructure configuration.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperStructureState {
    pub elevator: ElevatorState,
    pub arm: ArmState,
    pub held_piece: HeldPiece,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ElevatorState {
    pub fn new(height: Length) -> Self {
        Self { height }
    }

    pub fn height(&self) -> Length {
        self.height
    }

    pub fn with_height(&self, height: Length) -> Self {
        Self { height }
    }
}

impl ElbowState {
    pub fn new(angle: Angle) -> Self {
        Self { angle }
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn with_angle(&self, angle: Angle) -> Self {
        Self { angle }
    }
}

impl WristState {
    pub fn new(angle: Angle) -> Self {
        Self { angle }
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn with_angle(&self, angle: Angle) -> Self {
        Self { angle }
    }
}

impl ArmState {
    pub fn new(elbow: Angle, wrist: Angle) -> Self {
        Self {
            elbow: ElbowState::new(elbow),
            wrist: WristState::new(wrist),
        }
    }

    pub fn with_elbow(&self, elbow: Angle) -> Self {
        Self {
            elbow: self.elbow.with_angle(elbow),
            ..*self
        }
    }

    pub fn with_wrist(&self, wrist: Angle) -> Self {
        Self {
            wrist: self.wrist.with_angle(wrist),
            ..*self
        }
    }

    /// True if both joints are within `tolerance` of `other`.
    pub fn within(&self, other: &ArmState, tolerance: Angle) -> bool {
        (self.elbow.angle - other.elbow.angle).abs() <= tolerance
            && (self.wrist.angle - other.wrist.angle).abs() <= tolerance
    }
}

impl SuperStructureState {
    pub fn new(elevator: Length, elbow: Angle, wrist: Angle, held_piece: HeldPiece) -> Self {
        Self {
            elevator: ElevatorState::new(elevator),
            arm: ArmState::new(elbow, wrist),
            held_piece,
        }
    }

    pub fn elevator_height(&self) -> Length {
        self.elevator.height
    }

    pub fn elbow_angle(&self) -> Angle {
        self.arm.elbow.angle
    }

    pub fn wrist_angle(&self) -> Angle {
        self.arm.wrist.angle
    }

    pub fn with_elevator_height(&self, height: Length) -> Self {
        Self {
            elevator: self.elevator.with_height(height),
            ..*self
        }
    }

    pub fn with_elbow_angle(&self, angle: Angle) -> Self {
        Self {
            arm: self.arm.with_elbow(angle),
            ..*self
        }
    }

    pub fn with_wrist_angle(&self, angle: Angle) -> Self {
        Self {
            arm: self.arm.with_wrist(angle),
            ..*self
        }
    }

    pub fn with_held_piece(&self, held_piece: HeldPiece) -> Self {
        Self {
            held_piece,
            ..*self
        }
    }

    /// Component-wise equality within the given tolerances.
    ///
    /// The held piece must match exactly.
    pub fn approx_eq(&self, other: &SuperStructureState, tolerances: &Tolerances) -> bool {
        (self.elevator_height() - other.elevator_height()).abs() <= tolerances.height
            && self.arm.within(&other.arm, tolerances.angle)
            && self.held_piece == other.held_piece
    }
}

impl From<&JointSens> for SuperStructureState {
    fn from(sens: &JointSens) -> Self {
        Self::new(
            Length::from_m(sens.elevator_height_m),
            Angle::from_rad(sens.elbow_angle_rad),
            Angle::from_rad(sens.wrist_angle_rad),
            sens.held_piece,
        )
    }
}

impl From<&GoalRequest> for SuperStructureState {
    fn from(goal: &GoalRequest) -> Self {
        Self::new(
            Length::from_in(goal.elevator_height_in),
            Angle::from_deg(goal.elbow_angle_deg),
            Angle::from_deg(goal.wrist_angle_deg),
            goal.held_piece,
        )
    }
}

impl fmt::Display for SuperStructureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{elevator: {}, elbow: {}, wrist: {}, piece: {:?}}}",
            self.elevator_height(),
            self.elbow_angle(),
            self.wrist_angle(),
            self.held_piece
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances {
            height: Length::from_in(1.0),
            angle: Angle::from_deg(2.0),
        }
    }

    #[test]
    fn test_with_produces_new_state() {
        let a = SuperStructureState::new(
            Length::from_in(5.0),
            Angle::from_deg(10.0),
            Angle::from_deg(-10.0),
            HeldPiece::Hatch,
        );
        let b = a.with_elevator_height(Length::from_in(6.0));

        assert_eq!(a.elevator_height(), Length::from_in(5.0));
        assert_eq!(b.elevator_height(), Length::from_in(6.0));
        assert_eq!(b.arm, a.arm);
        assert_eq!(b.held_piece, HeldPiece::Hatch);
    }

    #[test]
    fn test_approx_eq() {
        let a = SuperStructureState::new(
            Length::from_in(5.0),
            Angle::from_deg(10.0),
            Angle::from_deg(-10.0),
            HeldPiece::None,
        );

        assert!(a.approx_eq(&a.with_elevator_height(Length::from_in(5.9)), &tol()));
        assert!(a.approx_eq(&a.with_wrist_angle(Angle::from_deg(-8.5)), &tol()));
        assert!(!a.approx_eq(&a.with_elevator_height(Length::from_in(6.5)), &tol()));
        assert!(!a.approx_eq(&a.with_elbow_angle(Angle::from_deg(13.0)), &tol()));
        assert!(!a.approx_eq(&a.with_held_piece(HeldPiece::Cargo), &tol()));
    }
}
