//! Parameters structure for the superstructure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{ArmState, SuperStructureState};
use crate::units::{Angle, Length};
use comms_if::{eqpt::superstructure::HeldPiece, tc::superstructure::Preset};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the superstructure.
///
/// All positions are given in the side view frame: x forward from the elevator centreline, y up
/// from the lowest position of the elevator carriage. Elbow and wrist angles are measured from
/// the x axis, positive upwards, and the wrist angle is absolute (not relative to the elbow).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    // ---- LIMITS ----
    /// Units: inches
    pub elevator_min_height_in: f64,

    /// Units: inches
    pub elevator_max_height_in: f64,

    /// Units: degrees
    pub elbow_min_deg: f64,

    /// Units: degrees
    pub elbow_max_deg: f64,

    /// Units: degrees
    pub wrist_min_deg: f64,

    /// Units: degrees
    pub wrist_max_deg: f64,

    // ---- GEOMETRY ----
    /// Distance from the elbow axis on the carriage to the wrist axis.
    ///
    /// Units: inches
    pub elbow_length_in: f64,

    /// Distance from the wrist axis to the tip of the intake.
    ///
    /// Units: inches
    pub wrist_length_in: f64,

    /// Height of the top of the electronics box, below which neither the wrist axis nor the
    /// intake tip may go.
    ///
    /// Units: inches
    pub electronics_height_in: f64,

    /// Height of the bottom of the crossbar, measured as a carriage height.
    ///
    /// Units: inches
    pub crossbar_bottom_in: f64,

    /// Vertical extent of the crossbar.
    ///
    /// Units: inches
    pub crossbar_width_in: f64,

    /// Elevator travel at or above which the arm is stowed during the move.
    ///
    /// Units: inches
    pub long_climb_threshold_in: f64,

    // ---- STOWED AND PASSTHROUGH POSITIONS ----
    /// Units: degrees
    pub stowed_elbow_deg: f64,

    /// Units: degrees
    pub stowed_wrist_deg: f64,

    /// Wrist angle the intake is folded to before swinging through the elevator.
    ///
    /// Units: degrees
    pub passthrough_fold_wrist_deg: f64,

    /// Elbow angle at which a passthrough to the front of the robot ends.
    ///
    /// Units: degrees
    pub passthrough_front_elbow_deg: f64,

    /// Elbow angle at which a passthrough to the back of the robot ends.
    ///
    /// Units: degrees
    pub passthrough_back_elbow_deg: f64,

    // ---- TOLERANCES ----
    /// Two states are considered equal if their heights are within this tolerance.
    ///
    /// Units: inches
    pub state_height_tolerance_in: f64,

    /// Two states are considered equal if their angles are within this tolerance.
    ///
    /// Units: degrees
    pub state_angle_tolerance_deg: f64,

    /// How close the elevator must be to its goal before a waiting arm move may start.
    ///
    /// Units: inches
    pub arm_wait_tolerance_in: f64,

    /// Units: inches
    pub elevator_done_tolerance_in: f64,

    /// Units: degrees
    pub arm_done_tolerance_deg: f64,

    // ---- PRESETS ----
    pub presets: Presets,
}

/// Preset configurations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Presets {
    pub stowed: PresetParams,
    pub cargo_grab: PresetParams,
    pub cargo_down: PresetParams,
    pub hatch: PresetParams,
}

/// A single preset.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PresetParams {
    /// Units: inches
    pub elevator_height_in: f64,

    /// Units: degrees
    pub elbow_deg: f64,

    /// Units: degrees
    pub wrist_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn elevator_min(&self) -> Length {
        Length::from_in(self.elevator_min_height_in)
    }

    pub fn elevator_max(&self) -> Length {
        Length::from_in(self.elevator_max_height_in)
    }

    pub fn elbow_min(&self) -> Angle {
        Angle::from_deg(self.elbow_min_deg)
    }

    pub fn elbow_max(&self) -> Angle {
        Angle::from_deg(self.elbow_max_deg)
    }

    pub fn wrist_min(&self) -> Angle {
        Angle::from_deg(self.wrist_min_deg)
    }

    pub fn wrist_max(&self) -> Angle {
        Angle::from_deg(self.wrist_max_deg)
    }

    pub fn elbow_length(&self) -> Length {
        Length::from_in(self.elbow_length_in)
    }

    pub fn wrist_length(&self) -> Length {
        Length::from_in(self.wrist_length_in)
    }

    pub fn electronics_height(&self) -> Length {
        Length::from_in(self.electronics_height_in)
    }

    pub fn crossbar_bottom(&self) -> Length {
        Length::from_in(self.crossbar_bottom_in)
    }

    pub fn crossbar_width(&self) -> Length {
        Length::from_in(self.crossbar_width_in)
    }

    pub fn long_climb_threshold(&self) -> Length {
        Length::from_in(self.long_climb_threshold_in)
    }

    /// The stowed arm configuration.
    pub fn stowed_arm(&self) -> ArmState {
        ArmState::new(
            Angle::from_deg(self.stowed_elbow_deg),
            Angle::from_deg(self.stowed_wrist_deg),
        )
    }

    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            height: Length::from_in(self.state_height_tolerance_in),
            angle: Angle::from_deg(self.state_angle_tolerance_deg),
        }
    }

    /// Build the goal state for a preset, holding the given piece.
    pub fn preset_state(&self, preset: Preset, held_piece: HeldPiece) -> SuperStructureState {
        let p = match preset {
            Preset::Stowed => &self.presets.stowed,
            Preset::CargoGrab => &self.presets.cargo_grab,
            Preset::CargoDown => &self.presets.cargo_down,
            Preset::Hatch => &self.presets.hatch,
        };

        SuperStructureState::new(
            Length::from_in(p.elevator_height_in),
            Angle::from_deg(p.elbow_deg),
            Angle::from_deg(p.wrist_deg),
            held_piece,
        )
    }
}

/// Tolerances used when comparing two states.
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    pub height: Length,
    pub angle: Angle,
}

#[cfg(test)]
pub(crate) mod test_params {
    use super::*;

    /// Parameters for a typical mechanism, used in the module's tests.
    pub fn params() -> Params {
        Params {
            elevator_min_height_in: 0.0,
            elevator_max_height_in: 70.0,
            elbow_min_deg: -60.0,
            elbow_max_deg: 240.0,
            wrist_min_deg: -100.0,
            wrist_max_deg: 280.0,
            elbow_length_in: 20.0,
            wrist_length_in: 12.0,
            electronics_height_in: 0.0,
            crossbar_bottom_in: 20.0,
            crossbar_width_in: 4.0,
            long_climb_threshold_in: 30.0,
            stowed_elbow_deg: 90.0,
            stowed_wrist_deg: 90.0,
            passthrough_fold_wrist_deg: 90.0,
            passthrough_front_elbow_deg: 30.0,
            passthrough_back_elbow_deg: 150.0,
            state_height_tolerance_in: 1.0,
            state_angle_tolerance_deg: 2.0,
            arm_wait_tolerance_in: 3.0,
            elevator_done_tolerance_in: 3.0,
            arm_done_tolerance_deg: 5.0,
            presets: Presets {
                stowed: PresetParams {
                    elevator_height_in: 0.0,
                    elbow_deg: 90.0,
                    wrist_deg: 90.0,
                },
                cargo_grab: PresetParams {
                    elevator_height_in: 10.0,
                    elbow_deg: -30.0,
                    wrist_deg: -10.0,
                },
                cargo_down: PresetParams {
                    elevator_height_in: 10.0,
                    elbow_deg: 0.0,
                    wrist_deg: -45.0,
                },
                hatch: PresetParams {
                    elevator_height_in: 19.0,
                    elbow_deg: 0.0,
                    wrist_deg: 0.0,
                },
            },
        }
    }
}
