//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.
//!
//! Telecommands are JSON objects of the form
//! `{"type": "<Variant>", "payload": <data>}`, where payload is omitted for
//! variants without data.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;
pub mod superstructure;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use drive::DriveCmd;
use superstructure::{GoalRequest, Preset};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by the driver
/// station or a script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Put the robot into safe mode, all outputs neutral.
    MakeSafe,

    /// Leave safe mode.
    MakeUnsafe,

    /// Move the superstructure to an arbitrary configuration.
    SuperstructureGoal(GoalRequest),

    /// Move the superstructure to one of the preset configurations.
    SuperstructurePreset(Preset),

    /// Command the drivetrain.
    Drive(DriveCmd),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC payload is invalid: {0}")]
    InvalidPayload(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        // Check the type before deserialising so a bad type is reported as such
        match val.get("type").and_then(|t| t.as_str()) {
            Some(t) if TC_TYPES.contains(&t) => (),
            Some(t) => {
                return Err(TcParseError::InvalidType(format!(
                    "{} is not a recognised TC type",
                    t
                )))
            }
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        }

        serde_json::from_value(val).map_err(TcParseError::InvalidPayload)
    }

    /// Serialise the TC into a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static TC_TYPES: [&str; 5] = [
    "MakeSafe",
    "MakeUnsafe",
    "SuperstructureGoal",
    "SuperstructurePreset",
    "Drive",
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::superstructure::HeldPiece;

    #[test]
    fn test_parse_tcs() {
        assert_eq!(Tc::from_json(r#"{"type": "MakeSafe"}"#).unwrap(), Tc::MakeSafe);

        let goal = Tc::from_json(
            r#"{
                "type": "SuperstructureGoal",
                "payload": {
                    "elevator_height_in": 25.0,
                    "elbow_angle_deg": 0.0,
                    "wrist_angle_deg": -10.0,
                    "held_piece": "Cargo"
                }
            }"#,
        )
        .unwrap();

        match goal {
            Tc::SuperstructureGoal(g) => {
                assert_eq!(g.elevator_height_in, 25.0);
                assert_eq!(g.wrist_angle_deg, -10.0);
                assert_eq!(g.held_piece, HeldPiece::Cargo);
            }
            t => panic!("Wrong TC parsed: {:?}", t),
        }
    }

    #[test]
    fn test_parse_drive_tcs() {
        let tc = Tc::from_json(
            r#"{"type": "Drive", "payload": {"type": "DriveDistance", "distance_m": -1.5, "max_speed_ms": 1.0}}"#,
        )
        .unwrap();
        assert_eq!(
            tc,
            Tc::Drive(drive::DriveCmd::DriveDistance {
                distance_m: -1.5,
                max_speed_ms: 1.0,
                timeout_s: None,
            })
        );

        let tc = Tc::from_json(
            r#"{"type": "Drive", "payload": {"type": "FollowPose", "x_m": 5.0, "y_m": 1.0, "heading_deg": 90.0, "law": "PurePursuit"}}"#,
        )
        .unwrap();
        assert_eq!(
            tc,
            Tc::Drive(drive::DriveCmd::FollowPose {
                x_m: 5.0,
                y_m: 1.0,
                heading_deg: 90.0,
                law: Some(drive::TrackingLawKind::PurePursuit),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Tc::from_json("{not json"),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "Heartbeat"}"#),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"payload": 1}"#),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "SuperstructurePreset", "payload": "Flying"}"#),
            Err(TcParseError::InvalidPayload(_))
        ));
    }
}
