//! # Superstructure module
//!
//! The superstructure is the elevator, elbow and wrist which position the intake. This module
//! checks requested goals against the mechanism's safety envelope, plans a sequence of joint
//! motions to reach them, and executes that plan one cycle at a time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ctrl;
pub mod envelope;
mod executor;
pub mod params;
mod plan;
pub mod planner;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use ctrl::*;
pub use envelope::{EnvelopeReport, Hazard, Landmarks};
pub use executor::*;
pub use params::{Params, Tolerances};
pub use plan::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during superstructure control.
#[derive(Debug, thiserror::Error)]
pub enum SuperstructureError {
    #[error("Superstructure control has not been initialised")]
    NotInitialised,
}
