//! # Drive control module
//!
//! Drive control turns driver commands (arcade or curvature drive) and trajectory wheel demands
//! into demands for the left and right sides of the drivetrain. Changes in demand are
//! acceleration limited per side, with a limit that depends on the current gear.
//!
//! A set distance can also be driven in a straight line, closing the loop on the wheel
//! odometry with a proportional speed demand.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mixing;
mod params;
mod slew;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use mixing::*;
pub use params::*;
pub use slew::SlewLimiter;
pub use state::*;

use comms_if::tc::drive::DriveCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Drive control has not been initialised")]
    NotInitialised,

    #[error("Drive control cannot execute the command {0:?}")]
    InvalidCmd(DriveCmd),

    #[error("No wheel odometry available to drive a set distance")]
    NoOdometry,
}
