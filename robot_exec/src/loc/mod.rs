//! # Localisation module
//!
//! This module provides localisation for the robot in the form of wheel odometry fused with the
//! gyro heading. Odometry is integrated by a background worker thread at a faster rate than the
//! main control cycle.
//!
//! The worker is the only writer of the pose estimate, via its `LocWriter`. Everything else holds
//! a `LocHandle`, which can read snapshots of the estimate and ask the worker to reset it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod odometer;
pub mod params;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::sync::{
    mpsc::{SendError, Sender},
    Arc, PoisonError, RwLock,
};

use crate::geom::Pose2;
use comms_if::eqpt::drive::DriveSens;

pub use odometer::Odometer;
pub use params::Params;
pub use worker::LocWorker;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose estimate of the robot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct PoseEstimate {
    /// The pose of the robot in the field frame
    pub pose: Pose2,

    /// Session time at which the estimate was made.
    ///
    /// Units: seconds
    pub timestamp_s: f64,

    /// Number of odometry updates since the last reset
    pub num_updates: u64,
}

/// Read access to the pose estimate.
#[derive(Debug, Clone)]
pub struct LocHandle {
    estimate: Arc<RwLock<PoseEstimate>>,
    reset_sender: Sender<Pose2>,
}

/// Write access to the pose estimate, owned by the localisation worker.
#[derive(Debug)]
pub(crate) struct LocWriter {
    estimate: Arc<RwLock<PoseEstimate>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LocError {
    #[error("The pose estimate lock was poisoned")]
    PoisonError,

    #[error("Could not send a reset request, the localisation worker has stopped")]
    WorkerStopped,

    #[error("Could not spawn the localisation worker: {0}")]
    SpawnError(std::io::Error),

    #[error("The localisation worker panicked")]
    WorkerPanicked,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of drivetrain odometry for the localisation worker.
pub trait OdometrySource: Send + 'static {
    /// Read the latest drive sensor data, or `None` if no data is available.
    fn read_odometry(&mut self) -> Option<DriveSens>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocHandle {
    /// Get a snapshot of the current pose estimate.
    pub fn get(&self) -> Result<PoseEstimate, LocError> {
        Ok(*self.estimate.read()?)
    }

    /// Get only the pose from the current estimate.
    pub fn pose(&self) -> Result<Pose2, LocError> {
        Ok(self.get()?.pose)
    }

    /// Ask the localisation worker to reset the estimate to the given pose.
    ///
    /// The reset is applied by the worker on its next cycle.
    pub fn request_reset(&self, pose: Pose2) -> Result<(), LocError> {
        self.reset_sender.send(pose)?;
        Ok(())
    }
}

impl LocWriter {
    pub fn set(&self, estimate: PoseEstimate) -> Result<(), LocError> {
        *self.estimate.write()? = estimate;
        Ok(())
    }
}

impl<G> From<PoisonError<G>> for LocError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

impl From<SendError<Pose2>> for LocError {
    fn from(_: SendError<Pose2>) -> Self {
        Self::WorkerStopped
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Create a connected handle and writer around a new estimate.
///
/// The returned receiver gets every reset request sent by the handle (or its clones).
pub(crate) fn channel(
    initial: PoseEstimate,
) -> (LocHandle, LocWriter, std::sync::mpsc::Receiver<Pose2>) {
    let estimate = Arc::new(RwLock::new(initial));
    let (reset_sender, reset_receiver) = std::sync::mpsc::channel();

    (
        LocHandle {
            estimate: estimate.clone(),
            reset_sender,
        },
        LocWriter { estimate },
        reset_receiver,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handle_reads_writer() {
        let (handle, writer, resets) = channel(PoseEstimate::default());

        let est = PoseEstimate {
            pose: Pose2::from_m_rad(1.0, 2.0, 0.5),
            timestamp_s: 3.0,
            num_updates: 4,
        };
        writer.set(est).unwrap();

        assert_eq!(handle.clone().get().unwrap(), est);

        handle.request_reset(Pose2::default()).unwrap();
        assert_eq!(resets.try_recv().unwrap(), Pose2::default());

        // Nobody left to apply resets
        drop(resets);
        assert!(matches!(
            handle.request_reset(Pose2::default()),
            Err(LocError::WorkerStopped)
        ));
    }
}
