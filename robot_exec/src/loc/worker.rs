//! Localisation worker thread

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Receiver,
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use super::{channel, LocError, LocHandle, LocWriter, Odometer, OdometrySource, Params, PoseEstimate};
use crate::geom::Pose2;
use util::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle to the running localisation worker.
pub struct LocWorker {
    handle: LocHandle,
    stop: Arc<AtomicBool>,
    jh: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocWorker {
    /// Start the localisation worker, reading odometry from `source`.
    pub fn spawn<S: OdometrySource>(params: &Params, source: S) -> Result<Self, LocError> {
        let initial = PoseEstimate {
            pose: params.initial_pose(),
            timestamp_s: get_elapsed_seconds(),
            num_updates: 0,
        };

        let (handle, writer, resets) = channel(initial);

        let stop = Arc::new(AtomicBool::new(false));
        let stop_worker = stop.clone();
        let period = Duration::from_millis(params.worker_period_ms);
        let odometer = Odometer::new(initial.pose);

        let jh = thread::Builder::new()
            .name("loc::worker".into())
            .spawn(move || worker_thread(odometer, source, writer, resets, stop_worker, period))
            .map_err(LocError::SpawnError)?;

        info!("Localisation worker started with period {:?}", period);

        Ok(Self {
            handle,
            stop,
            jh: Some(jh),
        })
    }

    /// Get a new handle to the pose estimate.
    pub fn handle(&self) -> LocHandle {
        self.handle.clone()
    }

    /// Stop the worker and wait for it to exit.
    pub fn stop(mut self) -> Result<(), LocError> {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(jh) = self.jh.take() {
            jh.join().map_err(|_| LocError::WorkerPanicked)?;
        }

        info!("Localisation worker stopped");

        Ok(())
    }
}

impl Drop for LocWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn worker_thread<S: OdometrySource>(
    mut odometer: Odometer,
    mut source: S,
    writer: LocWriter,
    resets: Receiver<Pose2>,
    stop: Arc<AtomicBool>,
    period: Duration,
) {
    let mut num_updates = 0u64;

    while !stop.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        // Only the latest reset matters
        if let Some(pose) = resets.try_iter().last() {
            debug!("Resetting pose estimate to {:?}", pose);
            odometer.reset(pose);
            num_updates = 0;
        }

        match source.read_odometry() {
            Some(sens) => {
                odometer.update(&sens);
                num_updates += 1;
            }
            None => trace!("No odometry available"),
        }

        let estimate = PoseEstimate {
            pose: odometer.pose(),
            timestamp_s: get_elapsed_seconds(),
            num_updates,
        };

        if let Err(e) = writer.set(estimate) {
            warn!("Localisation worker stopping: {}", e);
            break;
        }

        if let Some(sleep) = period.checked_sub(cycle_start.elapsed()) {
            thread::sleep(sleep);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::drive::DriveSens;
    use std::sync::Mutex;

    /// Drives straight forward 1 cm every read.
    struct Straight(Arc<Mutex<f64>>);

    impl OdometrySource for Straight {
        fn read_odometry(&mut self) -> Option<DriveSens> {
            let mut d = self.0.lock().ok()?;
            *d += 0.01;
            Some(DriveSens {
                left_dist_m: *d,
                right_dist_m: *d,
                ..Default::default()
            })
        }
    }

    fn params() -> Params {
        Params {
            worker_period_ms: 1,
            initial_x_m: 0.0,
            initial_y_m: 0.0,
            initial_heading_deg: 0.0,
        }
    }

    #[test]
    fn test_worker_integrates_and_resets() {
        let worker = LocWorker::spawn(&params(), Straight(Arc::new(Mutex::new(0.0)))).unwrap();
        let handle = worker.handle();

        thread::sleep(Duration::from_millis(50));
        let est = handle.get().unwrap();
        assert!(est.num_updates > 1);
        assert!(est.pose.translation.x.m() > 0.0);
        assert_eq!(est.pose.translation.y.m(), 0.0);

        handle.request_reset(Pose2::from_m_rad(-100.0, 0.0, 0.0)).unwrap();
        thread::sleep(Duration::from_millis(50));
        let est = handle.get().unwrap();
        assert!(est.pose.translation.x.m() < -99.0);

        worker.stop().unwrap();

        // Resets can't be delivered once the worker has gone
        assert!(handle.request_reset(Pose2::default()).is_err());
    }
}
