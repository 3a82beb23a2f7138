//! # Data Store

use comms_if::eqpt::{
    drive::{DriveDems, DriveSens},
    superstructure::{JointDems, JointSens},
};
use log::{info, warn};

use crate::{
    drive_ctrl,
    geom::Pose2,
    loc::LocHandle,
    superstructure,
    traj_ctrl::{self, WheelDems},
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    LocUnavailable,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub time_s: f64,

    /// Time since the start of the previous cycle
    pub dt_s: f64,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Sensing
    pub joint_sens: JointSens,
    pub drive_sens: Option<DriveSens>,

    // Localisation
    pub loc: Option<LocHandle>,
    pub pose: Option<Pose2>,

    // Superstructure
    pub superstructure: superstructure::SuperstructureCtrl,
    pub superstructure_input: superstructure::InputData,
    pub superstructure_output: JointDems,
    pub superstructure_status_rpt: superstructure::StatusReport,

    // TrajCtrl
    pub traj_tracker: traj_ctrl::TrajTracker,
    pub traj_tracker_output: Option<WheelDems>,
    pub traj_tracker_status_rpt: traj_ctrl::StatusReport,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: DriveDems,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.superstructure.make_safe();
            self.traj_tracker.stop();
            self.drive_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if root_cause != cause => Err(()),
            _ => {
                self.safe = false;
                self.safe_cause = None;

                self.superstructure.make_unsafe();
                self.drive_ctrl.make_unsafe();

                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, updates the cycle time and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128).max(1) == 0;

        self.superstructure_input = superstructure::InputData::default();
        self.superstructure_output = JointDems::neutral();
        self.superstructure_status_rpt = superstructure::StatusReport::default();

        self.traj_tracker_output = None;
        self.traj_tracker_status_rpt = traj_ctrl::StatusReport::default();

        self.drive_ctrl_input = drive_ctrl::InputData::default();
        self.drive_ctrl_output = DriveDems::neutral(self.drive_ctrl.gear());
        self.drive_ctrl_status_rpt = drive_ctrl::StatusReport::default();

        let now_s = util::session::get_elapsed_seconds();
        self.dt_s = (now_s - self.time_s).max(0.0);
        self.time_s = now_s;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{drive_ctrl, superstructure};
    use util::module::State;

    fn data_store() -> DataStore {
        DataStore {
            superstructure: superstructure::SuperstructureCtrl::from_params(
                superstructure::params::test_params::params(),
            ),
            drive_ctrl: drive_ctrl::DriveCtrl::from_params(drive_ctrl::Params::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_safe_mode_root_cause() {
        let mut ds = data_store();

        ds.make_safe(SafeModeCause::LocUnavailable);
        assert!(ds.safe);

        // A different cause cannot clear safe mode
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err());
        assert!(ds.safe);

        assert!(ds.make_unsafe(SafeModeCause::LocUnavailable).is_ok());
        assert!(!ds.safe);
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }

    #[test]
    fn test_cycle_start_clears_inputs() {
        let mut ds = data_store();
        ds.superstructure_input.goal = Some(superstructure::Goal::Preset(
            comms_if::tc::superstructure::Preset::Stowed,
        ));
        ds.traj_tracker_output = Some(WheelDems::default());

        ds.cycle_start(50.0);

        assert!(ds.superstructure_input.goal.is_none());
        assert!(ds.traj_tracker_output.is_none());
        assert!(ds.is_1_hz_cycle);
    }
}
