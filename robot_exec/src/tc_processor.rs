//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

// Internal
use crate::{
    data_store::{DataStore, SafeModeCause},
    geom::Pose2,
    superstructure::{Goal, SuperStructureState},
    traj_ctrl::{TimedTrajectory, TrajCtrlError},
    units::Angle,
};
use comms_if::tc::{
    drive::{DriveCmd, TrackingLawKind},
    Tc,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. While in safe mode only
/// `MakeSafe` and `MakeUnsafe` are executed.
pub fn exec(ds: &mut DataStore, tc: &Tc) {
    if ds.safe && !matches!(tc, Tc::MakeSafe | Tc::MakeUnsafe) {
        warn!("In safe mode, rejecting {:?}", tc);
        return;
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::SuperstructureGoal(g) => {
            ds.superstructure_input.goal = Some(Goal::State(SuperStructureState::from(g)));
        }
        Tc::SuperstructurePreset(p) => {
            ds.superstructure_input.goal = Some(Goal::Preset(*p));
        }
        Tc::Drive(DriveCmd::FollowTrajectory {
            path,
            reset_pose,
            law,
        }) => {
            if let Err(e) = follow_trajectory(ds, path, *reset_pose, *law) {
                warn!("Cannot follow trajectory {:?}: {}", path, e);
            }
        }
        Tc::Drive(DriveCmd::FollowPose {
            x_m,
            y_m,
            heading_deg,
            law,
        }) => {
            let target = Pose2::from_m_rad(*x_m, *y_m, Angle::from_deg(*heading_deg).rad());

            match ds.pose {
                Some(pose) => {
                    if let Err(e) = ds.traj_tracker.follow_pose(&pose, &target, *law, ds.time_s) {
                        warn!("Cannot drive to {:?}: {}", target, e);
                    }
                }
                None => warn!("No pose estimate, cannot drive to {:?}", target),
            }
        }
        Tc::Drive(cmd) => {
            // Any driver command except a gear change takes over from the tracker
            if !matches!(cmd, DriveCmd::SetGear { .. }) {
                ds.traj_tracker.stop();
            }
            ds.drive_ctrl_input.cmd = Some(cmd.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn follow_trajectory(
    ds: &mut DataStore,
    path: &Path,
    reset_pose: bool,
    law: Option<TrackingLawKind>,
) -> Result<(), TrajCtrlError> {
    let path = resolve_path(path);
    let trajectory =
        TimedTrajectory::from_json_file(&path).map_err(TrajCtrlError::TrajectoryError)?;

    info!("Loaded trajectory from {:?}", path);

    let loc = if reset_pose { ds.loc.as_ref() } else { None };

    ds.traj_tracker.reset(trajectory, law, ds.time_s, loc)
}

/// Relative paths are taken from the software root if it is set.
fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match util::host::get_robot_sw_root() {
        Ok(root) => root.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{drive_ctrl, superstructure};
    use util::module::State;

    fn traj_params() -> crate::traj_ctrl::Params {
        util::params::from_str(include_str!("../../params/traj_ctrl.toml")).unwrap()
    }

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
    fn test_safe_mode_rejects_commands() {
        let mut ds = data_store();

        exec(&mut ds, &Tc::MakeSafe);
        assert!(ds.safe);

        exec(&mut ds, &Tc::Drive(DriveCmd::Stop));
        assert!(ds.drive_ctrl_input.cmd.is_none());

        exec(&mut ds, &Tc::MakeUnsafe);
        assert!(!ds.safe);

        exec(&mut ds, &Tc::Drive(DriveCmd::Stop));
        assert_eq!(ds.drive_ctrl_input.cmd, Some(DriveCmd::Stop));
    }

    #[test]
    fn test_superstructure_goals() {
        let mut ds = data_store();

        exec(
            &mut ds,
            &Tc::SuperstructurePreset(comms_if::tc::superstructure::Preset::Hatch),
        );
        assert!(matches!(
            ds.superstructure_input.goal,
            Some(Goal::Preset(comms_if::tc::superstructure::Preset::Hatch))
        ));
    }

    #[test]
    fn test_follow_pose() {
        let mut ds = data_store();
        ds.traj_tracker = crate::traj_ctrl::TrajTracker::from_params(traj_params());
        let follow = Tc::Drive(DriveCmd::FollowPose {
            x_m: 2.0,
            y_m: 0.5,
            heading_deg: 0.0,
            law: None,
        });

        // Needs a pose to start from
        exec(&mut ds, &follow);
        assert_eq!(
            ds.traj_tracker.state(),
            crate::traj_ctrl::TrackerState::Init
        );

        ds.pose = Some(Pose2::default());
        exec(&mut ds, &follow);
        assert_eq!(
            ds.traj_tracker.state(),
            crate::traj_ctrl::TrackerState::Tracking
        );

        // Driver commands take over
        exec(&mut ds, &Tc::Drive(DriveCmd::Stop));
        assert_eq!(
            ds.traj_tracker.state(),
            crate::traj_ctrl::TrackerState::Init
        );
    }

    #[test]
    fn test_missing_trajectory_is_not_followed() {
        let mut ds = data_store();

        exec(
            &mut ds,
            &Tc::Drive(DriveCmd::FollowTrajectory {
                path: PathBuf::from("/no/such/trajectory.json"),
                reset_pose: false,
                law: None,
            }),
        );

        assert_eq!(
            ds.traj_tracker.state(),
            crate::traj_ctrl::TrackerState::Init
        );
    }
}
