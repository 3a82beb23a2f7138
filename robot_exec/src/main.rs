//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the localisation worker
//!     - Main loop:
//!         - System input acquisition:
//!             - Joint and drive sensing
//!             - Pose estimate
//!         - Telecommand processing and handling
//!         - Superstructure control processing
//!         - Trajectory control processing
//!         - Drive control processing
//!         - Plant simulation
//!
//! # Modules
//!
//! All modules (e.g. `drive_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use robot_lib::{
    data_store::{DataStore, SafeModeCause},
    loc::{self, LocWorker},
    sim::{self, SimHandle, SimPlant},
    tc_processor, traj_ctrl,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    raise_error,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Number of consecutive overruns after which the loop is no longer considered real time.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 500;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Robot control executable, runs a telecommand script against the simulated robot.
#[derive(Debug, StructOpt)]
#[structopt(name = "robot_exec")]
struct Args {
    /// Path to the telecommand script to execute
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of log messages
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("FRC Robot Executable\n");
    info!("Running on: {}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", &args.script);

    let mut si = ScriptInterpreter::new(&args.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.superstructure
        .init("superstructure.toml")
        .wrap_err("Failed to initialise SuperstructureCtrl")?;
    info!("SuperstructureCtrl init complete");

    ds.traj_tracker
        .init("traj_ctrl.toml")
        .wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    ds.drive_ctrl
        .init("drive_ctrl.toml")
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let sim_params: sim::Params =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;
    let sim = SimHandle::new(SimPlant::new(sim_params));
    info!("Simulation init complete");

    let loc_params: loc::Params =
        util::params::load("loc.toml").wrap_err("Could not load loc params")?;
    let loc_worker =
        LocWorker::spawn(&loc_params, sim.clone()).wrap_err("Failed to start the loc worker")?;
    ds.loc = Some(loc_worker.handle());
    info!("Loc init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        match sim.joint_sens() {
            Ok(s) => ds.joint_sens = s,
            Err(e) => warn!("Could not read the joint sensors: {}", e),
        }

        ds.drive_sens = match sim.drive_sens() {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("Could not read the drive sensors: {}", e);
                None
            }
        };

        match ds.loc.as_ref().map(|h| h.pose()) {
            Some(Ok(p)) => {
                ds.pose = Some(p);
                ds.make_unsafe(SafeModeCause::LocUnavailable).ok();
            }
            Some(Err(e)) => {
                if !ds.safe {
                    error!("Pose estimate unavailable: {}", e);
                }
                ds.pose = None;
                ds.make_safe(SafeModeCause::LocUnavailable);
            }
            None => ds.pose = None,
        }

        // ---- TELECOMMAND PROCESSING ----

        match si.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // Superstructure processing
        ds.superstructure_input.sens = ds.joint_sens;
        match ds.superstructure.proc(&ds.superstructure_input) {
            Ok((o, r)) => {
                if let Some(ref plan) = r.new_plan {
                    session.save_with_timestamp("superstructure/plan.json", plan.clone());
                }
                ds.superstructure_output = o;
                ds.superstructure_status_rpt = r;
            }
            Err(e) => warn!("Error during SuperstructureCtrl processing: {}", e),
        }

        // TrajCtrl processing
        if let Some(pose) = ds.pose {
            let input = traj_ctrl::InputData {
                pose,
                now_s: ds.time_s,
                gear: ds.drive_ctrl.gear(),
            };

            match ds.traj_tracker.proc(&input) {
                Ok((o, r)) => {
                    if r.just_finished {
                        session.save_with_timestamp("traj_ctrl/finished.json", r);
                    }
                    ds.traj_tracker_output = o;
                    ds.traj_tracker_status_rpt = r;
                }
                Err(e) => warn!("Error during TrajCtrl processing: {}", e),
            }
        }

        // DriveCtrl processing
        ds.drive_ctrl_input.wheel_dems = ds.traj_tracker_output;
        ds.drive_ctrl_input.odometry_m = ds
            .drive_sens
            .map(|s| 0.5 * (s.left_dist_m + s.right_dist_m));
        ds.drive_ctrl_input.dt_s = ds.dt_s;
        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((o, r)) => {
                ds.drive_ctrl_output = o;
                ds.drive_ctrl_status_rpt = r;
            }
            Err(e) => {
                // DriveCtrl errors usually just mean you sent the wrong TC, so just issue the
                // warning and continue.
                warn!("Error during DriveCtrl processing: {}", e)
            }
        }

        // ---- SIMULATION ----

        if let Err(e) = sim.step(
            CYCLE_PERIOD_S,
            &ds.superstructure_output,
            &ds.drive_ctrl_output,
        ) {
            warn!("Simulation step failed: {}", e);
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            debug!(
                "Pose: {:?}, superstructure: {:?}, tracker: {:?} commanding {:?}",
                ds.pose,
                ds.superstructure_status_rpt.executor_status,
                ds.traj_tracker_status_rpt.state,
                ds.traj_tracker_status_rpt.commanded
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    raise_error!(
                        "More than {} consecutive cycle overruns",
                        MAX_CONSEC_CYCLE_OVERRUNS
                    );
                }
            }
        }

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    ds.loc = None;
    if let Err(e) = loc_worker.stop() {
        warn!("Loc worker did not stop cleanly: {}", e);
    }

    info!("End of execution");

    session.exit();

    Ok(())
}
