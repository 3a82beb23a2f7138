//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{arcade_drive, CurvatureDrive, DriveCtrlError, Params, SidePowers, SlewLimiter};
use crate::traj_ctrl::WheelDems;
use comms_if::{
    eqpt::drive::{DriveDems, Gear, SideDemand},
    tc::drive::DriveCmd,
};
use util::{maths::limit, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    initialised: bool,

    /// If true the drive is kept neutral
    safe: bool,

    gear: Gear,

    mode: Mode,

    curvature_drive: CurvatureDrive,

    left: SlewLimiter,
    right: SlewLimiter,

    report: StatusReport,
}

/// Input data to Drive control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// A new driver command, or `None` if there is no new command on this cycle.
    pub cmd: Option<DriveCmd>,

    /// Wheel demands from trajectory control, or `None` if no trajectory is being followed.
    pub wheel_dems: Option<WheelDems>,

    /// Mean distance travelled by the left and right wheels, or `None` if odometry is
    /// unavailable.
    ///
    /// Units: meters
    pub odometry_m: Option<f64>,

    /// Time since the last cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub gear: Gear,

    /// True if either side's demand was acceleration limited this cycle.
    pub accel_limited: bool,

    /// True if the output came from trajectory control.
    pub following_trajectory: bool,

    /// Distance left to drive when driving a set distance.
    ///
    /// Units: meters
    pub distance_remaining_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The driver command currently in force.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Stopped,
    Arcade {
        linear: f64,
        rotation: f64,
        square_inputs: bool,
    },
    Curvature {
        linear: f64,
        curvature: f64,
        quick_turn: bool,
    },
    Distance {
        /// Odometry reading to stop at, fixed on the first cycle with odometry
        target_m: Option<f64>,
        distance_m: f64,
        max_speed_ms: f64,
        elapsed_s: f64,
        timeout_s: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Mode {
    fn default() -> Self {
        Mode::Stopped
    }
}

impl State for DriveCtrl {
    type Params = Params;

    type InputData = InputData;
    type OutputData = DriveDems;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    fn from_params(params: Params) -> Self {
        Self {
            curvature_drive: CurvatureDrive::new(
                params.quick_stop_threshold,
                params.quick_stop_alpha,
            ),
            gear: params.initial_gear,
            params,
            initialised: true,
            ..Default::default()
        }
    }

    /// Perform cyclic processing of Drive control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(DriveCtrlError::NotInitialised);
        }

        self.report = StatusReport::default();

        if let Some(ref cmd) = input_data.cmd {
            self.handle_cmd(cmd)?;
        }

        self.report.gear = self.gear;

        if self.safe {
            self.mode = Mode::Stopped;
            self.stop();
            return Ok((DriveDems::neutral(self.gear), self.report));
        }

        // Trajectories take priority over driver commands
        let output = match input_data.wheel_dems {
            Some(ref dems) => {
                self.report.following_trajectory = true;
                self.trajectory_output(dems, input_data.dt_s)
            }
            None => match self.mode {
                Mode::Stopped => {
                    self.stop();
                    DriveDems::neutral(self.gear)
                }
                Mode::Distance { .. } => {
                    self.distance_output(input_data.odometry_m, input_data.dt_s)?
                }
                _ => {
                    let powers = self.mix();
                    self.power_output(powers, input_data.dt_s)
                }
            },
        };

        trace!("DriveCtrl output: {:?}", output);

        Ok((output, self.report))
    }
}

impl DriveCtrl {
    pub fn gear(&self) -> Gear {
        self.gear
    }

    /// Stop the drive and keep it neutral until made unsafe.
    pub fn make_safe(&mut self) {
        self.safe = true;
        self.mode = Mode::Stopped;
        self.stop();
    }

    pub fn make_unsafe(&mut self) {
        self.safe = false;
    }

    fn handle_cmd(&mut self, cmd: &DriveCmd) -> Result<(), DriveCtrlError> {
        match *cmd {
            DriveCmd::Arcade {
                linear,
                rotation,
                square_inputs,
            } => {
                self.mode = Mode::Arcade {
                    linear,
                    rotation,
                    square_inputs,
                }
            }
            DriveCmd::Curvature {
                linear,
                curvature,
                quick_turn,
            } => {
                self.mode = Mode::Curvature {
                    linear,
                    curvature,
                    quick_turn,
                }
            }
            DriveCmd::DriveDistance {
                distance_m,
                max_speed_ms,
                timeout_s,
            } => {
                self.mode = Mode::Distance {
                    target_m: None,
                    distance_m,
                    max_speed_ms: max_speed_ms.abs(),
                    elapsed_s: 0.0,
                    timeout_s: timeout_s.unwrap_or(self.params.distance_timeout_s),
                }
            }
            DriveCmd::Stop => self.mode = Mode::Stopped,
            DriveCmd::SetGear { gear } => {
                if gear != self.gear {
                    info!("Shifting to {:?} gear", gear);
                }
                self.gear = gear;
            }
            DriveCmd::FollowTrajectory { .. } | DriveCmd::FollowPose { .. } => {
                return Err(DriveCtrlError::InvalidCmd(cmd.clone()))
            }
        }

        debug!("Drive mode: {:?}", self.mode);

        Ok(())
    }

    fn mix(&mut self) -> SidePowers {
        match self.mode {
            Mode::Stopped | Mode::Distance { .. } => SidePowers::default(),
            Mode::Arcade {
                linear,
                rotation,
                square_inputs,
            } => arcade_drive(linear, rotation, square_inputs, self.params.deadband),
            Mode::Curvature {
                linear,
                curvature,
                quick_turn,
            } => {
                let mut linear = super::deadband(linear, self.params.deadband);
                let curvature = super::deadband(curvature, self.params.deadband);

                if self.gear == Gear::High && !quick_turn {
                    linear *= self.params.high_gear_forward_scale;
                }

                self.curvature_drive.drive(linear, curvature, quick_turn)
            }
        }
    }

    fn power_output(&mut self, powers: SidePowers, dt_s: f64) -> DriveDems {
        let rate = self.params.max_power_rate(self.gear);

        let left = self.left.calculate(powers.left, rate, dt_s);
        let right = self.right.calculate(powers.right, rate, dt_s);
        self.report.accel_limited = left != powers.left || right != powers.right;

        DriveDems {
            left: SideDemand::Power(left),
            right: SideDemand::Power(right),
            gear: self.gear,
        }
    }

    fn trajectory_output(&mut self, dems: &WheelDems, dt_s: f64) -> DriveDems {
        let max_speed = self.params.max_speed_ms.get(self.gear);
        let rate = self.params.max_accel_mss.get(self.gear);

        // The limiters hold normalised values so switching between modes is smooth
        let target_left = dems.left.vel_ms / max_speed;
        let target_right = dems.right.vel_ms / max_speed;
        let left = self.left.calculate(target_left, rate / max_speed, dt_s);
        let right = self.right.calculate(target_right, rate / max_speed, dt_s);
        self.report.accel_limited = left != target_left || right != target_right;

        let left_ms = left * max_speed;
        let right_ms = right * max_speed;

        DriveDems {
            left: SideDemand::Velocity {
                vel_ms: left_ms,
                ff: dems.left.ff,
            },
            right: SideDemand::Velocity {
                vel_ms: right_ms,
                ff: dems.right.ff,
            },
            gear: self.gear,
        }
    }

    /// Closed loop straight line drive towards the target odometry reading.
    fn distance_output(
        &mut self,
        odometry_m: Option<f64>,
        dt_s: f64,
    ) -> Result<DriveDems, DriveCtrlError> {
        let odometry_m = match odometry_m {
            Some(o) => o,
            None => {
                self.mode = Mode::Stopped;
                self.stop();
                return Err(DriveCtrlError::NoOdometry);
            }
        };

        let (target_m, max_speed_ms, elapsed_s, timeout_s) = match self.mode {
            Mode::Distance {
                ref mut target_m,
                distance_m,
                max_speed_ms,
                ref mut elapsed_s,
                timeout_s,
            } => {
                *elapsed_s += dt_s;
                (
                    *target_m.get_or_insert(odometry_m + distance_m),
                    max_speed_ms,
                    *elapsed_s,
                    timeout_s,
                )
            }
            _ => return Ok(DriveDems::neutral(self.gear)),
        };

        let remaining_m = target_m - odometry_m;
        self.report.distance_remaining_m = Some(remaining_m);

        if remaining_m.abs() <= self.params.distance_tolerance_m {
            info!("Set distance reached, {:.3} m remaining", remaining_m);
            self.mode = Mode::Stopped;
            self.stop();
            return Ok(DriveDems::neutral(self.gear));
        }
        if elapsed_s >= timeout_s {
            warn!(
                "Set distance abandoned after {:.2} s, {:.3} m remaining",
                elapsed_s, remaining_m
            );
            self.mode = Mode::Stopped;
            self.stop();
            return Ok(DriveDems::neutral(self.gear));
        }

        let gear_max_ms = self.params.max_speed_ms.get(self.gear);
        let vel_ms = limit(
            self.params.distance_kp * remaining_m,
            max_speed_ms.min(gear_max_ms),
        );

        // Same normalised limiters as the other modes
        let target = vel_ms / gear_max_ms;
        let rate = self.params.max_power_rate(self.gear);
        let left = self.left.calculate(target, rate, dt_s);
        let right = self.right.calculate(target, rate, dt_s);
        self.report.accel_limited = left != target || right != target;

        Ok(DriveDems {
            left: SideDemand::Velocity {
                vel_ms: left * gear_max_ms,
                ff: 0.0,
            },
            right: SideDemand::Velocity {
                vel_ms: right * gear_max_ms,
                ff: 0.0,
            },
            gear: self.gear,
        })
    }

    fn stop(&mut self) {
        self.left.reset(0.0);
        self.right.reset(0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_ctrl::GearLimits;
    use crate::traj_ctrl::WheelDem;
    use approx::assert_relative_eq;

    fn params() -> Params {
        Params {
            deadband: 0.07,
            quick_stop_threshold: 0.2,
            quick_stop_alpha: 0.1,
            high_gear_forward_scale: 0.8,
            initial_gear: Gear::Low,
            max_speed_ms: GearLimits { low: 2.0, high: 4.0 },
            max_accel_mss: GearLimits { low: 10.0, high: 4.0 },
            distance_kp: 6.0,
            distance_tolerance_m: 0.0762,
            distance_timeout_s: 4.0,
        }
    }

    fn input(cmd: Option<DriveCmd>) -> InputData {
        InputData {
            cmd,
            wheel_dems: None,
            odometry_m: None,
            dt_s: 0.02,
        }
    }

    fn odometry_input(cmd: Option<DriveCmd>, odometry_m: f64) -> InputData {
        InputData {
            odometry_m: Some(odometry_m),
            ..input(cmd)
        }
    }

    fn powers(dems: &DriveDems) -> (f64, f64) {
        match (dems.left, dems.right) {
            (SideDemand::Power(l), SideDemand::Power(r)) => (l, r),
            d => panic!("Expected power demands, got {:?}", d),
        }
    }

    #[test]
    fn test_accel_limited_arcade() {
        let mut ctrl = DriveCtrl::from_params(params());

        // Low gear allows 5 per second, so 0.1 per 20 ms cycle
        let (dems, rpt) = ctrl
            .proc(&input(Some(DriveCmd::Arcade {
                linear: 1.0,
                rotation: 0.0,
                square_inputs: false,
            })))
            .unwrap();
        let (l, r) = powers(&dems);
        assert_relative_eq!(l, 0.1);
        assert_relative_eq!(r, 0.1);
        assert!(rpt.accel_limited);

        // Command persists between cycles
        for _ in 0..20 {
            ctrl.proc(&input(None)).unwrap();
        }
        let (dems, rpt) = ctrl.proc(&input(None)).unwrap();
        assert_eq!(powers(&dems), (1.0, 1.0));
        assert!(!rpt.accel_limited);

        // Stop is immediate
        let (dems, _) = ctrl.proc(&input(Some(DriveCmd::Stop))).unwrap();
        assert_eq!(dems, DriveDems::neutral(Gear::Low));
    }

    #[test]
    fn test_high_gear_curvature_scale() {
        let mut ctrl = DriveCtrl::from_params(params());
        ctrl.proc(&input(Some(DriveCmd::SetGear { gear: Gear::High })))
            .unwrap();
        assert_eq!(ctrl.gear(), Gear::High);

        ctrl.proc(&input(Some(DriveCmd::Curvature {
            linear: 1.0,
            curvature: 0.0,
            quick_turn: false,
        })))
        .unwrap();

        let mut dems = DriveDems::neutral(Gear::High);
        for _ in 0..100 {
            dems = ctrl.proc(&input(None)).unwrap().0;
        }
        let (l, r) = powers(&dems);
        assert_relative_eq!(l, 0.8, epsilon = 1e-9);
        assert_relative_eq!(r, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_trajectory_priority() {
        let mut ctrl = DriveCtrl::from_params(params());
        let wheel_dems = WheelDems {
            left: WheelDem { vel_ms: 0.1, ff: 0.05 },
            right: WheelDem { vel_ms: 0.15, ff: 0.06 },
        };

        let (dems, rpt) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::Arcade {
                    linear: 1.0,
                    rotation: 0.0,
                    square_inputs: false,
                }),
                wheel_dems: Some(wheel_dems),
                odometry_m: None,
                dt_s: 0.02,
            })
            .unwrap();

        assert!(rpt.following_trajectory);
        match dems.left {
            SideDemand::Velocity { vel_ms, ff } => {
                assert_relative_eq!(vel_ms, 0.1, epsilon = 1e-12);
                assert_relative_eq!(ff, 0.05);
            }
            d => panic!("Expected a velocity demand, got {:?}", d),
        }
    }

    #[test]
    fn test_drive_distance() {
        let mut ctrl = DriveCtrl::from_params(params());
        let mut odometry_m = 2.0;
        let mut cmd = Some(DriveCmd::DriveDistance {
            distance_m: 1.0,
            max_speed_ms: 1.0,
            timeout_s: None,
        });

        // Low gear allows 5 per second, so the first demand is 0.1 of 2 m/s
        let (dems, rpt) = ctrl.proc(&odometry_input(cmd.clone(), odometry_m)).unwrap();
        match dems.left {
            SideDemand::Velocity { vel_ms, ff } => {
                assert_relative_eq!(vel_ms, 0.2, epsilon = 1e-12);
                assert_eq!(ff, 0.0);
            }
            d => panic!("Expected a velocity demand, got {:?}", d),
        }
        assert!(rpt.accel_limited);
        assert_relative_eq!(rpt.distance_remaining_m.unwrap(), 1.0);

        // Integrate the demand into the odometry until the drive stops
        let mut num_cycles = 0;
        cmd = None;
        loop {
            let (dems, _) = ctrl.proc(&odometry_input(cmd.clone(), odometry_m)).unwrap();
            match dems.left {
                SideDemand::Velocity { vel_ms, .. } => {
                    assert!(vel_ms <= 1.0 + 1e-12);
                    odometry_m += vel_ms * 0.02;
                }
                SideDemand::Neutral => break,
                d => panic!("Unexpected demand {:?}", d),
            }

            num_cycles += 1;
            assert!(num_cycles < 200, "Set distance never reached");
        }

        assert!((odometry_m - 3.0).abs() <= 0.0762);
    }

    #[test]
    fn test_drive_distance_reverse_and_timeout() {
        let mut ctrl = DriveCtrl::from_params(params());
        let cmd = DriveCmd::DriveDistance {
            distance_m: -1.0,
            max_speed_ms: 1.0,
            timeout_s: Some(0.1),
        };

        let (dems, _) = ctrl.proc(&odometry_input(Some(cmd), 0.0)).unwrap();
        match dems.right {
            SideDemand::Velocity { vel_ms, .. } => assert!(vel_ms < 0.0),
            d => panic!("Expected a velocity demand, got {:?}", d),
        }

        // The wheels never move
        let mut last = None;
        for _ in 0..10 {
            last = Some(ctrl.proc(&odometry_input(None, 0.0)).unwrap().0);
        }
        assert_eq!(last, Some(DriveDems::neutral(Gear::Low)));
    }

    #[test]
    fn test_drive_distance_without_odometry() {
        let mut ctrl = DriveCtrl::from_params(params());
        let res = ctrl.proc(&input(Some(DriveCmd::DriveDistance {
            distance_m: 1.0,
            max_speed_ms: 1.0,
            timeout_s: None,
        })));
        assert!(matches!(res, Err(DriveCtrlError::NoOdometry)));

        // Stopped rather than retrying
        let (dems, _) = ctrl.proc(&odometry_input(None, 0.0)).unwrap();
        assert_eq!(dems, DriveDems::neutral(Gear::Low));
    }

    #[test]
    fn test_safe() {
        let mut ctrl = DriveCtrl::from_params(params());
        ctrl.make_safe();

        let (dems, _) = ctrl
            .proc(&input(Some(DriveCmd::Arcade {
                linear: 1.0,
                rotation: 0.0,
                square_inputs: false,
            })))
            .unwrap();
        assert_eq!(dems, DriveDems::neutral(Gear::Low));

        // The command given while safe doesn't survive
        ctrl.make_unsafe();
        let (dems, _) = ctrl.proc(&input(None)).unwrap();
        assert_eq!(dems, DriveDems::neutral(Gear::Low));
    }

    #[test]
    fn test_follow_trajectory_rejected() {
        let mut ctrl = DriveCtrl::from_params(params());
        let res = ctrl.proc(&input(Some(DriveCmd::FollowTrajectory {
            path: "trajectories/straight.json".into(),
            reset_pose: false,
            law: None,
        })));
        assert!(matches!(res, Err(DriveCtrlError::InvalidCmd(_))));
    }
}
