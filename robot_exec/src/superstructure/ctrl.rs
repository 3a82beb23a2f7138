//! Superstructure control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{
    planner, ExecutorStatus, Hazard, Params, PlanExecutor, PlanReport, SuperStructureState,
    SuperstructureError,
};
use comms_if::{
    eqpt::superstructure::{JointDems, JointSens},
    tc::superstructure::Preset,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Superstructure control module state
#[derive(Default)]
pub struct SuperstructureCtrl {
    params: Params,

    initialised: bool,

    /// If true all joints are kept neutral
    safe: bool,

    executor: PlanExecutor,

    /// A plan made on the previous cycle, which starts executing on this one
    pending_plan: Option<PlanReport>,

    /// The corrected goal currently being moved to
    goal: Option<SuperStructureState>,

    report: StatusReport,
}

/// Input data to superstructure control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// A new goal, or `None` if there is no new goal on this cycle.
    pub goal: Option<Goal>,

    /// The current joint measurements.
    pub sens: JointSens,
}

/// Status report for superstructure control processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// The plan made this cycle, if any.
    pub new_plan: Option<PlanReport>,

    pub executor_status: ExecutorStatus,

    /// True if the joints were forced neutral this cycle.
    pub neutral: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A goal for the superstructure.
#[derive(Debug, Clone, Copy)]
pub enum Goal {
    State(SuperStructureState),

    /// A preset, holding whatever piece is currently held.
    Preset(Preset),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SuperstructureCtrl {
    type Params = Params;

    type InputData = InputData;
    type OutputData = JointDems;
    type StatusReport = StatusReport;
    type ProcError = SuperstructureError;

    fn from_params(params: Params) -> Self {
        Self {
            executor: PlanExecutor::new(&params),
            params,
            initialised: true,
            ..Default::default()
        }
    }

    /// Perform cyclic processing of superstructure control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(SuperstructureError::NotInitialised);
        }

        self.report = StatusReport::default();

        let measured = SuperStructureState::from(&input_data.sens);

        // In safe mode nothing moves
        if self.safe {
            return Ok(self.neutral());
        }

        // A new goal cancels whatever is running, the joints go neutral for this cycle and the
        // new plan starts on the next one.
        if let Some(goal) = input_data.goal {
            self.executor.cancel();

            let goal = match goal {
                Goal::State(s) => s,
                Goal::Preset(p) => self.params.preset_state(p, measured.held_piece),
            };

            let plan_report = planner::plan(&goal, &measured, &self.params);
            log_plan(&goal, &plan_report);

            self.goal = Some(plan_report.safe_goal);
            self.report.new_plan = Some(plan_report.clone());
            self.pending_plan = Some(plan_report);

            return Ok(self.neutral());
        }

        if let Some(plan_report) = self.pending_plan.take() {
            self.executor.start(plan_report.plan, &measured);
        }

        let was_running = self.executor.status() == ExecutorStatus::Running;

        let dems = self.executor.tick(&measured);

        self.report.executor_status = self.executor.status();

        if was_running && self.report.executor_status == ExecutorStatus::Complete {
            if let Some(goal) = self.goal {
                info!("Superstructure reached {}", goal);
            }
        }

        Ok((dems, self.report.clone()))
    }
}

impl SuperstructureCtrl {
    /// Put the superstructure into safe mode, stopping any plan and keeping all joints neutral.
    pub fn make_safe(&mut self) {
        self.safe = true;
        self.executor.cancel();
        self.pending_plan = None;
        self.goal = None;
    }

    /// Leave safe mode. Joints stay neutral until the next goal.
    pub fn make_unsafe(&mut self) {
        self.safe = false;
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The corrected goal currently being moved to.
    pub fn goal(&self) -> Option<SuperStructureState> {
        self.goal
    }

    fn neutral(&mut self) -> (JointDems, StatusReport) {
        self.report.neutral = true;
        self.report.executor_status = self.executor.status();
        (JointDems::neutral(), self.report.clone())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn log_plan(goal: &SuperStructureState, report: &PlanReport) {
    info!(
        "New superstructure goal {}, planned {} steps",
        goal,
        report.plan.len()
    );

    for hazard in report.hazards.iter() {
        match hazard {
            Hazard::LimitExceeded
            | Hazard::FloorClearance
            | Hazard::UnsolvableGeometry
            | Hazard::HeldPieceMismatch => {
                warn!("Superstructure hazard {:?}, goal corrected to {}", hazard, report.safe_goal)
            }
            Hazard::CrossbarRisk
            | Hazard::LongClimb
            | Hazard::PassthroughForward
            | Hazard::PassthroughReverse => info!("Superstructure hazard {:?}", hazard),
        }
    }
}
