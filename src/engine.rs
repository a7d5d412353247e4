//! Step executor and workflow engine
//!
//! Runs a workflow's steps strictly in sequence, moving each through
//! `Pending → Running → {Succeeded, Failed, Uncertain}`. Intermediate steps
//! resolve through direct error interception; concluding steps go through the
//! outcome classifier. Failures capture diagnostics before the step's policy
//! is applied, and the engine never retries a whole run — re-invocation is
//! the orchestrator's call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::classifier::{self, Classification, Outcome};
use crate::config::RunConfig;
use crate::driver::UiElement;
use crate::error::StepError;
use crate::locator::{self, LocatorSpec, Resolution};
use crate::session::Session;
use crate::snapshot::PageSnapshot;
use crate::step::{FailurePolicy, Step, StepAction, StepReport, StepStatus, Workflow};
use crate::waiter::{self, WaitOutcome};

/// Overall status of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run's concluding classification was Success
    Success,
    /// The run aborted or its conclusion was Failure
    Failure,
    /// The run finished but could not be confirmed either way
    Uncertain,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failure => write!(f, "failure"),
            RunStatus::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Terminal record of one workflow run, finalized exactly once
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    /// Workflow name
    pub workflow: String,
    /// Overall status
    pub status: RunStatus,
    /// Whether any step was Uncertain, flagging the run for review
    pub review_flagged: bool,
    /// Human-readable summary sufficient to diagnose without re-running
    pub summary: String,
    /// Per-step reports, in execution order
    pub steps: Vec<StepReport>,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time
    pub finished_at: DateTime<Utc>,
}

/// How one step run ended, before policy is applied
enum StepRun {
    /// Intermediate step completed
    Done,
    /// Concluding step classified the phase
    Concluded(Classification),
    /// The step failed with a taxonomy error
    Failed(StepError),
    /// The run was cancelled mid-step
    Cancelled,
}

/// Sequential executor for one workflow against one session
pub struct WorkflowEngine<'a> {
    session: &'a Session,
    config: &'a RunConfig,
    cancel: CancellationToken,
}

impl<'a> WorkflowEngine<'a> {
    /// Create an engine with a fresh cancellation token
    pub fn new(session: &'a Session, config: &'a RunConfig) -> Self {
        Self::with_cancellation(session, config, CancellationToken::new())
    }

    /// Create an engine observing an external cancellation token
    pub fn with_cancellation(
        session: &'a Session,
        config: &'a RunConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            config,
            cancel,
        }
    }

    /// Token that cancels this run at the next step boundary or poll tick
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every step in order and finalize the result
    #[instrument(skip(self, workflow), fields(workflow = %workflow.name))]
    pub async fn run(&self, workflow: &Workflow) -> WorkflowResult {
        let started_at = Utc::now();
        info!("workflow starting");

        let mut reports: Vec<StepReport> = workflow
            .steps
            .iter()
            .map(|s| StepReport::pending(&s.name))
            .collect();
        let mut conclusion: Option<Classification> = None;
        let mut aborted = false;
        let mut abort_reason: Option<String> = None;

        for (index, step) in workflow.steps.iter().enumerate() {
            // Cancellation is checked at every step boundary.
            if self.cancel.is_cancelled() {
                aborted = true;
                abort_reason = Some("run cancelled".to_string());
                break;
            }

            let report = &mut reports[index];
            report.status = StepStatus::Running;
            debug!(step = %step.name, action = %step.action.describe(), "step running");
            let step_started = std::time::Instant::now();

            let run = self.run_step(step).await;
            report.duration_ms = step_started.elapsed().as_millis() as u64;

            match run {
                StepRun::Done => {
                    report.status = StepStatus::Succeeded;
                }
                StepRun::Concluded(classification) => {
                    self.record_conclusion(step, report, &classification).await;
                    if report.status == StepStatus::Failed
                        && step.policy == FailurePolicy::Abort
                    {
                        aborted = true;
                        abort_reason = report.message.clone();
                    }
                    conclusion = Some(classification);
                }
                StepRun::Failed(error) => {
                    self.capture_diagnostics(step, report, &error).await;
                    match step.policy {
                        FailurePolicy::Abort => {
                            warn!(step = %step.name, error = %error, "critical step failed, aborting");
                            report.status = StepStatus::Failed;
                            aborted = true;
                            abort_reason = Some(error.to_string());
                        }
                        FailurePolicy::Continue if error.is_recoverable() => {
                            warn!(step = %step.name, error = %error, "optional step downgraded to uncertain");
                            report.status = StepStatus::Uncertain;
                        }
                        FailurePolicy::Continue => {
                            warn!(step = %step.name, error = %error, "optional step failed, proceeding");
                            report.status = StepStatus::Failed;
                        }
                    }
                }
                StepRun::Cancelled => {
                    report.status = StepStatus::Failed;
                    report.message = Some("run cancelled".to_string());
                    aborted = true;
                    abort_reason = Some("run cancelled".to_string());
                }
            }

            if aborted {
                break;
            }
        }

        finalize(
            workflow,
            reports,
            conclusion,
            aborted,
            abort_reason,
            started_at,
        )
    }

    async fn run_step(&self, step: &Step) -> StepRun {
        if let Some(condition) = &step.wait_before {
            match waiter::wait(self.session.driver(), condition, &self.cancel).await {
                WaitOutcome::Ready => {}
                WaitOutcome::Cancelled => return StepRun::Cancelled,
                WaitOutcome::TimedOut => {
                    return StepRun::Failed(StepError::WaitTimedOut {
                        condition: condition.describe(),
                        timeout_ms: condition.timeout.as_millis() as u64,
                    });
                }
            }
        }

        match &step.action {
            StepAction::Navigate { url } => {
                match self.session.driver().navigate(url).await {
                    Ok(()) => StepRun::Done,
                    Err(e) => StepRun::Failed(StepError::Driver(e)),
                }
            }
            StepAction::Click { target } => match self.interact(target, Interaction::Click).await {
                Ok(()) => StepRun::Done,
                Err(e) => StepRun::Failed(e),
            },
            StepAction::TypeText {
                target,
                text,
                clear_first,
            } => {
                let op = Interaction::Type {
                    text: text.clone(),
                    clear_first: *clear_first,
                };
                match self.interact(target, op).await {
                    Ok(()) => StepRun::Done,
                    Err(e) => StepRun::Failed(e),
                }
            }
            StepAction::SelectOption { target, option } => {
                let op = Interaction::Select {
                    option: option.clone(),
                };
                match self.interact(target, op).await {
                    Ok(()) => StepRun::Done,
                    Err(e) => StepRun::Failed(e),
                }
            }
            StepAction::WaitUntil { condition } => {
                match waiter::wait(self.session.driver(), condition, &self.cancel).await {
                    WaitOutcome::Ready => StepRun::Done,
                    WaitOutcome::Cancelled => StepRun::Cancelled,
                    WaitOutcome::TimedOut => StepRun::Failed(StepError::WaitTimedOut {
                        condition: condition.describe(),
                        timeout_ms: condition.timeout.as_millis() as u64,
                    }),
                }
            }
            StepAction::AssertOutcome { signals } => {
                match PageSnapshot::capture(self.session.driver()).await {
                    Ok(snapshot) => StepRun::Concluded(classifier::classify(&snapshot, signals)),
                    Err(e) => StepRun::Failed(StepError::Driver(e)),
                }
            }
        }
    }

    /// Resolve a target and apply an interaction to it
    ///
    /// A stale or rejected interaction gets exactly one re-resolution; a
    /// second rejection is treated as `ElementNotFound`.
    async fn interact(&self, target: &LocatorSpec, op: Interaction) -> Result<(), StepError> {
        let element = self.resolve_required(target).await?;

        match op.apply(element.as_ref()).await {
            Ok(()) => Ok(()),
            Err(e) if is_rejection(&e) => {
                warn!(locator = %target.description, reason = %e, "interaction rejected, re-resolving once");
                let element = self.resolve_required(target).await?;
                op.apply(element.as_ref()).await.map_err(|second| {
                    StepError::ElementNotFound {
                        target: format!("{} (after rejected interaction: {second})", target.description),
                        attempted: Vec::new(),
                    }
                })
            }
            Err(e) => Err(StepError::Driver(e)),
        }
    }

    async fn resolve_required(
        &self,
        target: &LocatorSpec,
    ) -> Result<Box<dyn UiElement>, StepError> {
        match locator::resolve(self.session.driver(), target).await? {
            Resolution::Found { element, .. } => Ok(element),
            Resolution::NotFound { attempted } => Err(StepError::ElementNotFound {
                target: target.description.clone(),
                attempted,
            }),
        }
    }

    async fn record_conclusion(
        &self,
        step: &Step,
        report: &mut StepReport,
        classification: &Classification,
    ) {
        report.matched_keywords = classification.matched_keywords.clone();
        report.extracted_id = classification.extracted_id.clone();
        match classification.outcome {
            Outcome::Success => {
                report.status = StepStatus::Succeeded;
                report.message = classification.matched_signal.clone();
            }
            Outcome::Failure => {
                report.status = StepStatus::Failed;
                report.message = Some(format!(
                    "error keyword(s) matched: {}",
                    classification.matched_keywords.join(", ")
                ));
                self.capture_failure_artifacts(step, report).await;
            }
            Outcome::Uncertain => {
                report.status = StepStatus::Uncertain;
                let detail = StepError::ClassificationAmbiguous {
                    detail: "no success signal satisfied, no error keyword matched".to_string(),
                };
                report.message = Some(detail.to_string());
            }
        }
    }

    async fn capture_diagnostics(&self, step: &Step, report: &mut StepReport, error: &StepError) {
        report.message = Some(error.to_string());
        if let StepError::ElementNotFound { attempted, .. } = error {
            report.attempted_locators = attempted.clone();
        }
        self.capture_failure_artifacts(step, report).await;
    }

    async fn capture_failure_artifacts(&self, step: &Step, report: &mut StepReport) {
        match PageSnapshot::capture(self.session.driver()).await {
            Ok(snapshot) => report.snapshot = Some(snapshot.digest()),
            Err(e) => debug!(step = %step.name, error = %e, "snapshot capture failed"),
        }
        if self.config.screenshot_on_failure {
            match self.session.driver().capture_screenshot(&step.name).await {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(e) => debug!(step = %step.name, error = %e, "screenshot capture failed"),
            }
        }
    }
}

/// An element interaction, retryable after one re-resolution
enum Interaction {
    Click,
    Type { text: String, clear_first: bool },
    Select { option: String },
}

impl Interaction {
    async fn apply(&self, element: &dyn UiElement) -> Result<(), crate::error::DriverError> {
        match self {
            Interaction::Click => element.click().await,
            Interaction::Type { text, clear_first } => {
                if *clear_first {
                    element.clear().await?;
                }
                element.send_keys(text).await
            }
            Interaction::Select { option } => element.select_option(option).await,
        }
    }
}

fn is_rejection(error: &crate::error::DriverError) -> bool {
    use crate::error::DriverError;
    matches!(
        error,
        DriverError::StaleElement(_) | DriverError::InteractionRejected(_)
    )
}

fn finalize(
    workflow: &Workflow,
    reports: Vec<StepReport>,
    conclusion: Option<Classification>,
    aborted: bool,
    abort_reason: Option<String>,
    started_at: DateTime<Utc>,
) -> WorkflowResult {
    let status = if aborted {
        RunStatus::Failure
    } else {
        match conclusion.as_ref().map(|c| c.outcome) {
            Some(Outcome::Success) => RunStatus::Success,
            Some(Outcome::Failure) => RunStatus::Failure,
            Some(Outcome::Uncertain) => RunStatus::Uncertain,
            None => {
                if reports.iter().any(|r| r.status == StepStatus::Failed) {
                    RunStatus::Failure
                } else {
                    RunStatus::Success
                }
            }
        }
    };

    let review_flagged =
        status == RunStatus::Uncertain || reports.iter().any(|r| r.status == StepStatus::Uncertain);

    let succeeded = reports
        .iter()
        .filter(|r| r.status == StepStatus::Succeeded)
        .count();
    let uncertain = reports
        .iter()
        .filter(|r| r.status == StepStatus::Uncertain)
        .count();
    let pending = reports
        .iter()
        .filter(|r| r.status == StepStatus::Pending)
        .count();

    let mut summary = format!(
        "workflow '{}' finished with {status}: {succeeded}/{} step(s) succeeded",
        workflow.name,
        reports.len(),
    );
    if uncertain > 0 {
        summary.push_str(&format!(", {uncertain} uncertain"));
    }
    if pending > 0 {
        summary.push_str(&format!(", {pending} never ran"));
    }
    if let Some(reason) = &abort_reason {
        summary.push_str(&format!("; aborted: {reason}"));
    }
    if let Some(id) = conclusion.as_ref().and_then(|c| c.extracted_id.as_deref()) {
        summary.push_str(&format!("; issue id {id}"));
    }

    info!(%status, review_flagged, "workflow finished");

    WorkflowResult {
        workflow: workflow.name.clone(),
        status,
        review_flagged,
        summary,
        steps: reports,
        started_at,
        finished_at: Utc::now(),
    }
}
