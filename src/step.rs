//! Steps and workflows as data
//!
//! A [`Step`] names one unit of execution: an action, an optional pre-wait,
//! and a failure policy. A [`Workflow`] is nothing but an ordered list of
//! steps; all behavior lives in the engine.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRef;
use crate::classifier::SignalSet;
use crate::locator::{CandidateAttempt, LocatorSpec};
use crate::snapshot::SnapshotDigest;
use crate::waiter::WaitCondition;

/// What a step does when it runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepAction {
    /// Navigate the session to a URL
    Navigate {
        /// Absolute target URL
        url: String,
    },
    /// Resolve a locator and click the element
    Click {
        /// Element to click
        target: LocatorSpec,
    },
    /// Resolve a locator and type into the element
    TypeText {
        /// Element to type into
        target: LocatorSpec,
        /// Text to type
        text: String,
        /// Clear the current value first
        clear_first: bool,
    },
    /// Resolve a locator and pick a `<select>` option by visible text
    SelectOption {
        /// The select element
        target: LocatorSpec,
        /// Visible text of the wanted option
        option: String,
    },
    /// Block on a wait condition
    WaitUntil {
        /// Condition to wait for
        condition: WaitCondition,
    },
    /// Conclude a workflow phase through the outcome classifier
    AssertOutcome {
        /// Signal lists consumed by the classifier
        signals: SignalSet,
    },
}

impl StepAction {
    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            StepAction::Navigate { url } => format!("navigate to {url}"),
            StepAction::Click { target } => format!("click '{}'", target.description),
            StepAction::TypeText { target, .. } => format!("type into '{}'", target.description),
            StepAction::SelectOption { target, option } => {
                format!("select '{option}' in '{}'", target.description)
            }
            StepAction::WaitUntil { condition } => format!("wait until {}", condition.describe()),
            StepAction::AssertOutcome { .. } => "classify outcome".to_string(),
        }
    }
}

/// What the engine does when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop remaining steps; the run fails
    Abort,
    /// Mark the step and proceed; recoverable failures become Uncertain
    Continue,
}

/// One named unit of execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step name, unique within its workflow
    pub name: String,
    /// The action to perform
    pub action: StepAction,
    /// Condition to await before acting
    pub wait_before: Option<WaitCondition>,
    /// Failure policy; critical steps abort
    pub policy: FailurePolicy,
}

impl Step {
    /// Create a critical step (policy `Abort`)
    pub fn new(name: impl Into<String>, action: StepAction) -> Self {
        Self {
            name: name.into(),
            action,
            wait_before: None,
            policy: FailurePolicy::Abort,
        }
    }

    /// Downgrade to a non-critical step (policy `Continue`)
    pub fn optional(mut self) -> Self {
        self.policy = FailurePolicy::Continue;
        self
    }

    /// Attach a pre-wait
    pub fn after(mut self, condition: WaitCondition) -> Self {
        self.wait_before = Some(condition);
        self
    }
}

/// Named ordered sequence of steps accomplishing one user-facing task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name
    pub name: String,
    /// Steps, executed strictly in order
    pub steps: Vec<Step>,
}

impl Workflow {
    /// Create a workflow from ordered steps
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// Per-step state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started
    Pending,
    /// Currently executing
    Running,
    /// Terminal: the step succeeded
    Succeeded,
    /// Terminal: the step failed
    Failed,
    /// Terminal: not disproven; recoverable non-failure
    Uncertain,
}

impl StepStatus {
    /// Whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Succeeded | StepStatus::Failed | StepStatus::Uncertain
        )
    }
}

/// Everything recorded about one step's execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Final state machine position
    pub status: StepStatus,
    /// Human-readable outcome or failure summary
    pub message: Option<String>,
    /// Error keywords the classifier matched, if the step concluded a phase
    pub matched_keywords: Vec<String>,
    /// Issue id the classifier extracted, if any
    pub extracted_id: Option<String>,
    /// Diagnostic artifacts captured for this step
    pub artifacts: Vec<ArtifactRef>,
    /// Locator candidates that matched nothing, when resolution failed
    pub attempted_locators: Vec<CandidateAttempt>,
    /// Snapshot digest captured on failure
    pub snapshot: Option<SnapshotDigest>,
    /// Wall-clock duration of the step in milliseconds
    pub duration_ms: u64,
}

impl StepReport {
    /// A fresh pending report for a step
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Pending,
            message: None,
            matched_keywords: Vec::new(),
            extracted_id: None,
            artifacts: Vec::new(),
            attempted_locators: Vec::new(),
            snapshot: None,
            duration_ms: 0,
        }
    }
}
