//! Error types for trackpilot
//!
//! This module provides the error hierarchy using `thiserror`. Step-level
//! failures (`StepError`) are the taxonomy the workflow engine reasons about;
//! driver-level failures (`DriverError`) describe what went wrong at the CDP
//! boundary.

use thiserror::Error;

use crate::locator::CandidateAttempt;

/// The main error type for trackpilot operations
#[derive(Error, Debug)]
pub enum Error {
    /// UI-driver errors (CDP, page access, artifact capture)
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Step execution errors
    #[error("Step error: {0}")]
    Step(#[from] StepError),

    /// Workflow-level errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Failures at the UI-driver boundary
#[derive(Error, Debug)]
pub enum DriverError {
    /// A CDP command failed
    #[error("CDP command failed: {0}")]
    Cdp(String),

    /// Navigation failed outright
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Navigation did not settle within the budget
    #[error("Navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    /// The element went away between resolution and interaction
    #[error("Element became stale: {0}")]
    StaleElement(String),

    /// The element refused the interaction (disabled, detached, no matching option)
    #[error("Interaction rejected: {0}")]
    InteractionRejected(String),

    /// Screenshot capture failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// The artifact store could not persist a capture
    #[error("Artifact store failed: {0}")]
    ArtifactStore(String),
}

/// The step-level failure taxonomy
///
/// `ElementNotFound` and `WaitTimedOut` are downgraded to an Uncertain step
/// outcome inside non-critical steps; inside critical steps they abort the
/// run. `ActionRejected` is retried with exactly one re-resolution before
/// being treated as `ElementNotFound`.
#[derive(Error, Debug)]
pub enum StepError {
    /// Every locator candidate was exhausted without an accepted match
    #[error("no element matched '{target}' ({} candidate(s) attempted)", attempted.len())]
    ElementNotFound {
        /// Human-readable description of the locator target
        target: String,
        /// Per-candidate inventory: raw match counts and rejections
        attempted: Vec<CandidateAttempt>,
    },

    /// A wait condition never held within its budget
    #[error("wait for {condition} timed out after {timeout_ms}ms")]
    WaitTimedOut {
        /// Description of the awaited condition
        condition: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The interaction was rejected after the single allowed re-resolution
    #[error("action on '{target}' rejected: {reason}")]
    ActionRejected {
        /// Human-readable description of the locator target
        target: String,
        /// What the driver reported
        reason: String,
    },

    /// The outcome classifier could neither confirm nor disprove the step
    #[error("outcome ambiguous: {detail}")]
    ClassificationAmbiguous {
        /// Snapshot context for review
        detail: String,
    },

    /// A driver failure that is not part of the recoverable taxonomy
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Workflow-level errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The requested workflow name is not registered
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),

    /// A required parameter was not supplied and has no default
    #[error("workflow '{workflow}' requires parameter '{key}'")]
    MissingParameter {
        /// Workflow name
        workflow: String,
        /// Parameter key
        key: String,
    },
}

/// Result type alias for trackpilot operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

impl StepError {
    /// Whether this error may be downgraded to an Uncertain outcome inside a
    /// non-critical step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StepError::ElementNotFound { .. }
                | StepError::WaitTimedOut { .. }
                | StepError::ClassificationAmbiguous { .. }
        )
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::Cdp(err.to_string())
    }
}
