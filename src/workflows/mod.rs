//! Workflow definitions and registry
//!
//! Each workflow is a pure data composition: ordered steps, drift-tolerant
//! locators, data payloads, and per-workflow signal lists. No logic lives
//! here beyond assembling those from credentials and parameters.

mod issue;
mod login;
mod project;
mod status;

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::engine::{WorkflowEngine, WorkflowResult};
use crate::error::WorkflowError;
use crate::session::Session;
use crate::step::Workflow;

pub use issue::{assign_issue_workflow, report_issue_workflow};
pub use login::login_workflow;
pub use project::create_project_workflow;
pub use status::change_status_workflow;

/// Account credentials for the target tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Free-form workflow parameters with per-workflow defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(HashMap<String, String>);

impl Parameters {
    /// Empty parameter set; every workflow falls back to its defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value for a key, or the workflow's default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0.get(key).map(String::as_str).unwrap_or(default)
    }
}

impl From<HashMap<String, String>> for Parameters {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// The registered workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    /// Two-phase tracker login
    Login,
    /// Create a project under Manage → Projects
    CreateProject,
    /// File a new issue
    ReportIssue,
    /// Assign an existing issue to a handler
    AssignIssue,
    /// Move an existing issue to a new status
    ChangeStatus,
}

impl WorkflowKind {
    /// All registered kinds, in definition order
    pub fn all() -> [WorkflowKind; 5] {
        [
            WorkflowKind::Login,
            WorkflowKind::CreateProject,
            WorkflowKind::ReportIssue,
            WorkflowKind::AssignIssue,
            WorkflowKind::ChangeStatus,
        ]
    }

    /// Kebab-case name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::Login => "login",
            WorkflowKind::CreateProject => "create-project",
            WorkflowKind::ReportIssue => "report-issue",
            WorkflowKind::AssignIssue => "assign-issue",
            WorkflowKind::ChangeStatus => "change-status",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkflowKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowKind::all()
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| WorkflowError::UnknownWorkflow(s.to_string()))
    }
}

/// Build the named workflow from config, credentials, and parameters
pub fn build_workflow(
    kind: WorkflowKind,
    config: &RunConfig,
    credentials: &Credentials,
    params: &Parameters,
) -> Workflow {
    match kind {
        WorkflowKind::Login => login_workflow(config, credentials),
        WorkflowKind::CreateProject => create_project_workflow(config, params),
        WorkflowKind::ReportIssue => report_issue_workflow(config, params),
        WorkflowKind::AssignIssue => assign_issue_workflow(config, params),
        WorkflowKind::ChangeStatus => change_status_workflow(config, params),
    }
}

/// Build and run one workflow against an exclusively-owned session
///
/// Workflows other than login assume the session is already authenticated;
/// orchestrators chain a login run first.
pub async fn run_workflow(
    session: &Session,
    kind: WorkflowKind,
    credentials: &Credentials,
    params: &Parameters,
    config: &RunConfig,
) -> WorkflowResult {
    let workflow = build_workflow(kind, config, credentials, params);
    WorkflowEngine::new(session, config).run(&workflow).await
}
