//! Trackpilot - Resilient Browser Workflow Automation
//!
//! This crate drives a bug-tracking web UI (MantisBT-style) through
//! multi-step user workflows over CDP, without control over the target
//! markup's stability. The hard parts live in a small resilient action
//! layer: drift-tolerant element location, predicate-based synchronization,
//! and heuristic classification of ambiguous post-action outcomes.
//!
//! # Features
//!
//! - **Locator Resolver**: ordered candidate selectors, first live match wins
//! - **Synchronization Waiter**: cooperative polling with per-wait budgets
//! - **Outcome Classifier**: three-way Success/Failure/Uncertain from page signals
//! - **Workflow Engine**: sequential step execution with per-step failure policy
//!
//! # Architecture
//!
//! ```text
//! Orchestrator ──▶ run_workflow ──▶ Workflow Engine
//!                                       │
//!                        ┌──────────────┼──────────────┐
//!                        ▼              ▼              ▼
//!                  ┌──────────┐   ┌──────────┐   ┌────────────┐
//!                  │ Locator  │   │  Waiter  │   │ Classifier │
//!                  └────┬─────┘   └────┬─────┘   └─────┬──────┘
//!                       └──────────────┴───────────────┘
//!                                      │
//!                                      ▼
//!                            UiDriver (CDP session)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trackpilot::artifact::FsArtifactStore;
//! use trackpilot::config::RunConfig;
//! use trackpilot::driver::{launch_browser, CdpDriver, LaunchConfig};
//! use trackpilot::session::Session;
//! use trackpilot::workflows::{run_workflow, Credentials, Parameters, WorkflowKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default();
//!     let browser = launch_browser(&LaunchConfig::default()).await?;
//!     let page = browser.new_page().await?;
//!
//!     let store = Arc::new(FsArtifactStore::new(&config.artifact_dir));
//!     let session = Session::new(Box::new(CdpDriver::new(page, store)));
//!
//!     let credentials = Credentials::new("administrator", "root");
//!     let result = run_workflow(
//!         &session,
//!         WorkflowKind::Login,
//!         &credentials,
//!         &Parameters::new(),
//!         &config,
//!     )
//!     .await;
//!
//!     println!("{}", result.summary);
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod locator;
pub mod session;
pub mod snapshot;
pub mod step;
pub mod waiter;
pub mod workflows;

// Re-exports for convenience
pub use classifier::{classify, Classification, Outcome, SignalSet, SuccessSignal};
pub use config::RunConfig;
pub use engine::{RunStatus, WorkflowEngine, WorkflowResult};
pub use error::{Error, Result};
pub use locator::{resolve, Candidate, LocatorSpec, Resolution, Strategy};
pub use session::Session;
pub use snapshot::PageSnapshot;
pub use step::{FailurePolicy, Step, StepAction, StepStatus, Workflow};
pub use waiter::{wait, WaitCondition, WaitFor, WaitOutcome};
pub use workflows::{run_workflow, Credentials, Parameters, WorkflowKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
