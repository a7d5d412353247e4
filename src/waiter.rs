//! Synchronization waiter
//!
//! Cooperative polling against UI state: a [`WaitCondition`] pairs a
//! predicate with a timeout and poll interval, and [`wait`] evaluates it
//! until it holds, the budget runs out, or the run is cancelled. Timing out
//! is a value, not an error; the caller decides what it means.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::driver::UiDriver;
use crate::error::DriverError;
use crate::locator::{self, LocatorSpec, MatchMode};

/// Default poll interval when a condition does not specify one
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The predicate class of a wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaitFor {
    /// An element matching the spec is attached to the page
    ElementPresent(LocatorSpec),
    /// An element matching the spec is visible
    ElementVisible(LocatorSpec),
    /// An element matching the spec is visible and enabled
    ElementClickable(LocatorSpec),
    /// The page reports itself loaded
    PageReady,
    /// Fixed sleep; the fallback for pages with no readiness signal.
    /// Strictly weaker than a predicate wait, so prefer those.
    Delay {
        /// Sleep length in milliseconds
        millis: u64,
    },
}

/// A predicate plus its timing budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitCondition {
    /// What to wait for
    pub what: WaitFor,
    /// Overall budget; the wait returns within `timeout + one poll interval`
    pub timeout: Duration,
    /// Pause between predicate evaluations
    pub poll_interval: Duration,
}

impl WaitCondition {
    /// Wait for an element to be present in the DOM
    pub fn present(spec: LocatorSpec, timeout: Duration) -> Self {
        Self {
            what: WaitFor::ElementPresent(spec),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Wait for an element to be visible
    pub fn visible(spec: LocatorSpec, timeout: Duration) -> Self {
        Self {
            what: WaitFor::ElementVisible(spec),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Wait for an element to be visible and enabled
    pub fn clickable(spec: LocatorSpec, timeout: Duration) -> Self {
        Self {
            what: WaitFor::ElementClickable(spec),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Wait for the page to report itself loaded
    pub fn page_ready(timeout: Duration) -> Self {
        Self {
            what: WaitFor::PageReady,
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Fixed-delay fallback wait
    pub fn delay(duration: Duration) -> Self {
        Self {
            what: WaitFor::Delay {
                millis: duration.as_millis() as u64,
            },
            timeout: duration,
            poll_interval: duration,
        }
    }

    /// Override the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Human-readable form for diagnostics
    pub fn describe(&self) -> String {
        match &self.what {
            WaitFor::ElementPresent(spec) => format!("'{}' present", spec.description),
            WaitFor::ElementVisible(spec) => format!("'{}' visible", spec.description),
            WaitFor::ElementClickable(spec) => format!("'{}' clickable", spec.description),
            WaitFor::PageReady => "page ready".to_string(),
            WaitFor::Delay { millis } => format!("fixed delay of {millis}ms"),
        }
    }
}

/// Terminal state of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    /// The predicate held within the budget
    Ready,
    /// The budget elapsed first; control returns to the caller
    TimedOut,
    /// The run was cancelled mid-wait
    Cancelled,
}

/// Poll a condition until it holds, times out, or the run is cancelled
///
/// Cancellation is observed on every tick. Driver errors during predicate
/// evaluation are treated as "not yet": a page mid-transition can briefly
/// leave the DOM unqueryable, and bailing out there would defeat the wait.
pub async fn wait(
    driver: &dyn UiDriver,
    condition: &WaitCondition,
    cancel: &CancellationToken,
) -> WaitOutcome {
    if let WaitFor::Delay { millis } = condition.what {
        tokio::select! {
            _ = cancel.cancelled() => return WaitOutcome::Cancelled,
            _ = tokio::time::sleep(Duration::from_millis(millis)) => return WaitOutcome::Ready,
        }
    }

    let deadline = tokio::time::Instant::now() + condition.timeout;
    loop {
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        match satisfied(driver, &condition.what).await {
            Ok(true) => return WaitOutcome::Ready,
            Ok(false) => {}
            Err(e) => {
                debug!(condition = %condition.describe(), error = %e, "predicate errored, polling on");
            }
        }

        if tokio::time::Instant::now() >= deadline {
            return WaitOutcome::TimedOut;
        }

        tokio::select! {
            _ = cancel.cancelled() => return WaitOutcome::Cancelled,
            _ = tokio::time::sleep(condition.poll_interval) => {}
        }
    }
}

async fn satisfied(driver: &dyn UiDriver, what: &WaitFor) -> Result<bool, DriverError> {
    match what {
        WaitFor::ElementPresent(spec) => {
            Ok(locator::resolve_with(driver, spec, MatchMode::Present)
                .await?
                .is_found())
        }
        WaitFor::ElementVisible(spec) => {
            Ok(locator::resolve_with(driver, spec, MatchMode::Visible)
                .await?
                .is_found())
        }
        WaitFor::ElementClickable(spec) => {
            Ok(locator::resolve_with(driver, spec, MatchMode::Interactable)
                .await?
                .is_found())
        }
        WaitFor::PageReady => driver.evaluate_readiness().await,
        WaitFor::Delay { .. } => Ok(true),
    }
}
