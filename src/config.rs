//! Run configuration
//!
//! One `RunConfig` is constructed by the caller, owned for the duration of a
//! run, and threaded through workflow construction. It replaces any global
//! mutable state for target URLs, artifact directories, and timing defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a single workflow run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base URL of the target bug tracker (default: `http://localhost/mantis`)
    pub base_url: String,
    /// Directory the artifact store writes into (default: `./artifacts`)
    pub artifact_dir: PathBuf,
    /// Default wait timeout (default: 30s)
    pub default_timeout: Duration,
    /// Default poll interval for predicate waits (default: 500ms)
    pub poll_interval: Duration,
    /// Capture a screenshot whenever a step fails (default: true)
    pub screenshot_on_failure: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/mantis".to_string(),
            artifact_dir: PathBuf::from("artifacts"),
            default_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            screenshot_on_failure: true,
        }
    }
}

impl RunConfig {
    /// Create a new config builder
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Absolute URL for a path relative to the tracker root
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builder for [`RunConfig`]
#[derive(Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Set the tracker base URL
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the artifact directory
    pub fn artifact_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.artifact_dir = dir.into();
        self
    }

    /// Set the default wait timeout
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Set the predicate-wait poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Enable/disable failure screenshots
    pub fn screenshot_on_failure(mut self, enabled: bool) -> Self {
        self.config.screenshot_on_failure = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> RunConfig {
        self.config
    }
}
