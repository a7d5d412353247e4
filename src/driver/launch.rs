//! Browser bootstrap
//!
//! Launching the browser process belongs to the CLI collaborator, not the
//! workflow core; this module keeps that wiring in one place. The CDP event
//! stream must be drained for the connection to stay alive, so the handle
//! owns a drain task alongside the browser.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::DriverError;

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Run without a visible window (default: true)
    pub headless: bool,
    /// Viewport width (default: 1920)
    pub width: u32,
    /// Viewport height (default: 1080)
    pub height: u32,
    /// Enable the Chrome sandbox (default: true)
    pub sandbox: bool,
    /// Path to the Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: true,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

/// A launched browser plus the task draining its event stream
pub struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserHandle {
    /// Open a fresh page
    pub async fn new_page(&self) -> Result<Page, DriverError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Cdp(e.to_string()))
    }

    /// Close the browser and wait for the drain task to finish
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<(), DriverError> {
        info!("closing browser");
        self.browser
            .close()
            .await
            .map_err(|e| DriverError::Cdp(e.to_string()))?;
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;
        Ok(())
    }
}

/// Launch a browser process per the config
#[instrument(skip(config))]
pub async fn launch_browser(config: &LaunchConfig) -> Result<BrowserHandle, DriverError> {
    info!(headless = config.headless, "launching browser");

    let mut builder = BrowserConfig::builder().viewport(chromiumoxide::handler::viewport::Viewport {
        width: config.width,
        height: config.height,
        device_scale_factor: None,
        emulating_mobile: false,
        is_landscape: true,
        has_touch: false,
    });

    if !config.headless {
        builder = builder.with_head();
    }
    if !config.sandbox {
        builder = builder.arg("--no-sandbox");
    }
    if let Some(path) = &config.chrome_path {
        builder = builder.chrome_executable(path);
    }
    for arg in &config.extra_args {
        builder = builder.arg(arg);
    }

    let cdp_config = builder
        .build()
        .map_err(|e| DriverError::Cdp(e.to_string()))?;

    let (browser, mut handler) = Browser::launch(cdp_config)
        .await
        .map_err(|e| DriverError::Cdp(format!("browser launch failed: {e}")))?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                warn!("browser handler event error");
                break;
            }
        }
        debug!("browser handler finished");
    });

    info!("browser launched");

    Ok(BrowserHandle {
        browser,
        handler: handler_task,
    })
}
