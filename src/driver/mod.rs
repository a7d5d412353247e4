//! The UI-driver seam
//!
//! Everything the workflow core consumes from the browser is behind the
//! [`UiDriver`] and [`UiElement`] traits. The production implementation is
//! [`CdpDriver`] over a chromiumoxide page; tests script their own.

pub mod cdp;
pub mod launch;

use async_trait::async_trait;

use crate::artifact::ArtifactRef;
use crate::error::DriverError;
use crate::locator::Strategy;

pub use cdp::CdpDriver;
pub use launch::{launch_browser, BrowserHandle, LaunchConfig};

/// Page-level operations consumed from the UI-driving collaborator
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Navigate the session to a URL and wait for the document to load
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Current page URL
    async fn current_url(&self) -> Result<String, DriverError>;

    /// Current page title
    async fn page_title(&self) -> Result<String, DriverError>;

    /// Visible text of the current page
    async fn page_text(&self) -> Result<String, DriverError>;

    /// Raw markup of the current page
    async fn page_markup(&self) -> Result<String, DriverError>;

    /// All elements matching a (strategy, query) pair, in document order
    ///
    /// An unmatched or unparseable query yields an empty list, not an error;
    /// the resolver treats both the same way.
    async fn find_all(
        &self,
        strategy: Strategy,
        query: &str,
    ) -> Result<Vec<Box<dyn UiElement>>, DriverError>;

    /// Capture a screenshot and hand it to the artifact store
    async fn capture_screenshot(&self, label: &str) -> Result<ArtifactRef, DriverError>;

    /// Whether the page reports itself ready (document loaded)
    async fn evaluate_readiness(&self) -> Result<bool, DriverError>;
}

/// Operations on a resolved element handle
#[async_trait]
pub trait UiElement: Send + Sync {
    /// Whether the element is rendered and takes up space
    async fn is_visible(&self) -> Result<bool, DriverError>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self) -> Result<bool, DriverError>;

    /// Visible text content
    async fn text(&self) -> Result<String, DriverError>;

    /// Attribute value, if present
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Click the element
    async fn click(&self) -> Result<(), DriverError>;

    /// Clear an input's value
    async fn clear(&self) -> Result<(), DriverError>;

    /// Type text into the element
    async fn send_keys(&self, text: &str) -> Result<(), DriverError>;

    /// Select a `<select>` option by visible text
    async fn select_option(&self, visible_text: &str) -> Result<(), DriverError>;
}
