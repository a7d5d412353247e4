//! Page snapshots
//!
//! A [`PageSnapshot`] is an ephemeral capture of observable page state, taken
//! on demand for classification or diagnostics and discarded afterwards. The
//! core never persists one beyond the inspecting call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::driver::UiDriver;
use crate::error::DriverError;

/// Immutable capture of current page state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page URL at capture time
    pub url: String,
    /// Page title at capture time
    pub title: String,
    /// Visible text
    pub text: String,
    /// Raw markup
    pub markup: String,
    /// Capture time
    pub captured_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Capture the current page state through the driver
    pub async fn capture(driver: &dyn UiDriver) -> Result<Self, DriverError> {
        Ok(Self {
            url: driver.current_url().await?,
            title: driver.page_title().await?,
            text: driver.page_text().await?,
            markup: driver.page_markup().await?,
            captured_at: Utc::now(),
        })
    }

    /// Small summary safe to embed in a `WorkflowResult`
    pub fn digest(&self) -> SnapshotDigest {
        SnapshotDigest {
            url: self.url.clone(),
            title: self.title.clone(),
            text_chars: self.text.chars().count(),
            markup_chars: self.markup.chars().count(),
            captured_at: self.captured_at,
        }
    }
}

/// Compact snapshot summary kept in step reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDigest {
    /// Page URL at capture time
    pub url: String,
    /// Page title at capture time
    pub title: String,
    /// Length of the visible text
    pub text_chars: usize,
    /// Length of the raw markup
    pub markup_chars: usize,
    /// Capture time
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_drops_bulk() {
        let snapshot = PageSnapshot {
            url: "http://localhost/mantis/my_view_page.php".to_string(),
            title: "My View".to_string(),
            text: "My View - MantisBT".to_string(),
            markup: "<html><body>My View</body></html>".to_string(),
            captured_at: Utc::now(),
        };

        let digest = snapshot.digest();
        assert_eq!(digest.url, snapshot.url);
        assert_eq!(digest.text_chars, snapshot.text.chars().count());

        let json = serde_json::to_string(&digest).unwrap();
        assert!(!json.contains("<html>"));
    }
}
