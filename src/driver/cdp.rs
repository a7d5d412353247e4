//! Chromiumoxide-backed UI driver
//!
//! Maps the [`UiDriver`] seam onto a CDP page. CSS-expressible strategies go
//! straight through `querySelectorAll`; link-text and XPath queries are
//! realized by tagging matches with a marker attribute from injected JS and
//! re-selecting them, since CDP has no native handle for either. Element
//! state checks run as JS functions on the element's own context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use tracing::{debug, instrument};

use crate::artifact::{ArtifactRef, ArtifactStore};
use crate::driver::{UiDriver, UiElement};
use crate::error::DriverError;
use crate::locator::Strategy;

/// Attribute used to hand JS-located elements back to the CDP selector path
const MARK_ATTR: &str = "data-tp-mark";

/// UI driver over a chromiumoxide [`Page`]
pub struct CdpDriver {
    page: Page,
    store: Arc<dyn ArtifactStore>,
    nav_timeout: Duration,
    mark_seq: AtomicU64,
}

impl CdpDriver {
    /// Wrap a page; screenshots are handed to `store`
    pub fn new(page: Page, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            page,
            store,
            nav_timeout: Duration::from_secs(30),
            mark_seq: AtomicU64::new(0),
        }
    }

    /// Override the navigation timeout (default 30s)
    pub fn with_nav_timeout(mut self, timeout: Duration) -> Self {
        self.nav_timeout = timeout;
        self
    }

    /// Tag elements located by injected JS, then re-select them via CSS so we
    /// get real CDP element handles in document order
    async fn find_marked(&self, script: String) -> Result<Vec<Box<dyn UiElement>>, DriverError> {
        if let Err(e) = self.page.evaluate(script).await {
            debug!(error = %e, "marker script failed, treating as no matches");
            return Ok(Vec::new());
        }

        let selector = format!("[{MARK_ATTR}]");
        let found = match self.page.find_elements(selector.as_str()).await {
            Ok(found) => found,
            Err(e) => {
                debug!(error = %e, "marked re-select failed, treating as no matches");
                Vec::new()
            }
        };
        Ok(wrap_elements(found))
    }

    /// Script that clears stale marks and tags anchors matching by text
    fn link_text_script(&self, needle: &str, exact: bool) -> String {
        let mark = self.mark_seq.fetch_add(1, Ordering::Relaxed);
        let needle = js_string(needle);
        let test = if exact {
            "text === needle"
        } else {
            "text.includes(needle)"
        };
        format!(
            r#"
            (() => {{
                const needle = {needle};
                document.querySelectorAll('[{MARK_ATTR}]').forEach(el => el.removeAttribute('{MARK_ATTR}'));
                let n = 0;
                for (const a of document.querySelectorAll('a')) {{
                    const text = (a.innerText || a.textContent || '').trim();
                    if ({test}) {{
                        a.setAttribute('{MARK_ATTR}', '{mark}-' + n++);
                    }}
                }}
                return n;
            }})()
            "#
        )
    }

    /// Script that clears stale marks and tags XPath matches
    fn xpath_script(&self, expression: &str) -> String {
        let mark = self.mark_seq.fetch_add(1, Ordering::Relaxed);
        let expression = js_string(expression);
        format!(
            r#"
            (() => {{
                document.querySelectorAll('[{MARK_ATTR}]').forEach(el => el.removeAttribute('{MARK_ATTR}'));
                let snapshot;
                try {{
                    snapshot = document.evaluate({expression}, document, null,
                        XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                }} catch (e) {{
                    return 0;
                }}
                let n = 0;
                for (let i = 0; i < snapshot.snapshotLength; i++) {{
                    const node = snapshot.snapshotItem(i);
                    if (node && node.setAttribute) {{
                        node.setAttribute('{MARK_ATTR}', '{mark}-' + n++);
                    }}
                }}
                return n;
            }})()
            "#
        )
    }
}

#[async_trait]
impl UiDriver for CdpDriver {
    #[instrument(skip(self))]
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("file://")
        {
            return Err(DriverError::Navigation(format!(
                "URL must start with http://, https://, or file://: {url}"
            )));
        }

        let nav = self.page.goto(url);
        tokio::time::timeout(self.nav_timeout, nav)
            .await
            .map_err(|_| DriverError::NavigationTimeout(self.nav_timeout.as_millis() as u64))?
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        // Wait for the load event so callers see a settled document.
        let ready = r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    resolve(true);
                } else {
                    window.addEventListener('load', () => resolve(true));
                }
            })
        "#;
        tokio::time::timeout(self.nav_timeout, self.page.evaluate(ready))
            .await
            .map_err(|_| DriverError::NavigationTimeout(self.nav_timeout.as_millis() as u64))?
            .map_err(map_cdp)?;

        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self.page.url().await.map_err(map_cdp)?;
        Ok(url.unwrap_or_default())
    }

    async fn page_title(&self) -> Result<String, DriverError> {
        let title = self.page.get_title().await.map_err(map_cdp)?;
        Ok(title.unwrap_or_default())
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(map_cdp)?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    async fn page_markup(&self) -> Result<String, DriverError> {
        self.page.content().await.map_err(map_cdp)
    }

    async fn find_all(
        &self,
        strategy: Strategy,
        query: &str,
    ) -> Result<Vec<Box<dyn UiElement>>, DriverError> {
        let selector = match strategy {
            Strategy::Css => query.to_string(),
            Strategy::Id => format!("[id='{}']", quote_attr(query)),
            Strategy::Name => format!("[name='{}']", quote_attr(query)),
            Strategy::TagName => query.to_string(),
            Strategy::LinkText => {
                return self.find_marked(self.link_text_script(query, true)).await;
            }
            Strategy::PartialLinkText => {
                return self.find_marked(self.link_text_script(query, false)).await;
            }
            Strategy::XPath => {
                return self.find_marked(self.xpath_script(query)).await;
            }
        };

        match self.page.find_elements(selector.as_str()).await {
            Ok(found) => Ok(wrap_elements(found)),
            // An unmatched or malformed selector is a miss, not a fault; the
            // resolver moves on to the next candidate.
            Err(e) => {
                debug!(strategy = strategy.name(), query, error = %e, "selector yielded nothing");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self))]
    async fn capture_screenshot(&self, label: &str) -> Result<ArtifactRef, DriverError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(80)
            .from_surface(true)
            .build();

        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| DriverError::ScreenshotFailed(e.to_string()))?;

        self.store.store_screenshot(label, &bytes).await
    }

    async fn evaluate_readiness(&self) -> Result<bool, DriverError> {
        let result = self
            .page
            .evaluate("document.readyState === 'complete'")
            .await
            .map_err(map_cdp)?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }
}

/// Element handle over a chromiumoxide [`Element`]
struct CdpElement {
    inner: Element,
}

#[async_trait]
impl UiElement for CdpElement {
    async fn is_visible(&self) -> Result<bool, DriverError> {
        let js = r#"
            function() {
                const rect = this.getBoundingClientRect();
                if (rect.width <= 0 || rect.height <= 0) return false;
                const style = window.getComputedStyle(this);
                return style.visibility !== 'hidden' && style.display !== 'none';
            }
        "#;
        call_bool(&self.inner, js).await
    }

    async fn is_enabled(&self) -> Result<bool, DriverError> {
        call_bool(&self.inner, "function() { return this.disabled !== true; }").await
    }

    async fn text(&self) -> Result<String, DriverError> {
        let text = self.inner.inner_text().await.map_err(map_cdp)?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.inner.attribute(name).await.map_err(map_cdp)
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.inner
            .scroll_into_view()
            .await
            .map_err(map_cdp)?
            .click()
            .await
            .map_err(map_cdp)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), DriverError> {
        let js = r#"
            function() {
                if ('value' in this) {
                    this.value = '';
                    this.dispatchEvent(new Event('input', { bubbles: true }));
                    this.dispatchEvent(new Event('change', { bubbles: true }));
                }
            }
        "#;
        self.inner.call_js_fn(js, false).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.inner
            .focus()
            .await
            .map_err(map_cdp)?
            .type_str(text)
            .await
            .map_err(map_cdp)?;
        Ok(())
    }

    async fn select_option(&self, visible_text: &str) -> Result<(), DriverError> {
        // Match option text case-insensitively and fire the change event the
        // page's own handlers listen for.
        let wanted = js_string(visible_text);
        let js = format!(
            r#"
            function() {{
                if (this.tagName !== 'SELECT') return 'not a select element';
                const wanted = {wanted}.trim().toLowerCase();
                for (const option of this.options) {{
                    const text = (option.textContent || '').trim().toLowerCase();
                    if (text === wanted) {{
                        this.value = option.value;
                        this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return '';
                    }}
                }}
                return 'no option with text ' + {wanted};
            }}
            "#
        );

        let ret = self.inner.call_js_fn(js, false).await.map_err(map_cdp)?;
        match ret.result.value.as_ref().and_then(|v| v.as_str()) {
            Some("") | None => Ok(()),
            Some(message) => Err(DriverError::InteractionRejected(message.to_string())),
        }
    }
}

fn wrap_elements(found: Vec<Element>) -> Vec<Box<dyn UiElement>> {
    found
        .into_iter()
        .map(|inner| Box::new(CdpElement { inner }) as Box<dyn UiElement>)
        .collect()
}

async fn call_bool(element: &Element, js: &str) -> Result<bool, DriverError> {
    let ret = element.call_js_fn(js, false).await.map_err(map_cdp)?;
    Ok(ret
        .result
        .value
        .as_ref()
        .and_then(|v| v.as_bool())
        .unwrap_or(false))
}

/// Map CDP failures into the driver taxonomy
///
/// A node that vanished between resolution and interaction surfaces as a
/// "node not found" style command error; that is the stale case the engine
/// answers with one re-resolution.
fn map_cdp(err: chromiumoxide::error::CdpError) -> DriverError {
    let message = err.to_string();
    if is_stale_message(&message) {
        DriverError::StaleElement(message)
    } else {
        DriverError::Cdp(message)
    }
}

fn is_stale_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("node with given id")
        || lowered.contains("could not find node")
        || lowered.contains("node not found")
        || lowered.contains("detached")
}

fn quote_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
