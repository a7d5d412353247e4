//! Scripted mock driver for integration tests
//!
//! Pages are plain data: a URL, text/markup, and a table of elements keyed by
//! (strategy, query). Clicking an element can move the driver to another
//! registered page, which is enough to walk every workflow end to end without
//! a browser. Every `find_all` call is logged so tests can assert which
//! candidates were actually evaluated.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use trackpilot::artifact::{ArtifactKind, ArtifactRef};
use trackpilot::driver::{UiDriver, UiElement};
use trackpilot::error::DriverError;
use trackpilot::locator::Strategy;

/// One scripted element
#[derive(Clone, Default)]
pub struct ElementSpec {
    pub text: String,
    pub visible: bool,
    pub enabled: bool,
    pub attributes: HashMap<String, String>,
    /// Page (by URL) the driver moves to when this element is clicked
    pub click_goto: Option<String>,
    /// Remaining clicks that fail as stale before interactions succeed
    pub reject_clicks: Option<Arc<AtomicUsize>>,
}

impl ElementSpec {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            visible: true,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn goto(mut self, url: &str) -> Self {
        self.click_goto = Some(url.to_string());
        self
    }

    pub fn rejecting_clicks(mut self, count: usize) -> Self {
        self.reject_clicks = Some(Arc::new(AtomicUsize::new(count)));
        self
    }
}

/// One scripted page
#[derive(Clone)]
pub struct PageSpec {
    pub url: String,
    pub title: String,
    pub text: String,
    pub markup: String,
    pub ready: bool,
    elements: Vec<(Strategy, String, Vec<ElementSpec>)>,
}

impl PageSpec {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            text: String::new(),
            markup: String::new(),
            ready: true,
            elements: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn markup(mut self, markup: &str) -> Self {
        self.markup = markup.to_string();
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn element(self, strategy: Strategy, query: &str, element: ElementSpec) -> Self {
        self.elements_for(strategy, query, vec![element])
    }

    pub fn elements_for(
        mut self,
        strategy: Strategy,
        query: &str,
        elements: Vec<ElementSpec>,
    ) -> Self {
        self.elements.push((strategy, query.to_string(), elements));
        self
    }
}

struct DriverState {
    pages: HashMap<String, PageSpec>,
    current: String,
    find_log: Vec<(Strategy, String)>,
    typed: Vec<(String, String)>,
    selected: Vec<(String, String)>,
    screenshots: usize,
}

/// Scripted [`UiDriver`] over a fixed set of pages
pub struct MockDriver {
    state: Arc<Mutex<DriverState>>,
}

impl MockDriver {
    pub fn new(pages: Vec<PageSpec>, start: &str) -> Self {
        let mut map = HashMap::new();
        for page in pages {
            map.insert(page.url.clone(), page);
        }
        assert!(map.contains_key(start), "start page '{start}' not registered");
        Self {
            state: Arc::new(Mutex::new(DriverState {
                pages: map,
                current: start.to_string(),
                find_log: Vec::new(),
                typed: Vec::new(),
                selected: Vec::new(),
                screenshots: 0,
            })),
        }
    }

    /// Every (strategy, query) passed to `find_all`, in call order
    pub fn find_log(&self) -> Vec<(Strategy, String)> {
        self.state.lock().unwrap().find_log.clone()
    }

    /// (element name-or-text, text) pairs recorded by `send_keys`
    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    /// (element name-or-text, option) pairs recorded by `select_option`
    pub fn selected(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().selected.clone()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state.lock().unwrap().screenshots
    }

    pub fn current_page(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }

    /// Handle for inspecting driver state after the driver moves into a session
    pub fn probe(&self) -> DriverProbe {
        DriverProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn page<T>(&self, read: impl FnOnce(&PageSpec) -> T) -> T {
        let state = self.state.lock().unwrap();
        let page = state
            .pages
            .get(&state.current)
            .expect("current page always registered");
        read(page)
    }
}

/// Shared view into a [`MockDriver`]'s recorded state
#[derive(Clone)]
pub struct DriverProbe {
    state: Arc<Mutex<DriverState>>,
}

impl DriverProbe {
    pub fn find_log(&self) -> Vec<(Strategy, String)> {
        self.state.lock().unwrap().find_log.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn selected(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().selected.clone()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state.lock().unwrap().screenshots
    }

    pub fn current_page(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if !state.pages.contains_key(url) {
            return Err(DriverError::Navigation(format!("no page scripted at {url}")));
        }
        state.current = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.page(|p| p.url.clone()))
    }

    async fn page_title(&self) -> Result<String, DriverError> {
        Ok(self.page(|p| p.title.clone()))
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        Ok(self.page(|p| p.text.clone()))
    }

    async fn page_markup(&self) -> Result<String, DriverError> {
        Ok(self.page(|p| p.markup.clone()))
    }

    async fn find_all(
        &self,
        strategy: Strategy,
        query: &str,
    ) -> Result<Vec<Box<dyn UiElement>>, DriverError> {
        let specs = {
            let mut state = self.state.lock().unwrap();
            state.find_log.push((strategy, query.to_string()));
            let page = state
                .pages
                .get(&state.current)
                .expect("current page always registered");
            page.elements
                .iter()
                .find(|(s, q, _)| *s == strategy && q == query)
                .map(|(_, _, specs)| specs.clone())
                .unwrap_or_default()
        };

        Ok(specs
            .into_iter()
            .map(|spec| {
                Box::new(MockElement {
                    spec,
                    state: Arc::clone(&self.state),
                }) as Box<dyn UiElement>
            })
            .collect())
    }

    async fn capture_screenshot(&self, label: &str) -> Result<ArtifactRef, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.screenshots += 1;
        Ok(ArtifactRef::new(ArtifactKind::Screenshot, label, None))
    }

    async fn evaluate_readiness(&self) -> Result<bool, DriverError> {
        Ok(self.page(|p| p.ready))
    }
}

struct MockElement {
    spec: ElementSpec,
    state: Arc<Mutex<DriverState>>,
}

impl MockElement {
    fn key(&self) -> String {
        self.spec
            .attributes
            .get("name")
            .cloned()
            .unwrap_or_else(|| self.spec.text.clone())
    }

    fn check_rejection(&self) -> Result<(), DriverError> {
        if let Some(remaining) = &self.spec.reject_clicks {
            let claimed = remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if claimed {
                return Err(DriverError::StaleElement(
                    "scripted stale interaction".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UiElement for MockElement {
    async fn is_visible(&self) -> Result<bool, DriverError> {
        Ok(self.spec.visible)
    }

    async fn is_enabled(&self) -> Result<bool, DriverError> {
        Ok(self.spec.enabled)
    }

    async fn text(&self) -> Result<String, DriverError> {
        Ok(self.spec.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.spec.attributes.get(name).cloned())
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.check_rejection()?;
        if let Some(url) = &self.spec.click_goto {
            let mut state = self.state.lock().unwrap();
            if state.pages.contains_key(url) {
                state.current = url.clone();
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.check_rejection()?;
        let key = self.key();
        self.state
            .lock()
            .unwrap()
            .typed
            .push((key, text.to_string()));
        Ok(())
    }

    async fn select_option(&self, visible_text: &str) -> Result<(), DriverError> {
        self.check_rejection()?;
        let key = self.key();
        self.state
            .lock()
            .unwrap()
            .selected
            .push((key, visible_text.to_string()));
        Ok(())
    }
}
