//! Locator resolution
//!
//! A [`LocatorSpec`] is an ordered list of candidate (strategy, query) pairs
//! with an optional discriminator predicate. [`resolve`] tries candidates
//! strictly in declared order and stops at the first accepted match; running
//! out of candidates is a normal [`Resolution::NotFound`] value, never an
//! error, and carries the full attempt inventory for diagnostics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{UiDriver, UiElement};
use crate::error::DriverError;

/// Element location strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// CSS selector
    Css,
    /// Element id attribute
    Id,
    /// Element name attribute
    Name,
    /// Tag name
    TagName,
    /// Anchor with exact visible text
    LinkText,
    /// Anchor whose visible text contains the query
    PartialLinkText,
    /// XPath expression
    XPath,
}

impl Strategy {
    /// Strategy name as used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::TagName => "tag",
            Strategy::LinkText => "link-text",
            Strategy::PartialLinkText => "partial-link-text",
            Strategy::XPath => "xpath",
        }
    }
}

/// One (strategy, query) alternative inside a [`LocatorSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Location strategy
    pub strategy: Strategy,
    /// Strategy-specific query string
    pub query: String,
}

impl Candidate {
    /// Create a candidate
    pub fn new(strategy: Strategy, query: impl Into<String>) -> Self {
        Self {
            strategy,
            query: query.into(),
        }
    }
}

/// Predicate narrowing a candidate's matches
///
/// Applied after the visibility/enabled filter; the first element satisfying
/// it wins. Text comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Discriminator {
    /// Visible text contains the needle
    TextContains(String),
    /// Trimmed visible text matches the regex; an invalid pattern matches nothing
    TextMatches(String),
    /// Trimmed visible text is non-empty and none of the listed values
    TextNotIn(Vec<String>),
    /// Attribute value contains the needle
    AttributeContains {
        /// Attribute name
        name: String,
        /// Needle to look for in the attribute value
        value: String,
    },
}

impl Discriminator {
    /// Human-readable form for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Discriminator::TextContains(s) => format!("text contains '{s}'"),
            Discriminator::TextMatches(p) => format!("text matches /{p}/"),
            Discriminator::TextNotIn(set) => format!("text not in {set:?}"),
            Discriminator::AttributeContains { name, value } => {
                format!("attribute '{name}' contains '{value}'")
            }
        }
    }

    async fn accepts(&self, element: &dyn UiElement) -> Result<bool, DriverError> {
        match self {
            Discriminator::TextContains(needle) => {
                let text = element.text().await?.to_lowercase();
                Ok(text.contains(&needle.to_lowercase()))
            }
            Discriminator::TextMatches(pattern) => {
                let text = element.text().await?;
                match Regex::new(pattern) {
                    Ok(re) => Ok(re.is_match(text.trim())),
                    Err(_) => Ok(false),
                }
            }
            Discriminator::TextNotIn(excluded) => {
                let text = element.text().await?.trim().to_lowercase();
                Ok(!text.is_empty() && !excluded.iter().any(|e| e.to_lowercase() == text))
            }
            Discriminator::AttributeContains { name, value } => {
                let attr = element.attribute(name).await?;
                Ok(attr
                    .map(|v| v.to_lowercase().contains(&value.to_lowercase()))
                    .unwrap_or(false))
            }
        }
    }
}

/// Ordered list of locator alternatives for one logical UI element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorSpec {
    /// What this locator points at, for logs and diagnostics
    pub description: String,
    /// Alternatives, tried strictly in order
    pub candidates: Vec<Candidate>,
    /// Optional predicate every accepted match must satisfy
    pub discriminator: Option<Discriminator>,
}

impl LocatorSpec {
    /// Create a spec from ordered candidates
    pub fn new(description: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            description: description.into(),
            candidates,
            discriminator: None,
        }
    }

    /// Attach a discriminator predicate
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }
}

/// How strict the element filter is during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Any attached element counts
    Present,
    /// Element must be visible
    Visible,
    /// Element must be visible and enabled
    Interactable,
}

/// Record of one candidate that failed to produce an accepted match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAttempt {
    /// Strategy tried
    pub strategy: Strategy,
    /// Query tried
    pub query: String,
    /// Raw elements the strategy returned
    pub matches: usize,
    /// Elements rejected by the filter or discriminator
    pub rejected: usize,
}

/// Result of resolving a [`LocatorSpec`]
pub enum Resolution {
    /// An element was accepted
    Found {
        /// The live element handle
        element: Box<dyn UiElement>,
        /// Index of the winning candidate
        candidate: usize,
    },
    /// Every candidate was exhausted
    NotFound {
        /// Per-candidate inventory, in declared order
        attempted: Vec<CandidateAttempt>,
    },
}

impl Resolution {
    /// Whether an element was found
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }
}

/// Resolve a spec with the standard visible-and-enabled filter
pub async fn resolve(
    driver: &dyn UiDriver,
    spec: &LocatorSpec,
) -> Result<Resolution, DriverError> {
    resolve_with(driver, spec, MatchMode::Interactable).await
}

/// Resolve a spec with an explicit match mode
///
/// Candidates are evaluated strictly in order; once one yields an accepted
/// element, later candidates are never queried.
pub async fn resolve_with(
    driver: &dyn UiDriver,
    spec: &LocatorSpec,
    mode: MatchMode,
) -> Result<Resolution, DriverError> {
    let mut attempted = Vec::with_capacity(spec.candidates.len());

    for (index, candidate) in spec.candidates.iter().enumerate() {
        let found = driver.find_all(candidate.strategy, &candidate.query).await?;
        let matches = found.len();
        let mut rejected = 0usize;

        for element in found {
            if !passes_filter(element.as_ref(), mode).await? {
                rejected += 1;
                continue;
            }
            if let Some(discriminator) = &spec.discriminator {
                if !discriminator.accepts(element.as_ref()).await? {
                    rejected += 1;
                    continue;
                }
            }
            debug!(
                locator = %spec.description,
                strategy = candidate.strategy.name(),
                query = %candidate.query,
                candidate = index,
                "locator resolved"
            );
            return Ok(Resolution::Found {
                element,
                candidate: index,
            });
        }

        attempted.push(CandidateAttempt {
            strategy: candidate.strategy,
            query: candidate.query.clone(),
            matches,
            rejected,
        });
    }

    debug!(locator = %spec.description, "locator exhausted all candidates");
    Ok(Resolution::NotFound { attempted })
}

async fn passes_filter(element: &dyn UiElement, mode: MatchMode) -> Result<bool, DriverError> {
    match mode {
        MatchMode::Present => Ok(true),
        MatchMode::Visible => element.is_visible().await,
        MatchMode::Interactable => {
            Ok(element.is_visible().await? && element.is_enabled().await?)
        }
    }
}
