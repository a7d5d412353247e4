//! Outcome classification
//!
//! Post-action page state rarely says outright whether an action worked, so
//! classification is heuristic: an ordered list of success signals is checked
//! first (first satisfied signal wins), then an ordered list of error
//! keywords is scanned case-insensitively over the visible text. Neither
//! matching means [`Outcome::Uncertain`] — deliberately distinct from
//! failure, since collapsing the two produces false negatives on noisy UIs.
//!
//! [`classify`] is total and pure: it never fails and always returns the same
//! classification for the same snapshot.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::snapshot::PageSnapshot;

/// A typed success signal, checked against a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SuccessSignal {
    /// The page URL contains the substring
    UrlContains(String),
    /// The visible text contains the marker (case-insensitive)
    TextContains(String),
    /// The markup contains an element matching the CSS selector
    ElementPresent(String),
}

impl SuccessSignal {
    /// Human-readable form for diagnostics
    pub fn describe(&self) -> String {
        match self {
            SuccessSignal::UrlContains(s) => format!("url contains '{s}'"),
            SuccessSignal::TextContains(s) => format!("text contains '{s}'"),
            SuccessSignal::ElementPresent(s) => format!("element '{s}' present"),
        }
    }

    fn satisfied_by(&self, snapshot: &PageSnapshot) -> bool {
        match self {
            SuccessSignal::UrlContains(needle) => snapshot.url.contains(needle.as_str()),
            SuccessSignal::TextContains(needle) => snapshot
                .text
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            SuccessSignal::ElementPresent(selector) => match Selector::parse(selector) {
                // An unparseable selector matches nothing; classification stays total.
                Err(_) => false,
                Ok(selector) => Html::parse_document(&snapshot.markup)
                    .select(&selector)
                    .next()
                    .is_some(),
            },
        }
    }
}

/// The ordered signal lists one classification consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Success signals, checked in order; first satisfied wins
    pub success: Vec<SuccessSignal>,
    /// Error keywords, scanned case-insensitively over visible text
    pub error_keywords: Vec<String>,
}

impl SignalSet {
    /// Create a signal set
    pub fn new(success: Vec<SuccessSignal>, error_keywords: Vec<&str>) -> Self {
        Self {
            success,
            error_keywords: error_keywords.into_iter().map(String::from).collect(),
        }
    }
}

/// Three-way classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A success signal was satisfied
    Success,
    /// An error keyword matched the visible text
    Failure,
    /// Not disproven; execution may continue but the run is flagged for review
    Uncertain,
}

/// Result of classifying one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Three-way outcome
    pub outcome: Outcome,
    /// The first satisfied success signal, when the outcome is Success
    pub matched_signal: Option<String>,
    /// Every error keyword that matched, in list order
    pub matched_keywords: Vec<String>,
    /// Issue id pulled from the URL query, when one is present
    pub extracted_id: Option<String>,
}

/// Classify a snapshot against ordered success signals and error keywords
pub fn classify(snapshot: &PageSnapshot, signals: &SignalSet) -> Classification {
    for signal in &signals.success {
        if signal.satisfied_by(snapshot) {
            return Classification {
                outcome: Outcome::Success,
                matched_signal: Some(signal.describe()),
                matched_keywords: Vec::new(),
                extracted_id: extract_issue_id(&snapshot.url),
            };
        }
    }

    let haystack = snapshot.text.to_lowercase();
    let matched_keywords: Vec<String> = signals
        .error_keywords
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .cloned()
        .collect();

    if !matched_keywords.is_empty() {
        return Classification {
            outcome: Outcome::Failure,
            matched_signal: None,
            matched_keywords,
            extracted_id: None,
        };
    }

    Classification {
        outcome: Outcome::Uncertain,
        matched_signal: None,
        matched_keywords: Vec::new(),
        extracted_id: None,
    }
}

/// Pull an `id` query parameter out of a URL
///
/// Issue submission redirects to `view.php?id=N`; the id is worth keeping for
/// the report. Falls back to a raw scan when the URL does not parse.
pub fn extract_issue_id(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "id") {
            if !id.is_empty() {
                return Some(id.into_owned());
            }
        }
        return None;
    }

    Regex::new(r"[?&]id=(\d+)")
        .ok()?
        .captures(url)
        .map(|c| c[1].to_string())
}
