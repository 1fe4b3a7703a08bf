//! Intent classification
//!
//! Keyword substring matching over a normalized utterance. The first keyword
//! in priority order wins.

use serde::{Deserialize, Serialize};

/// The classified purpose of a user utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Balance,
    Stock,
    PlanInquiry,
    Unknown,
}

/// Keywords in priority order: balance > stock > 529
const KEYWORDS: &[(&str, Intent)] = &[
    ("balance", Intent::Balance),
    ("stock", Intent::Stock),
    ("529", Intent::PlanInquiry),
];

/// Trim and case-fold raw input
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Classify raw user input. Never fails; unmatched input is `Unknown`.
pub fn classify(raw: &str) -> Intent {
    let text = normalize(raw);
    KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map_or(Intent::Unknown, |(_, intent)| *intent)
}
