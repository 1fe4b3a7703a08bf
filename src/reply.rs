//! Reply synthesis
//!
//! Turns a classified intent into a reply payload. Payload construction has no
//! side effects; appending to the conversation log is the caller's job.

use crate::conversation::plan::PLAN_OPTIONS;
use crate::intent::Intent;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const BALANCE_REPLY: &str = "Your account balance is $4100";
pub const STOCK_REPLY: &str = "Below is the chart of Tesla stock price over the last month";
pub const PLAN_LIST_INTRO: &str = "Here are some of the 529 Plans you could invest in:";
pub const PLAN_LIST_OUTRO: &str = "Click on each plan to know more.";
pub const FALLBACK_REPLY: &str = "I'm sorry, I don't understand that query. \
Try asking about your balance, stock prices, or 529 plans.";

/// Per-share price offered for purchase after a stock reply
pub const STOCK_REFERENCE_PRICE: f64 = 250.0;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Synthetic prices are drawn from `[PRICE_MIN, PRICE_MAX)`
pub const PRICE_MIN: u32 = 50;
pub const PRICE_MAX: u32 = 250;

/// One labeled point of a price series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub value: u32,
}

/// Reply body shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyContent {
    Text {
        text: String,
    },
    /// A list of named options the user can select
    OptionList {
        intro: String,
        options: Vec<String>,
        outro: String,
    },
}

impl ReplyContent {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyContent::Text { text: text.into() }
    }

    /// Plain text of the reply, if it is a text reply
    #[allow(dead_code)] // Used by conversation and runtime tests
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyContent::Text { text } => Some(text),
            ReplyContent::OptionList { .. } => None,
        }
    }

    /// Offered option names (empty for text replies)
    #[allow(dead_code)] // Used by presentation tests
    pub fn options(&self) -> &[String] {
        match self {
            ReplyContent::Text { .. } => &[],
            ReplyContent::OptionList { options, .. } => options,
        }
    }
}

/// Everything a reply carries before it becomes an exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyPayload {
    pub content: ReplyContent,
    pub time_series: Option<Vec<PricePoint>>,
    pub reference_price: Option<f64>,
}

impl ReplyPayload {
    fn text(text: &str) -> Self {
        Self {
            content: ReplyContent::text(text),
            time_series: None,
            reference_price: None,
        }
    }
}

/// Build the reply for an intent.
///
/// `_raw_input` is accepted so replies can quote the utterance; none of the
/// current intents do.
pub fn synthesize<R: Rng + ?Sized>(intent: Intent, _raw_input: &str, rng: &mut R) -> ReplyPayload {
    match intent {
        Intent::Balance => ReplyPayload::text(BALANCE_REPLY),
        Intent::Stock => ReplyPayload {
            content: ReplyContent::text(STOCK_REPLY),
            time_series: Some(generate_price_series(rng)),
            reference_price: Some(STOCK_REFERENCE_PRICE),
        },
        Intent::PlanInquiry => ReplyPayload {
            content: ReplyContent::OptionList {
                intro: PLAN_LIST_INTRO.to_string(),
                options: PLAN_OPTIONS.iter().map(|p| p.name.to_string()).collect(),
                outro: PLAN_LIST_OUTRO.to_string(),
            },
            time_series: None,
            reference_price: None,
        },
        Intent::Unknown => ReplyPayload::text(FALLBACK_REPLY),
    }
}

/// Twelve monthly points, Jan..Dec, each uniformly drawn from `[50, 250)`
pub fn generate_price_series<R: Rng + ?Sized>(rng: &mut R) -> Vec<PricePoint> {
    MONTH_LABELS
        .iter()
        .map(|month| PricePoint {
            label: (*month).to_string(),
            value: rng.gen_range(PRICE_MIN..PRICE_MAX),
        })
        .collect()
}
