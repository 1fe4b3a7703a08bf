//! Exchange types

use super::plan::PlanDetail;
use crate::reply::{PricePoint, ReplyContent, ReplyPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Creation-time token identifying an exchange (Unix milliseconds, strictly
/// increasing within a log)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(i64);

impl ExchangeId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[allow(dead_code)] // API completeness
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExchangeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// One user utterance and its reply, plus attachments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub id: ExchangeId,
    /// Trimmed, case-folded copy of the input
    pub user_text: String,
    pub reply: ReplyContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<Vec<PricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_detail: Option<PlanDetail>,
}

impl Exchange {
    pub fn new(id: ExchangeId, user_text: String, payload: ReplyPayload) -> Self {
        // reference price only travels with a series
        let reference_price = payload
            .time_series
            .as_ref()
            .and(payload.reference_price);
        Self {
            id,
            user_text,
            reply: payload.content,
            time_series: payload.time_series,
            reference_price,
            plan_detail: None,
        }
    }

    /// Whether a "Buy" action can be started from this exchange
    pub fn is_purchasable(&self) -> bool {
        self.reference_price.is_some()
    }
}
