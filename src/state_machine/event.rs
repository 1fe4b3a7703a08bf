//! Events that drive the purchase workflow

use serde::de::IgnoredAny;
use serde::Deserialize;

/// Events that trigger workflow transitions
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseEvent {
    // User events
    /// "Buy Now" at the given per-share price
    Buy { unit_price: f64 },
    EditQuantity { input: QuantityInput },
    Confirm,

    // Timer events
    ProgressTick { run: u64 },
}

/// Raw value from the quantity field, before coercion
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
    #[default]
    Missing,
    /// Booleans, arrays, objects
    #[allow(dead_code)] // Content is discarded
    Other(IgnoredAny),
}

impl QuantityInput {
    /// Coerce to a positive quantity. Anything that is not an integer >= 1
    /// becomes 1; integer prefixes are honored ("12abc" is 12, "7.9" is 7).
    pub fn coerce(&self) -> u32 {
        match self {
            QuantityInput::Number(n) => coerce_number(*n),
            QuantityInput::Text(text) => parse_quantity(text),
            QuantityInput::Missing | QuantityInput::Other(_) => 1,
        }
    }
}

impl From<i64> for QuantityInput {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        QuantityInput::Number(value as f64)
    }
}

impl From<&str> for QuantityInput {
    fn from(value: &str) -> Self {
        QuantityInput::Text(value.to_string())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_number(n: f64) -> u32 {
    if !n.is_finite() {
        return 1;
    }
    let whole = n.trunc();
    if whole < 1.0 {
        1
    } else if whole >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        whole as u32
    }
}

/// Parse the leading integer of `text`, saturating at `u32::MAX`
fn parse_quantity(text: &str) -> u32 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or("")),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or("")),
        _ => (false, trimmed),
    };

    let mut value: u32 = 0;
    let mut seen_digit = false;
    for digit in rest.chars().map_while(|c| c.to_digit(10)) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !seen_digit || negative || value == 0 {
        1
    } else {
        value
    }
}
