//! Presentation snapshot
//!
//! What the presentation layer re-renders from: the full log plus the
//! purchase workflow with its display strings precomputed.

use crate::conversation::{ConversationLog, Exchange};
use crate::state_machine::{PurchasePhase, PurchaseState};
use serde::Serialize;

/// Labels for rendering a price series as a line chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

pub const PRICE_CHART: ChartSpec = ChartSpec {
    title: "Stock Price Over Time",
    x_label: "Month",
    y_label: "Price ($)",
};

/// Purchase workflow as the UI shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseView {
    pub phase: PurchasePhase,
    pub unit_price: f64,
    pub quantity: u32,
    pub progress_percent: u8,
    pub form_open: bool,
    pub processing: bool,
    /// Unit price, 2 decimals
    pub price_display: String,
    /// `quantity * unit_price`, 2 decimals; only while the form is open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
}

impl From<&PurchaseState> for PurchaseView {
    fn from(state: &PurchaseState) -> Self {
        Self {
            phase: state.phase,
            unit_price: state.unit_price,
            quantity: state.quantity,
            progress_percent: state.progress_percent,
            form_open: state.is_form_open(),
            // the progress bar stays visible once a run completes
            processing: matches!(
                state.phase,
                PurchasePhase::Processing | PurchasePhase::Completed
            ),
            price_display: format_currency(state.unit_price),
            total_cost: state
                .is_form_open()
                .then(|| format_currency(state.total_cost())),
            confirmation: state.confirmed_quantity.map(confirmation_message),
        }
    }
}

/// Everything the presentation layer needs to re-render the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub exchanges: Vec<Exchange>,
    pub purchase: PurchaseView,
    pub chart: ChartSpec,
}

impl SessionView {
    pub fn build(log: &ConversationLog, purchase: &PurchaseState) -> Self {
        Self {
            exchanges: log.exchanges().to_vec(),
            purchase: PurchaseView::from(purchase),
            chart: PRICE_CHART,
        }
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::build(&ConversationLog::new(), &PurchaseState::default())
    }
}

/// Standard 2-decimal currency rendering, no symbol
pub fn format_currency(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn confirmation_message(quantity: u32) -> String {
    format!("Congratulations! You just bought {quantity} shares of Tesla")
}
