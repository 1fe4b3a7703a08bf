//! Purchase workflow state types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Step of the simulated purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PurchasePhase {
    /// No purchase has been started this session
    #[default]
    Idle,
    /// Quantity form is open
    AwaitingQuantity,
    /// Progress simulation running
    Processing,
    /// Simulation finished; stays here until the next "Buy"
    Completed,
}

/// Session-wide purchase workflow state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseState {
    pub phase: PurchasePhase,
    /// Per-share price copied from the exchange that started the purchase
    pub unit_price: f64,
    /// Always >= 1
    pub quantity: u32,
    /// 0..=100
    pub progress_percent: u8,
    /// Identifies the current progress run. Ticks carrying any other run are stale.
    pub run: u64,
    /// Quantity captured when the run completed
    pub confirmed_quantity: Option<u32>,
}

impl Default for PurchaseState {
    fn default() -> Self {
        Self {
            phase: PurchasePhase::Idle,
            unit_price: 0.0,
            quantity: 1,
            progress_percent: 0,
            run: 0,
            confirmed_quantity: None,
        }
    }
}

impl PurchaseState {
    /// `quantity * unit_price`
    pub fn total_cost(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    pub fn is_form_open(&self) -> bool {
        self.phase == PurchasePhase::AwaitingQuantity
    }

    /// Whether the progress ticker should be running
    #[allow(dead_code)] // State query utility
    pub fn is_processing(&self) -> bool {
        self.phase == PurchasePhase::Processing
    }
}

/// Default cadence of the progress simulation
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);
/// Default percent added per tick
pub const DEFAULT_PROGRESS_STEP: u8 = 10;

/// Context for the workflow (immutable configuration)
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub tick_interval: Duration,
    /// Percent per tick, 1..=100
    pub progress_step: u8,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

impl WorkflowContext {
    pub fn new(tick_interval: Duration, progress_step: u8) -> Self {
        Self {
            tick_interval,
            progress_step: progress_step.clamp(1, 100),
        }
    }
}
