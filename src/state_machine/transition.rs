//! Pure state transition function

use super::{Effect, PurchaseEvent, PurchasePhase, PurchaseState, WorkflowContext};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: PurchaseState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: PurchaseState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("No purchase form is open")]
    FormClosed,
    #[error("Stale progress tick for run {run}")]
    StaleTick { run: u64 },
}

impl TransitionError {
    /// Stale ticks are an artifact of cancellation, not something a user did
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, TransitionError::StaleTick { .. })
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; timers and
/// client notifications are requested through effects.
pub fn transition(
    state: &PurchaseState,
    context: &WorkflowContext,
    event: PurchaseEvent,
) -> Result<TransitionResult, TransitionError> {
    let event = match event {
        PurchaseEvent::Buy { unit_price } => PurchaseEvent::Buy {
            unit_price: sanitize_price(unit_price),
        },
        other => other,
    };

    match (state.phase, event) {
        // ============================================================
        // Buy
        // ============================================================
        // Idle + Buy -> AwaitingQuantity (first entry, quantity starts at 1)
        (PurchasePhase::Idle, PurchaseEvent::Buy { unit_price }) => {
            Ok(TransitionResult::new(PurchaseState {
                phase: PurchasePhase::AwaitingQuantity,
                unit_price,
                quantity: 1,
                progress_percent: 0,
                run: state.run,
                confirmed_quantity: None,
            })
            .with_effect(Effect::PublishState))
        }

        // AwaitingQuantity + Buy -> AwaitingQuantity (new price, quantity kept)
        (PurchasePhase::AwaitingQuantity, PurchaseEvent::Buy { unit_price }) => {
            Ok(TransitionResult::new(PurchaseState {
                unit_price,
                ..state.clone()
            })
            .with_effect(Effect::PublishState))
        }

        // Processing/Completed + Buy -> AwaitingQuantity, ticker cancelled first
        (
            PurchasePhase::Processing | PurchasePhase::Completed,
            PurchaseEvent::Buy { unit_price },
        ) => Ok(TransitionResult::new(PurchaseState {
            phase: PurchasePhase::AwaitingQuantity,
            unit_price,
            quantity: state.quantity,
            progress_percent: 0,
            run: state.run,
            confirmed_quantity: None,
        })
        .with_effect(Effect::CancelProgress)
        .with_effect(Effect::PublishState)),

        // ============================================================
        // Quantity form
        // ============================================================
        (PurchasePhase::AwaitingQuantity, PurchaseEvent::EditQuantity { input }) => {
            Ok(TransitionResult::new(PurchaseState {
                quantity: input.coerce(),
                ..state.clone()
            })
            .with_effect(Effect::PublishState))
        }

        // AwaitingQuantity + Confirm -> Processing (form closes, new run starts at 0)
        (PurchasePhase::AwaitingQuantity, PurchaseEvent::Confirm) => {
            let run = state.run + 1;
            Ok(TransitionResult::new(PurchaseState {
                phase: PurchasePhase::Processing,
                progress_percent: 0,
                run,
                confirmed_quantity: None,
                ..state.clone()
            })
            .with_effect(Effect::start_progress(run, context.tick_interval))
            .with_effect(Effect::PublishState))
        }

        (_, PurchaseEvent::EditQuantity { .. } | PurchaseEvent::Confirm) => {
            Err(TransitionError::FormClosed)
        }

        // ============================================================
        // Progress simulation
        // ============================================================
        (PurchasePhase::Processing, PurchaseEvent::ProgressTick { run }) if run == state.run => {
            let progress_percent = state
                .progress_percent
                .saturating_add(context.progress_step)
                .min(100);

            if progress_percent < 100 {
                return Ok(TransitionResult::new(PurchaseState {
                    progress_percent,
                    ..state.clone()
                })
                .with_effect(Effect::PublishState));
            }

            // Reaching 100 stops the ticker and freezes the confirmed quantity
            Ok(TransitionResult::new(PurchaseState {
                phase: PurchasePhase::Completed,
                progress_percent,
                confirmed_quantity: Some(state.quantity),
                ..state.clone()
            })
            .with_effect(Effect::CancelProgress)
            .with_effect(Effect::PublishState)
            .with_effect(Effect::announce_completion(state.quantity)))
        }

        (_, PurchaseEvent::ProgressTick { run }) => Err(TransitionError::StaleTick { run }),
    }
}

/// Negative and non-finite prices become 0
fn sanitize_price(unit_price: f64) -> f64 {
    if unit_price.is_finite() && unit_price > 0.0 {
        unit_price
    } else {
        0.0
    }
}
