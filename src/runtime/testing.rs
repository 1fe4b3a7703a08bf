//! Test harness for session runtimes
//!
//! Seeded randomness and configurable tick cadence so integration tests are
//! reproducible.

use super::{spawn_with_rng, SessionEvent, SessionHandle, SseEvent};
use crate::state_machine::WorkflowContext;
use crate::view::SessionView;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Builder for a session runtime under test
pub struct TestSession {
    seed: u64,
    context: WorkflowContext,
}

impl TestSession {
    pub fn new() -> Self {
        Self {
            seed: 1,
            context: WorkflowContext::default(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.context = WorkflowContext::new(interval, self.context.progress_step);
        self
    }

    pub fn build(self) -> SessionHandle {
        spawn_with_rng(self.context, StdRng::seed_from_u64(self.seed))
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until the published view satisfies `pred`
pub async fn wait_for_view<F>(handle: &SessionHandle, timeout: Duration, pred: F) -> bool
where
    F: Fn(&SessionView) -> bool,
{
    let mut rx = handle.watch();
    tokio::time::timeout(timeout, async move {
        loop {
            if pred(&*rx.borrow_and_update()) {
                return true;
            }
            if rx.changed().await.is_err() {
                return false;
            }
        }
    })
    .await
    .unwrap_or(false)
}

/// Drain everything currently buffered on a subscription
pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<SseEvent>) -> Vec<SseEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Convenience wrappers
impl SessionHandle {
    pub async fn say(&self, text: &str) -> SessionView {
        self.dispatch(SessionEvent::UserMessage {
            text: text.to_string(),
        })
        .await
        .expect("user message")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{BALANCE_REPLY, STOCK_REFERENCE_PRICE};
    use crate::runtime::RuntimeError;
    use crate::state_machine::{PurchasePhase, QuantityInput, TransitionError};

    const TICK: Duration = Duration::from_millis(200);

    async fn open_form(handle: &SessionHandle) -> SessionView {
        let view = handle.say("show me stock info").await;
        let stock_id = view.exchanges.last().unwrap().id;
        handle
            .dispatch(SessionEvent::BuyExchange {
                exchange_id: stock_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_conversation() {
        let handle = TestSession::new().build();

        let view = handle.say("What's my balance?").await;
        assert_eq!(view.exchanges.len(), 1);
        assert_eq!(view.exchanges[0].reply.as_text(), Some(BALANCE_REPLY));
        assert!(view.exchanges[0].time_series.is_none());

        let view = handle.say("show me stock info").await;
        let stock = &view.exchanges[1];
        let series = stock.time_series.as_ref().unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].label, "Jan");
        assert_eq!(series[11].label, "Dec");
        assert_eq!(stock.reference_price, Some(STOCK_REFERENCE_PRICE));

        handle.say("what about 529 plans?").await;
        let view = handle
            .dispatch(SessionEvent::SelectOption {
                option: "Utah's my529 Plan".to_string(),
            })
            .await
            .unwrap();
        let detail = view.exchanges[2].plan_detail.as_ref().unwrap();
        assert_eq!(detail.plan, "Utah's my529 Plan");
        assert_eq!(detail.bullets[1], "Variety of investment choices.");
        assert!(view.exchanges[1].plan_detail.is_none());
    }

    #[tokio::test]
    async fn test_same_seed_same_series() {
        let a = TestSession::new().seed(9).build().say("stock").await;
        let b = TestSession::new().seed(9).build().say("stock").await;
        assert_eq!(a.exchanges[0].time_series, b.exchanges[0].time_series);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let handle = TestSession::new().build();
        let mut rx = handle.subscribe();
        let view = handle.say("   ").await;
        assert!(view.exchanges.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_select_option_on_empty_log_is_noop() {
        let handle = TestSession::new().build();
        let view = handle
            .dispatch(SessionEvent::SelectOption {
                option: "Utah's my529 Plan".to_string(),
            })
            .await
            .unwrap();
        assert!(view.exchanges.is_empty());
    }

    #[tokio::test]
    async fn test_buy_on_unknown_or_unpriced_exchange() {
        let handle = TestSession::new().build();
        let view = handle.say("balance").await;
        let balance_id = view.exchanges[0].id;

        let err = handle
            .dispatch(SessionEvent::BuyExchange {
                exchange_id: balance_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NotPurchasable(id) if id == balance_id));

        let missing = crate::conversation::ExchangeId::new(1);
        let err = handle
            .dispatch(SessionEvent::BuyExchange { exchange_id: missing })
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ExchangeNotFound(_)));
        assert_eq!(handle.view().purchase.phase, PurchasePhase::Idle);
    }

    #[tokio::test]
    async fn test_quantity_edits_and_total() {
        let handle = TestSession::new().build();
        let view = open_form(&handle).await;
        assert_eq!(view.purchase.phase, PurchasePhase::AwaitingQuantity);
        assert_eq!(view.purchase.quantity, 1);
        assert_eq!(view.purchase.total_cost.as_deref(), Some("250.00"));

        for (input, expected) in [
            (QuantityInput::from(-5), 1),
            (QuantityInput::from(0), 1),
            (QuantityInput::from(7), 7),
            (QuantityInput::from("abc"), 1),
            (QuantityInput::from(3), 3),
        ] {
            let view = handle
                .dispatch(SessionEvent::EditQuantity { input })
                .await
                .unwrap();
            assert_eq!(view.purchase.quantity, expected);
        }
        assert_eq!(handle.view().purchase.total_cost.as_deref(), Some("750.00"));

        // re-entering Buy keeps the edited quantity, takes the new price
        let view = handle
            .dispatch(SessionEvent::StartPurchase { unit_price: 100.0 })
            .await
            .unwrap();
        assert_eq!(view.purchase.quantity, 3);
        assert_eq!(view.purchase.total_cost.as_deref(), Some("300.00"));
    }

    #[tokio::test]
    async fn test_edit_with_closed_form_reports_error() {
        let handle = TestSession::new().build();
        let mut rx = handle.subscribe();

        let err = handle
            .dispatch(SessionEvent::EditQuantity {
                input: QuantityInput::from(4),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Transition(TransitionError::FormClosed)
        ));
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, SseEvent::Error { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_runs_to_completion() {
        let handle = TestSession::new().tick_interval(TICK).build();
        open_form(&handle).await;
        handle
            .dispatch(SessionEvent::EditQuantity {
                input: QuantityInput::from(3),
            })
            .await
            .unwrap();

        let mut rx = handle.subscribe();
        let view = handle.dispatch(SessionEvent::ConfirmPurchase).await.unwrap();
        assert_eq!(view.purchase.phase, PurchasePhase::Processing);
        assert_eq!(view.purchase.progress_percent, 0);
        assert!(!view.purchase.form_open);

        assert!(
            wait_for_view(&handle, TICK * 20, |v| v.purchase.phase == PurchasePhase::Completed)
                .await
        );

        // give a stray 11th tick every chance to fire
        tokio::time::sleep(TICK * 5).await;

        let view = handle.view();
        assert_eq!(view.purchase.progress_percent, 100);
        assert_eq!(
            view.purchase.confirmation.as_deref(),
            Some("Congratulations! You just bought 3 shares of Tesla")
        );

        let events = drain(&mut rx);
        let purchase_updates = events
            .iter()
            .filter(|e| matches!(e, SseEvent::Purchase { .. }))
            .count();
        let completions = events
            .iter()
            .filter(|e| matches!(e, SseEvent::PurchaseCompleted { .. }))
            .count();
        // confirm + 10 ticks
        assert_eq!(purchase_updates, 11);
        assert_eq!(completions, 1);
        assert!(!events.iter().any(|e| matches!(e, SseEvent::Error { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_mid_processing_cancels_ticker() {
        let handle = TestSession::new().tick_interval(TICK).build();
        open_form(&handle).await;
        handle.dispatch(SessionEvent::ConfirmPurchase).await.unwrap();

        tokio::time::sleep(TICK * 4 + TICK / 2).await;
        assert_eq!(handle.view().purchase.progress_percent, 40);

        let view = handle
            .dispatch(SessionEvent::StartPurchase { unit_price: 250.0 })
            .await
            .unwrap();
        assert_eq!(view.purchase.phase, PurchasePhase::AwaitingQuantity);
        assert_eq!(view.purchase.progress_percent, 0);

        tokio::time::sleep(TICK * 20).await;
        let view = handle.view();
        assert_eq!(view.purchase.phase, PurchasePhase::AwaitingQuantity);
        assert_eq!(view.purchase.progress_percent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfirm_starts_fresh_run() {
        let handle = TestSession::new().tick_interval(TICK).build();
        open_form(&handle).await;
        handle.dispatch(SessionEvent::ConfirmPurchase).await.unwrap();
        tokio::time::sleep(TICK * 3 + TICK / 2).await;

        handle
            .dispatch(SessionEvent::StartPurchase { unit_price: 250.0 })
            .await
            .unwrap();
        handle.dispatch(SessionEvent::ConfirmPurchase).await.unwrap();

        tokio::time::sleep(TICK * 2 + TICK / 2).await;
        assert_eq!(handle.view().purchase.progress_percent, 20);

        assert!(
            wait_for_view(&handle, TICK * 20, |v| v.purchase.phase == PurchasePhase::Completed)
                .await
        );
    }

    #[tokio::test]
    async fn test_stale_tick_dropped_quietly() {
        let handle = TestSession::new().build();
        let mut rx = handle.subscribe();

        handle
            .send(SessionEvent::ProgressTick { run: 7 })
            .await
            .unwrap();
        // round-trip a second event so the tick has been processed
        handle.say("hello").await;

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, SseEvent::Error { .. })));
        assert_eq!(handle.view().purchase.phase, PurchasePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_after_completion_keeps_confirmation() {
        let handle = TestSession::new().tick_interval(TICK).build();
        open_form(&handle).await;
        handle
            .dispatch(SessionEvent::EditQuantity {
                input: QuantityInput::from(2),
            })
            .await
            .unwrap();
        handle.dispatch(SessionEvent::ConfirmPurchase).await.unwrap();
        assert!(
            wait_for_view(&handle, TICK * 20, |v| v.purchase.phase == PurchasePhase::Completed)
                .await
        );

        let result = handle
            .dispatch(SessionEvent::EditQuantity {
                input: QuantityInput::from(50),
            })
            .await;
        assert!(result.is_err());
        assert_eq!(
            handle.view().purchase.confirmation.as_deref(),
            Some("Congratulations! You just bought 2 shares of Tesla")
        );
    }
}
