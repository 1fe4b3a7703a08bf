//! Session runtime executor

use super::{Command, RuntimeError, SessionEvent, SseEvent};
use crate::conversation::ConversationLog;
use crate::state_machine::{
    transition, Effect, PurchaseEvent, PurchaseState, WorkflowContext,
};
use crate::view::{confirmation_message, PurchaseView, SessionView};
use rand::Rng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Session runtime, generic over its random source
pub struct SessionRuntime<R>
where
    R: Rng + Send + 'static,
{
    context: WorkflowContext,
    log: ConversationLog,
    purchase: PurchaseState,
    rng: R,
    command_rx: mpsc::Receiver<Command>,
    /// Weak so the session stops once every handle is dropped
    command_tx: mpsc::WeakSender<Command>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    view_tx: watch::Sender<SessionView>,
    /// Token to stop the running progress ticker
    progress_cancel_token: Option<CancellationToken>,
}

impl<R> SessionRuntime<R>
where
    R: Rng + Send + 'static,
{
    pub fn new(
        context: WorkflowContext,
        rng: R,
        command_rx: mpsc::Receiver<Command>,
        command_tx: mpsc::WeakSender<Command>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            context,
            log: ConversationLog::new(),
            purchase: PurchaseState::default(),
            rng,
            command_rx,
            command_tx,
            broadcast_tx,
            view_tx,
            progress_cancel_token: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            tick_ms = u64::try_from(self.context.tick_interval.as_millis()).unwrap_or(u64::MAX),
            step = self.context.progress_step,
            "Starting session runtime"
        );

        // Process commands in a loop - one at a time
        while let Some(Command { event, reply }) = self.command_rx.recv().await {
            let result = self.process_event(event);

            if let Err(e) = &result {
                if e.is_user_facing() {
                    tracing::warn!(error = %e, "Rejected session event");
                    let _ = self.broadcast_tx.send(SseEvent::Error {
                        message: e.to_string(),
                    });
                } else {
                    tracing::debug!(error = %e, "Dropped session event");
                }
            }

            let view = SessionView::build(&self.log, &self.purchase);
            self.view_tx.send_replace(view.clone());

            if let Some(reply) = reply {
                let _ = reply.send(result.map(|()| view));
            }
        }

        if let Some(token) = self.progress_cancel_token.take() {
            token.cancel();
        }
        tracing::info!("Session runtime stopped");
    }

    fn process_event(&mut self, event: SessionEvent) -> Result<(), RuntimeError> {
        match event {
            SessionEvent::UserMessage { text } => {
                match self.log.submit(&text, &mut self.rng) {
                    Some(exchange) => {
                        tracing::info!(
                            exchange_id = %exchange.id,
                            purchasable = exchange.is_purchasable(),
                            "Appended exchange"
                        );
                        let _ = self.broadcast_tx.send(SseEvent::Exchange {
                            exchange: exchange.clone(),
                        });
                    }
                    None => tracing::debug!("Ignoring blank message"),
                }
                Ok(())
            }

            SessionEvent::SelectOption { option } => {
                match self.log.select_option(&option) {
                    Some(id) => {
                        tracing::info!(exchange_id = %id, option = %option, "Attached plan detail");
                        if let Some(exchange) = self.log.get(id) {
                            let _ = self.broadcast_tx.send(SseEvent::ExchangeUpdated {
                                exchange: exchange.clone(),
                            });
                        }
                    }
                    None => tracing::debug!(option = %option, "Ignoring option selection"),
                }
                Ok(())
            }

            SessionEvent::StartPurchase { unit_price } => {
                self.apply(PurchaseEvent::Buy { unit_price })
            }

            SessionEvent::BuyExchange { exchange_id } => {
                let exchange = self
                    .log
                    .get(exchange_id)
                    .ok_or(RuntimeError::ExchangeNotFound(exchange_id))?;
                let unit_price = exchange
                    .reference_price
                    .ok_or(RuntimeError::NotPurchasable(exchange_id))?;
                self.apply(PurchaseEvent::Buy { unit_price })
            }

            SessionEvent::EditQuantity { input } => {
                self.apply(PurchaseEvent::EditQuantity { input })
            }

            SessionEvent::ConfirmPurchase => self.apply(PurchaseEvent::Confirm),

            SessionEvent::ProgressTick { run } => self.apply(PurchaseEvent::ProgressTick { run }),
        }
    }

    /// Run the pure transition, adopt the new state, then execute its effects
    fn apply(&mut self, event: PurchaseEvent) -> Result<(), RuntimeError> {
        let result = transition(&self.purchase, &self.context, event)?;
        self.purchase = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartProgress { run, interval } => {
                // Never two tickers racing on the same progress
                if let Some(token) = self.progress_cancel_token.take() {
                    token.cancel();
                }
                let cancel_token = CancellationToken::new();
                self.progress_cancel_token = Some(cancel_token.clone());

                tracing::info!(run, quantity = self.purchase.quantity, "Starting purchase processing");
                spawn_ticker(self.command_tx.clone(), cancel_token, run, interval);
            }

            Effect::CancelProgress => {
                if let Some(token) = self.progress_cancel_token.take() {
                    tracing::debug!(run = self.purchase.run, "Cancelling progress ticker");
                    token.cancel();
                }
            }

            Effect::PublishState => {
                let _ = self.broadcast_tx.send(SseEvent::Purchase {
                    purchase: PurchaseView::from(&self.purchase),
                });
            }

            Effect::AnnounceCompletion { quantity } => {
                tracing::info!(
                    quantity,
                    total = self.purchase.total_cost(),
                    "Purchase completed"
                );
                let _ = self.broadcast_tx.send(SseEvent::PurchaseCompleted {
                    message: confirmation_message(quantity),
                });
            }
        }
    }
}

/// Spawn the periodic progress ticker for one run.
///
/// The first tick fires one full interval after start. The task ends when its
/// token is cancelled or the session is gone.
fn spawn_ticker(
    command_tx: mpsc::WeakSender<Command>,
    cancel_token: CancellationToken,
    run: u64,
    period: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => break,

                _ = interval.tick() => {
                    let Some(tx) = command_tx.upgrade() else { break };
                    if tx.send(Command::notify(SessionEvent::ProgressTick { run })).await.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(run, "Progress ticker stopped");
    });
}
