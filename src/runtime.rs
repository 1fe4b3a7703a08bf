//! Runtime for a chat session
//!
//! One task owns the conversation log and the purchase workflow. Every user
//! action and every progress tick goes through a single mpsc queue, so log
//! appends, plan-detail writes and workflow transitions are applied strictly
//! one at a time.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::conversation::{Exchange, ExchangeId};
use crate::state_machine::{QuantityInput, TransitionError, WorkflowContext};
use crate::view::{PurchaseView, SessionView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Events accepted by a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    // User events
    UserMessage { text: String },
    SelectOption { option: String },
    StartPurchase { unit_price: f64 },
    /// "Buy Now" on a specific exchange, at its reference price
    BuyExchange { exchange_id: ExchangeId },
    EditQuantity { input: QuantityInput },
    ConfirmPurchase,

    // Timer events
    ProgressTick { run: u64 },
}

/// Errors returned to whoever dispatched an event
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session runtime has stopped")]
    Stopped,
    #[error("Exchange {0} not found")]
    ExchangeNotFound(ExchangeId),
    #[error("Exchange {0} has no price to buy at")]
    NotPurchasable(ExchangeId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl RuntimeError {
    /// Whether the error should be shown to connected clients
    pub fn is_user_facing(&self) -> bool {
        match self {
            RuntimeError::Transition(e) => e.is_user_facing(),
            RuntimeError::Stopped => false,
            _ => true,
        }
    }
}

/// Queue entry: an event plus an optional reply slot for the resulting view
#[derive(Debug)]
pub struct Command {
    pub event: SessionEvent,
    pub reply: Option<oneshot::Sender<Result<SessionView, RuntimeError>>>,
}

impl Command {
    /// Fire-and-forget command (used by the progress ticker)
    pub fn notify(event: SessionEvent) -> Self {
        Self { event, reply: None }
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { view: SessionView },
    Exchange { exchange: Exchange },
    ExchangeUpdated { exchange: Exchange },
    Purchase { purchase: PurchaseView },
    PurchaseCompleted { message: String },
    Error { message: String },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    view_rx: watch::Receiver<SessionView>,
}

impl SessionHandle {
    /// Apply an event and wait for the resulting view
    pub async fn dispatch(&self, event: SessionEvent) -> Result<SessionView, RuntimeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        reply_rx.await.map_err(|_| RuntimeError::Stopped)?
    }

    /// Queue an event without waiting for it to be applied
    #[allow(dead_code)] // API completeness
    pub async fn send(&self, event: SessionEvent) -> Result<(), RuntimeError> {
        self.command_tx
            .send(Command::notify(event))
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Watch the view as it changes
    #[allow(dead_code)] // API completeness
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Subscribe to incremental session updates
    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Start a production session runtime in the background
pub fn spawn_session(context: WorkflowContext) -> SessionHandle {
    spawn_with_rng(context, StdRng::from_entropy())
}

/// Start a session runtime with a caller-provided random source
pub fn spawn_with_rng<R>(context: WorkflowContext, rng: R) -> SessionHandle
where
    R: rand::Rng + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    let runtime = SessionRuntime::new(
        context,
        rng,
        command_rx,
        command_tx.downgrade(),
        broadcast_tx.clone(),
        view_tx,
    );

    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!("Session runtime finished");
    });

    SessionHandle {
        command_tx,
        broadcast_tx,
        view_rx,
    }
}
