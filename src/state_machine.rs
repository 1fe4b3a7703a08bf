//! Purchase workflow state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! transition function returns the next state plus the effects the runtime
//! must carry out (starting or cancelling the progress ticker, notifying
//! clients).

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{PurchaseEvent, QuantityInput};
pub use state::{PurchasePhase, PurchaseState, WorkflowContext};
pub use transition::{transition, TransitionError};
