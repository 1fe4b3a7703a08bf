//! Conversation log
//!
//! An append-only sequence of exchanges. The only in-place mutation is
//! attaching a plan description to the current tail.

pub mod exchange;
pub mod log;
pub mod plan;

pub use exchange::{Exchange, ExchangeId};
pub use log::ConversationLog;
