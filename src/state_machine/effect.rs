//! Effects produced by state transitions

use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start the periodic progress ticker for `run`, replacing any ticker
    /// already running
    StartProgress { run: u64, interval: Duration },

    /// Stop the running progress ticker, if any
    CancelProgress,

    /// Notify connected clients of the new workflow state
    PublishState,

    /// Notify connected clients that a purchase completed
    AnnounceCompletion { quantity: u32 },
}

impl Effect {
    pub fn start_progress(run: u64, interval: Duration) -> Self {
        Effect::StartProgress { run, interval }
    }

    pub fn announce_completion(quantity: u32) -> Self {
        Effect::AnnounceCompletion { quantity }
    }
}
