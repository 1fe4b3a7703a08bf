//! Append-only conversation log

use super::exchange::{Exchange, ExchangeId};
use super::plan::resolve_plan;
use crate::intent::{classify, normalize};
use crate::reply::synthesize;
use rand::Rng;

/// Ordered exchanges for one session
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    exchanges: Vec<Exchange>,
    last_id: Option<i64>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the input, build its reply and append the exchange.
    ///
    /// Returns `None` without touching the log when the input is blank.
    pub fn submit<R: Rng + ?Sized>(&mut self, raw: &str, rng: &mut R) -> Option<&Exchange> {
        let user_text = normalize(raw);
        if user_text.is_empty() {
            return None;
        }

        let intent = classify(&user_text);
        let payload = synthesize(intent, raw, rng);
        let id = self.next_id(chrono::Utc::now().timestamp_millis());
        self.exchanges.push(Exchange::new(id, user_text, payload));
        self.exchanges.last()
    }

    /// Resolve a selected plan option and attach it to the current tail.
    ///
    /// Always targets the most recent exchange, not the one that offered the
    /// option. Returns the id of the updated exchange; unknown options and an
    /// empty log are no-ops.
    pub fn select_option(&mut self, option: &str) -> Option<ExchangeId> {
        let detail = resolve_plan(option)?;
        let tail = self.exchanges.last_mut()?;
        tail.plan_detail = Some(detail);
        Some(tail.id)
    }

    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| e.id == id)
    }

    #[allow(dead_code)] // Log query utility
    pub fn tail(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Creation-time token, bumped past the previous id when the clock has
    /// not moved forward
    fn next_id(&mut self, now_ms: i64) -> ExchangeId {
        let raw = match self.last_id {
            Some(last) if now_ms <= last => last + 1,
            _ => now_ms,
        };
        self.last_id = Some(raw);
        ExchangeId::new(raw)
    }
}
