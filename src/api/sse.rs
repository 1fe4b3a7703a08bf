//! Server-Sent Events support

use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn event_payload(event: SseEvent) -> (&'static str, serde_json::Value) {
    match event {
        SseEvent::Init { view } => (
            "init",
            json!({
                "type": "init",
                "session": view
            }),
        ),
        SseEvent::Exchange { exchange } => (
            "exchange",
            json!({
                "type": "exchange",
                "exchange": exchange
            }),
        ),
        SseEvent::ExchangeUpdated { exchange } => (
            "exchange_updated",
            json!({
                "type": "exchange_updated",
                "exchange": exchange
            }),
        ),
        SseEvent::Purchase { purchase } => (
            "purchase",
            json!({
                "type": "purchase",
                "purchase": purchase
            }),
        ),
        SseEvent::PurchaseCompleted { message } => (
            "purchase_completed",
            json!({
                "type": "purchase_completed",
                "message": message
            }),
        ),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}
