//! Server-Sent Events support
//!
//! One `init` event with the full log, then a `turn` event per appended
//! turn and a `state_change` event per phase change.

use crate::conversation::{ChatEvent, ConversationSnapshot};
use crate::session::SessionId;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert a snapshot plus broadcast receiver to an SSE stream
pub fn sse_stream(
    session_id: SessionId,
    snapshot: ConversationSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<ChatEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(Event::default().event("init").data(
            json!({
                "type": "init",
                "session_id": session_id,
                "turns": snapshot.turns,
                "phase": snapshot.phase,
            })
            .to_string(),
        ))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(chat_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn chat_event_to_axum(event: ChatEvent) -> Event {
    let (event_type, data) = match event {
        ChatEvent::TurnAppended { turn } => (
            "turn",
            json!({
                "type": "turn",
                "turn": turn
            }),
        ),
        ChatEvent::PhaseChanged { phase } => (
            "state_change",
            json!({
                "type": "state_change",
                "phase": phase
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
