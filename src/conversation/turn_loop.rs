//! Turn loop: drives user input through the executor and into the log
//!
//! A conversation is `Idle` or `Processing`. Input received while idle
//! appends the user turn immediately, then the assistant turn once the
//! executor returns. Only one turn may be in flight per conversation.

use super::executor::{execute_turn, IntentTarget, TurnReply};
use super::log::{ConversationLog, Turn};
use crate::intent::IntentService;
use crate::session::SessionId;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

/// Input sent on behalf of the user to open a conversation
pub const GREETING_INPUT: &str = "Hi";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Processing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnLoopError {
    #[error("A message is already being processed for this conversation")]
    Busy,
}

/// Change notifications for renderers
#[derive(Debug, Clone)]
pub enum ChatEvent {
    TurnAppended { turn: Turn },
    PhaseChanged { phase: Phase },
}

/// Point-in-time copy of a conversation for replay
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub turns: Vec<Turn>,
    pub phase: Phase,
}

/// Explicit per-conversation state
#[derive(Debug, Default)]
pub struct ConversationState {
    log: ConversationLog,
    phase: Phase,
    greeted: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Processing. Records the user turn.
    ///
    /// Blank input is ignored and records nothing.
    pub fn begin_turn(&mut self, text: &str) -> Result<Option<Turn>, TurnLoopError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.phase == Phase::Processing {
            return Err(TurnLoopError::Busy);
        }

        let turn = Turn::user(text);
        self.log.append(turn.clone());
        self.phase = Phase::Processing;
        Ok(Some(turn))
    }

    /// Processing -> Idle. Records the assistant turn.
    pub fn finish_turn(&mut self, reply: TurnReply) -> Turn {
        let turn = Turn::assistant(reply.text, reply.quick_replies);
        self.log.append(turn.clone());
        self.phase = Phase::Idle;
        turn
    }

    /// True exactly once, and only while nothing has been said yet
    fn claim_greeting(&mut self) -> bool {
        if self.greeted || !self.log.is_empty() {
            return false;
        }
        self.greeted = true;
        true
    }

    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            turns: self.log.all().to_vec(),
            phase: self.phase,
        }
    }
}

/// A live conversation: its session, state and event channel
pub struct Conversation {
    session_id: SessionId,
    state: Mutex<ConversationState>,
    events: broadcast::Sender<ChatEvent>,
}

impl Conversation {
    pub fn new(session_id: SessionId) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session_id,
            state: Mutex::new(ConversationState::new()),
            events,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.with_state(|state| state.snapshot())
    }

    /// Snapshot plus a receiver for every event after it
    pub fn snapshot_and_subscribe(&self) -> (ConversationSnapshot, broadcast::Receiver<ChatEvent>) {
        self.with_state(|state| (state.snapshot(), self.events.subscribe()))
    }

    // Events are published while the state lock is held so subscribers never
    // see them out of order relative to a snapshot.
    fn with_state<R>(&self, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn publish(&self, event: ChatEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn begin_turn(&self, text: &str) -> Result<Option<Turn>, TurnLoopError> {
        self.with_state(|state| {
            let turn = state.begin_turn(text)?;
            if let Some(turn) = &turn {
                self.publish(ChatEvent::TurnAppended { turn: turn.clone() });
                self.publish(ChatEvent::PhaseChanged {
                    phase: Phase::Processing,
                });
            }
            Ok(turn)
        })
    }

    fn finish_turn(&self, reply: TurnReply) -> Turn {
        self.with_state(|state| {
            let turn = state.finish_turn(reply);
            self.publish(ChatEvent::TurnAppended { turn: turn.clone() });
            self.publish(ChatEvent::PhaseChanged { phase: Phase::Idle });
            turn
        })
    }

    fn claim_greeting(&self) -> bool {
        self.with_state(ConversationState::claim_greeting)
    }
}

/// Orchestrates turns against one intent service
pub struct TurnLoop {
    service: Arc<dyn IntentService>,
    target: IntentTarget,
}

impl TurnLoop {
    pub fn new(service: Arc<dyn IntentService>, target: IntentTarget) -> Self {
        Self { service, target }
    }

    /// Run one exchange for typed text or a clicked quick reply.
    ///
    /// Returns the turns appended: none for blank input, otherwise the user
    /// turn followed by the assistant turn.
    pub async fn submit_user_text(
        &self,
        conversation: &Conversation,
        text: &str,
    ) -> Result<Vec<Turn>, TurnLoopError> {
        let session_id = conversation.session_id();
        let Some(user_turn) = conversation.begin_turn(text)? else {
            tracing::debug!(session_id = %session_id, "Ignoring blank input");
            return Ok(Vec::new());
        };

        tracing::info!(session_id = %session_id, "Processing turn");
        let reply = execute_turn(
            self.service.as_ref(),
            &self.target,
            session_id,
            &user_turn.text,
        )
        .await;

        let assistant_turn = conversation.finish_turn(reply);
        tracing::info!(
            session_id = %session_id,
            quick_replies = assistant_turn.quick_replies.len(),
            "Turn complete"
        );

        Ok(vec![user_turn, assistant_turn])
    }

    /// Greet the user by sending the canned opening input.
    ///
    /// Only the first call on a conversation with an empty log does
    /// anything; later calls append nothing.
    pub async fn start_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Vec<Turn>, TurnLoopError> {
        if !conversation.claim_greeting() {
            return Ok(Vec::new());
        }
        self.submit_user_text(conversation, GREETING_INPUT).await
    }
}
