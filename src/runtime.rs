//! Session runtime for the chat server
//!
//! Each browser tab gets its own session id and conversation. Sessions are
//! isolated from each other and live as long as the process.

use crate::conversation::{Conversation, TurnLoop};
use crate::session::{new_session_id, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Manager for all live conversations
pub struct SessionManager {
    turn_loop: Arc<TurnLoop>,
    sessions: RwLock<HashMap<SessionId, Arc<Conversation>>>,
}

impl SessionManager {
    pub fn new(turn_loop: Arc<TurnLoop>) -> Self {
        Self {
            turn_loop,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new, empty conversation under a fresh session id
    pub async fn create(&self) -> Arc<Conversation> {
        let session_id = new_session_id();
        let conversation = Arc::new(Conversation::new(session_id));

        self.sessions
            .write()
            .await
            .insert(session_id, conversation.clone());

        tracing::info!(session_id = %session_id, "Session created");
        conversation
    }

    /// Look up a running conversation
    pub async fn get(&self, session_id: &SessionId) -> Option<Arc<Conversation>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// The shared turn loop
    pub fn turn_loop(&self) -> Arc<TurnLoop> {
        self.turn_loop.clone()
    }
}
