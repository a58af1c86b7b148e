//! Append-only conversation log

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One rendered chat bubble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Preset answers offered with an assistant turn, in display order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            quick_replies: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, quick_replies: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            quick_replies,
            created_at: Utc::now(),
        }
    }
}

/// Chronological sequence of turns. Entries are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in insertion order
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
