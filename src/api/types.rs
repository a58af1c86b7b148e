//! API request and response types

use crate::conversation::{Phase, Turn};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// How the user produced a message. Only used for logging: both kinds are
/// handled identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    #[default]
    Typed,
    QuickReply,
}

impl InputSource {
    pub fn as_str(self) -> &'static str {
        match self {
            InputSource::Typed => "typed",
            InputSource::QuickReply => "quick_reply",
        }
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    #[serde(default)]
    pub source: InputSource,
}

/// Full replay of one session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub turns: Vec<Turn>,
    pub phase: Phase,
}

/// Turns appended by a single request
#[derive(Debug, Serialize)]
pub struct AppendedResponse {
    pub appended: Vec<Turn>,
}

/// Liveness probe
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
