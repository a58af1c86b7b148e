//! Intent service error types

use thiserror::Error;

/// Intent detection error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct IntentError {
    pub kind: IntentErrorKind,
    pub message: String,
}

impl IntentError {
    pub fn new(kind: IntentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::InvalidRequest, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(IntentErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentErrorKind {
    /// Connection failures, timeouts
    Network,
    /// Quota exhausted (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request or unknown agent (400, 404)
    InvalidRequest,
    /// Call succeeded but the body could not be read as a response
    Decode,
    /// Any other non-success status
    Unknown,
}

impl IntentErrorKind {
    /// True when the call produced no result at all.
    ///
    /// Only `Decode` means the service answered and we failed afterwards.
    pub fn is_transport(self) -> bool {
        !matches!(self, Self::Decode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::Auth => "auth",
            Self::InvalidRequest => "invalid_request",
            Self::Decode => "decode",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_decode_is_not_transport() {
        assert!(IntentErrorKind::Network.is_transport());
        assert!(IntentErrorKind::Auth.is_transport());
        assert!(IntentErrorKind::RateLimit.is_transport());
        assert!(IntentErrorKind::ServerError.is_transport());
        assert!(IntentErrorKind::InvalidRequest.is_transport());
        assert!(IntentErrorKind::Unknown.is_transport());
        assert!(!IntentErrorKind::Decode.is_transport());
    }

    #[test]
    fn test_display_is_message() {
        let err = IntentError::decode("bad body");
        assert_eq!(err.to_string(), "bad body");
        assert_eq!(err.kind.as_str(), "decode");
    }
}
