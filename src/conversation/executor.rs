//! Turn execution: one user utterance in, one displayable reply out
//!
//! `execute_turn` never fails. Every problem with the remote call or its
//! payload is folded into the reply text so the conversation can continue.

use crate::intent::{DetectIntentRequest, IntentService};
use crate::session::SessionId;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

pub const CONNECTION_ISSUE_MESSAGE: &str = "⚠️ Sorry, I'm having connection issues.";
pub const FALLBACK_MESSAGE: &str = "I'm not sure how to respond to that.";
const ERROR_MESSAGE_PREFIX: &str = "⚠️ An error occurred while processing your request: ";

/// Index within `fulfillmentMessages` where the agent puts its rich payload
const RICH_PAYLOAD_MESSAGE_INDEX: usize = 1;

/// Where and how turns are sent
#[derive(Debug, Clone)]
pub struct IntentTarget {
    pub project_id: String,
    pub language_code: String,
    pub timeout: Duration,
}

/// Normalized reply for a single turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub quick_replies: Vec<String>,
}

impl TurnReply {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }
}

/// Send `user_text` to the intent service and normalize the answer.
///
/// Blank input returns an empty reply without contacting the service.
pub async fn execute_turn(
    service: &dyn IntentService,
    target: &IntentTarget,
    session_id: SessionId,
    user_text: &str,
) -> TurnReply {
    if user_text.trim().is_empty() {
        return TurnReply::default();
    }

    let request = DetectIntentRequest::new(
        target.project_id.as_str(),
        session_id,
        target.language_code.as_str(),
        user_text,
    );

    match timeout(target.timeout, service.detect_intent(&request)).await {
        Ok(Ok(response)) => reply_from_query_result(&response.query_result),
        Ok(Err(e)) if e.kind.is_transport() => TurnReply::text_only(CONNECTION_ISSUE_MESSAGE),
        Ok(Err(e)) => {
            tracing::warn!(session_id = %session_id, error = %e, "Turn failed after response");
            TurnReply::text_only(format!("{ERROR_MESSAGE_PREFIX}{e}"))
        }
        Err(_) => {
            tracing::warn!(
                session_id = %session_id,
                timeout_secs = target.timeout.as_secs(),
                "Intent detection timed out"
            );
            TurnReply::text_only(CONNECTION_ISSUE_MESSAGE)
        }
    }
}

/// Build the reply from a decoded `queryResult` tree
pub fn reply_from_query_result(query_result: &Value) -> TurnReply {
    TurnReply {
        text: extract_display_text(query_result),
        quick_replies: extract_quick_replies(query_result),
    }
}

/// The fulfillment text, or the fallback message when there is none
pub fn extract_display_text(query_result: &Value) -> String {
    query_result
        .get("fulfillmentText")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string()
}

/// Labels of the quick-reply chips attached to a response.
///
/// Agents put a custom payload in the second fulfillment message:
/// `payload.richContent[0][0].options[*].text`. Any deviation from that
/// shape (missing key, short list, wrong type, option without a string
/// `text`) yields no quick replies at all.
pub fn extract_quick_replies(query_result: &Value) -> Vec<String> {
    let options = query_result
        .get("fulfillmentMessages")
        .and_then(|messages| messages.get(RICH_PAYLOAD_MESSAGE_INDEX))
        .and_then(|message| message.get("payload"))
        .and_then(|payload| payload.get("richContent"))
        .and_then(|rows| rows.get(0))
        .and_then(|row| row.get(0))
        .and_then(|cell| cell.get("options"))
        .and_then(Value::as_array);

    let Some(options) = options else {
        tracing::debug!("No quick replies in response payload");
        return Vec::new();
    };

    options
        .iter()
        .map(|option| option.get("text").and_then(Value::as_str).map(str::to_owned))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}
