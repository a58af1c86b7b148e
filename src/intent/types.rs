//! Request and response types for intent detection

use crate::session::SessionId;
use serde::Deserialize;
use serde_json::Value;

/// One detect-intent call: a single user utterance within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectIntentRequest {
    pub project_id: String,
    pub session_id: SessionId,
    pub language_code: String,
    pub text: String,
}

impl DetectIntentRequest {
    pub fn new(
        project_id: impl Into<String>,
        session_id: SessionId,
        language_code: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            session_id,
            language_code: language_code.into(),
            text: text.into(),
        }
    }

    /// Resource path of the remote session
    pub fn session_path(&self) -> String {
        format!(
            "projects/{}/agent/sessions/{}",
            self.project_id, self.session_id
        )
    }
}

/// Detect-intent result.
///
/// `query_result` is kept as an untyped JSON tree: the fields we read from
/// it (`fulfillmentText`, rich payloads) depend on how the agent is set up.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentResponse {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub query_result: Value,
}

impl DetectIntentResponse {
    /// Build a response around an already decoded query result
    #[allow(dead_code)] // Used by the test mock
    pub fn from_query_result(query_result: Value) -> Self {
        Self {
            response_id: None,
            query_result,
        }
    }

    /// Display name of the matched intent, if any
    pub fn intent_name(&self) -> Option<&str> {
        self.query_result
            .get("intent")
            .and_then(|i| i.get("displayName"))
            .and_then(Value::as_str)
    }
}
