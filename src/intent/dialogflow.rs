//! Dialogflow ES (v2 REST) intent detection

use super::types::{DetectIntentRequest, DetectIntentResponse};
use super::{IntentError, IntentService};
use crate::config::IntentConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Dialogflow service implementation
pub struct DialogflowService {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl DialogflowService {
    pub fn new(config: &IntentConfig) -> Result<Self, IntentError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IntentError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn detect_intent_url(&self, request: &DetectIntentRequest) -> String {
        format!(
            "{}/v2/{}:detectIntent",
            self.endpoint,
            request.session_path()
        )
    }

    fn translate_request(request: &DetectIntentRequest) -> DialogflowRequest {
        DialogflowRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: request.text.clone(),
                    language_code: request.language_code.clone(),
                },
            },
        }
    }
}

#[async_trait]
impl IntentService for DialogflowService {
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<DetectIntentResponse, IntentError> {
        let url = self.detect_intent_url(request);

        let mut builder = self
            .client
            .post(&url)
            .json(&Self::translate_request(request));
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                IntentError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                IntentError::network(format!("Connection failed: {e}"))
            } else {
                IntentError::network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IntentError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| IntentError::decode(format!("Failed to parse response: {e}")))
    }
}

/// Map a non-success HTTP status (and Google error body, if any) to an error
fn classify_status(status: StatusCode, body: &str) -> IntentError {
    let message = serde_json::from_str::<DialogflowErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |resp| resp.error.message);

    match status.as_u16() {
        400 | 404 => IntentError::invalid_request(format!("Invalid request: {message}")),
        401 | 403 => IntentError::auth(format!("Authentication failed: {message}")),
        429 => IntentError::rate_limit(format!("Rate limit exceeded: {message}")),
        500..=599 => IntentError::server_error(format!("Server error: {message}")),
        _ => IntentError::unknown(format!("HTTP {status}: {message}")),
    }
}

// Dialogflow wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DialogflowRequest {
    query_input: QueryInput,
}

#[derive(Debug, Serialize)]
struct QueryInput {
    text: TextInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput {
    text: String,
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct DialogflowErrorResponse {
    error: DialogflowError,
}

#[derive(Debug, Deserialize)]
struct DialogflowError {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}
