//! Mock intent service for testing
//!
//! Lets turn executor and turn loop tests run without a remote agent.

use super::{DetectIntentRequest, DetectIntentResponse, IntentError, IntentService};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Mock intent service that returns queued responses
pub struct MockIntentService {
    responses: Mutex<VecDeque<Result<DetectIntentResponse, IntentError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<DetectIntentRequest>>,
    delay: Option<Duration>,
}

impl MockIntentService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful response wrapping the given query result
    pub fn queue_query_result(&self, query_result: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(DetectIntentResponse::from_query_result(query_result)));
    }

    /// Queue a successful response whose only field is the fulfillment text
    pub fn queue_text(&self, text: &str) {
        self.queue_query_result(serde_json::json!({ "fulfillmentText": text }));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: IntentError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<DetectIntentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl IntentService for MockIntentService {
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<DetectIntentResponse, IntentError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(IntentError::network("No mock response queued")))
    }
}
