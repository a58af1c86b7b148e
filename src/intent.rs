//! Intent detection service abstraction
//!
//! The conversational agent lives on a remote service; this module is the
//! only place that knows how to reach it.

mod dialogflow;
mod error;
mod types;

#[cfg(test)]
pub mod testing;

pub use dialogflow::DialogflowService;
pub use error::IntentError;
pub use types::{DetectIntentRequest, DetectIntentResponse};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for intent detection backends
#[async_trait]
pub trait IntentService: Send + Sync {
    /// Send one user utterance and return the service's interpretation
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<DetectIntentResponse, IntentError>;
}

/// Logging wrapper for intent services
pub struct LoggingIntentService {
    inner: Arc<dyn IntentService>,
}

impl LoggingIntentService {
    pub fn new(inner: Arc<dyn IntentService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl IntentService for LoggingIntentService {
    async fn detect_intent(
        &self,
        request: &DetectIntentRequest,
    ) -> Result<DetectIntentResponse, IntentError> {
        let start = std::time::Instant::now();
        let result = self.inner.detect_intent(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    session_id = %request.session_id,
                    response_id = response.response_id.as_deref().unwrap_or("<none>"),
                    duration_ms = %duration.as_millis(),
                    intent = response.intent_name().unwrap_or("<none>"),
                    "Intent detected"
                );
            }
            Err(e) => {
                tracing::error!(
                    session_id = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Intent detection failed"
                );
            }
        }

        result
    }
}
