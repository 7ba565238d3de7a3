use axum::{ http::StatusCode, response::{ IntoResponse, Response } };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::llm::chat::ChatClient;
use crate::llm::ProviderError;
use crate::models::relay::RawPromptRequest;

/// Body returned for every failure. Details stay in the server log.
pub const FAILURE_BODY: &str = "failed";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
            RelayError::Provider(_) | RelayError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), FAILURE_BODY).into_response()
    }
}

/// Pulls a usable prompt out of a raw request body.
pub fn parse_prompt(body: &[u8]) -> Result<String, RelayError> {
    let raw: RawPromptRequest = serde_json
        ::from_slice(body)
        .map_err(|e| RelayError::InvalidPrompt(format!("body is not a JSON object: {}", e)))?;

    match raw.prompt {
        Some(serde_json::Value::String(prompt)) if !prompt.trim().is_empty() => Ok(prompt),
        Some(serde_json::Value::String(_)) => Err(RelayError::InvalidPrompt("prompt is blank".into())),
        Some(other) => Err(RelayError::InvalidPrompt(format!("prompt must be a string, got {}", other))),
        None => Err(RelayError::InvalidPrompt("prompt is missing".into())),
    }
}

/// Forwards one prompt to the provider. Holds no mutable state, so a single
/// instance is shared by every request.
#[derive(Clone)]
pub struct RelayService {
    chat_client: Arc<dyn ChatClient>,
    timeout: Duration,
}

impl RelayService {
    pub fn new(chat_client: Arc<dyn ChatClient>, timeout: Duration) -> Self {
        Self { chat_client, timeout }
    }

    pub fn model(&self) -> String {
        self.chat_client.get_model()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        if prompt.trim().is_empty() {
            return Err(RelayError::InvalidPrompt("prompt is blank".into()));
        }
        // Dropping the future on timeout cancels the outbound call.
        match tokio::time::timeout(self.timeout, self.chat_client.complete(prompt)).await {
            Ok(result) => Ok(result?.response),
            Err(_) => Err(RelayError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct EchoClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse { response: format!("echo: {}", prompt) })
        }

        fn get_model(&self) -> String {
            "echo".into()
        }
    }

    struct StalledClient;

    #[async_trait]
    impl ChatClient for StalledClient {
        async fn complete(&self, _prompt: &str) -> Result<CompletionResponse, ProviderError> {
            futures::future::pending().await
        }

        fn get_model(&self) -> String {
            "stalled".into()
        }
    }

    #[test]
    fn parse_prompt_accepts_string() {
        assert_eq!(parse_prompt(br#"{"prompt": "hello"}"#).unwrap(), "hello");
    }

    #[test]
    fn parse_prompt_keeps_surrounding_whitespace() {
        assert_eq!(parse_prompt(br#"{"prompt": "  hi  "}"#).unwrap(), "  hi  ");
    }

    #[test]
    fn parse_prompt_rejects_missing_blank_and_non_string() {
        let bodies: [&[u8]; 6] = [
            br#"{}"#,
            br#"{"prompt": "   "}"#,
            br#"{"prompt": 42}"#,
            br#"{"prompt": null}"#,
            br#"not json"#,
            b"",
        ];
        for body in bodies {
            let err = parse_prompt(body).unwrap_err();
            assert!(matches!(err, RelayError::InvalidPrompt(_)), "body {:?}", body);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn generate_returns_provider_text() {
        let client = Arc::new(EchoClient { calls: AtomicUsize::new(0) });
        let relay = RelayService::new(client.clone(), Duration::from_secs(1));
        assert_eq!(relay.generate("hello").await.unwrap(), "echo: hello");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_prompt_never_reaches_provider() {
        let client = Arc::new(EchoClient { calls: AtomicUsize::new(0) });
        let relay = RelayService::new(client.clone(), Duration::from_secs(1));
        assert!(relay.generate(" \n ").await.is_err());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out() {
        let relay = RelayService::new(Arc::new(StalledClient), Duration::from_secs(5));
        let err = relay.generate("hello").await.unwrap_err();
        assert!(matches!(err, RelayError::Timeout(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
