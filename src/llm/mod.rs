pub mod chat;

use std::time::Duration;
use thiserror::Error;

/// Model every relay request is sent to.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing provider configuration: {0}")]
    Config(String),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned no text")]
    EmptyResponse,
}

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Gemini config using the fixed relay model. An empty key counts as unset.
    pub fn gemini(api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()).filter(|k| !k.trim().is_empty()),
            completion_model: Some(DEFAULT_CHAT_MODEL.to_string()),
            base_url: None,
        }
    }
}
