pub mod gemini;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{ LlmConfig, ProviderError };
use self::gemini::GeminiChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Single-shot text completion against a model provider.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
