use async_trait::async_trait;
use log::debug;

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, ProviderError, DEFAULT_CHAT_MODEL };
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

pub struct GeminiChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, ProviderError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key)
            .model(&chat_model)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }

        let llm_provider = builder.build().map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| ProviderError::Config("GEMINI_API_KEY is not set".to_string()))?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        // Only the latest prompt is sent: no system prompt, no history.
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        debug!(
            "GeminiChatClient::complete() → model={} base_url={:?}",
            self.model,
            self.base_url
        );
        let resp = self.llm
            .chat(&messages).await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        let text = resp.text().ok_or(ProviderError::EmptyResponse)?;
        Ok(CompletionResponse { response: text.to_string() })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
