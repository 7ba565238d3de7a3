use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::relay::PromptRequest;

/// Relay base URL, baked in at compile time.
pub const RELAY_BASE_URL: &str = match option_env!("DOST_RELAY_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:5000",
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum RelayCallError {
    #[error("invalid relay url: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not reach relay: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay answered {0}")]
    Status(StatusCode),
}

/// The one call the chat client makes: prompt in, generated text out.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RelayCallError>;
}

pub struct HttpRelay {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpRelay {
    pub fn new(base_url: &str) -> Result<Self, RelayCallError> {
        let endpoint = Url::parse(base_url)?.join("generate")?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_build_config() -> Result<Self, RelayCallError> {
        Self::new(RELAY_BASE_URL)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn generate(&self, prompt: &str) -> Result<String, RelayCallError> {
        debug!("POST {} prompt_len={}", self.endpoint, prompt.len());
        let resp = self.client
            .post(self.endpoint.clone())
            .json(&PromptRequest { prompt: prompt.to_string() })
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayCallError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_generate_under_base() {
        let relay = HttpRelay::new("http://localhost:5000").unwrap();
        assert_eq!(relay.endpoint().as_str(), "http://localhost:5000/generate");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(HttpRelay::new("not a url"), Err(RelayCallError::Url(_))));
    }
}
