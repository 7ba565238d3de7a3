pub mod models;
pub mod server;
pub mod llm;
pub mod cli;
pub mod client;

use cli::Args;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::info;
use server::Server;
use server::relay::RelayService;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Chat Model: {}", llm::DEFAULT_CHAT_MODEL);
    info!("Provider Timeout: {}s", args.provider_timeout_secs);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let chat_config = LlmConfig::gemini(&args.gemini_api_key);
    let chat_client = new_chat_client(&chat_config)?;
    let relay = RelayService::new(chat_client, args.provider_timeout());

    let server = Server::new(relay, args);
    server.run().await?;

    Ok(())
}
