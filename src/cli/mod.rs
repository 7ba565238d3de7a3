use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relay prompts to the Gemini API over HTTP", long_about = None)]
pub struct Args {
    // --- Provider Args ---
    /// API key for the Gemini provider.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Seconds to wait for the provider before answering with a failure.
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "60")]
    pub provider_timeout_secs: u64,

    // --- Server Args ---
    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(short = 'p', long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

/// Arguments for the terminal chat client. The relay URL is fixed at build time.
#[derive(Parser, Debug, Clone)]
#[command(name = "dost-chat", version, about = "Chat with Dost AI from the terminal")]
pub struct ChatArgs {
    /// Write logs to this file. Logging is off otherwise so the UI stays clean.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<String>,
}
