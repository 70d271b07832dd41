mod bootstrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use foundry_ai::{GeminiClient, GeminiConfig, LlmClient};
use foundry_gateway::{run_server, GatewayConfig};
use tracing::warn;

#[derive(Debug, Parser)]
#[command(
    name = "foundry",
    about = "Back-office API for tracking incubator ventures"
)]
struct Cli {
    /// Address the gateway listens on.
    #[arg(long, default_value = "127.0.0.1:8620")]
    bind: String,

    /// SQLite database path.
    #[arg(long, default_value = "state/ventures.db")]
    db_path: PathBuf,

    /// Gemini API key; chat runs in "not configured" mode when empty.
    #[arg(long, env = "GOOGLE_API_KEY", default_value = "", hide_env_values = true)]
    google_api_key: String,

    /// Gemini API base URL.
    #[arg(
        long,
        env = "GOOGLE_API_BASE",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    google_api_base: String,

    /// Model used for venture chat.
    #[arg(long, default_value = "gemini-3-flash-preview")]
    model: String,

    /// Timeout for one LLM round-trip, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    request_timeout_ms: u64,

    /// Back-office login name.
    #[arg(long, env = "FOUNDRY_AUTH_USERNAME", default_value = "admin")]
    auth_username: String,

    /// Back-office login password.
    #[arg(long, env = "FOUNDRY_AUTH_PASSWORD", hide_env_values = true)]
    auth_password: String,

    /// Secret used to sign bearer tokens.
    #[arg(long, env = "FOUNDRY_AUTH_SECRET", hide_env_values = true)]
    auth_secret: String,

    /// Access token lifetime in seconds.
    #[arg(long, default_value_t = 900)]
    access_ttl_seconds: u64,

    /// Refresh token lifetime in seconds.
    #[arg(long, default_value_t = 86_400)]
    refresh_ttl_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    let cli = Cli::parse();

    let llm_client: Option<Arc<dyn LlmClient>> = if cli.google_api_key.trim().is_empty() {
        warn!("GOOGLE_API_KEY is not set; venture chat will answer with the not-configured notice");
        None
    } else {
        let client = GeminiClient::new(GeminiConfig {
            api_base: cli.google_api_base.clone(),
            api_key: cli.google_api_key.clone(),
            request_timeout_ms: cli.request_timeout_ms,
        })?;
        Some(Arc::new(client))
    };

    let config = GatewayConfig {
        bind: cli.bind,
        db_path: cli.db_path,
        model: cli.model,
        auth_username: cli.auth_username,
        auth_password: cli.auth_password,
        auth_secret: cli.auth_secret,
        access_ttl_seconds: cli.access_ttl_seconds,
        refresh_ttl_seconds: cli.refresh_ttl_seconds,
        default_page_size: 10,
        max_page_size: 10_000,
        max_generate_count: 10_000,
    };

    run_server(config, llm_client).await
}
