//! HTTP surface for the venture back office.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use foundry_auth::{StaticCredentials, TokenAuthority};
use foundry_ai::LlmClient;
use foundry_chat::ChatPipeline;
use foundry_store::VentureStore;
use tokio::net::TcpListener;
use tracing::info;

mod auth;
mod error;
mod types;
mod ventures;

pub use error::ApiError;

use auth::{handle_login, handle_refresh};
use types::HealthResponse;
use ventures::{
    handle_chat, handle_create_venture, handle_delete_venture, handle_generate_random,
    handle_get_venture, handle_list_ventures, handle_metrics, handle_update_venture,
};

const HEALTH_ENDPOINT: &str = "/health";
const AUTH_LOGIN_ENDPOINT: &str = "/auth/login";
const AUTH_REFRESH_ENDPOINT: &str = "/auth/refresh";
const VENTURES_ENDPOINT: &str = "/ventures";
const VENTURE_DETAIL_ENDPOINT: &str = "/ventures/{id}";
const VENTURES_METRICS_ENDPOINT: &str = "/ventures/metrics";
const VENTURES_GENERATE_ENDPOINT: &str = "/ventures/generate_random";
const VENTURES_CHAT_ENDPOINT: &str = "/ventures/chat";

/// Server configuration assembled by the binary. The LLM client is injected
/// separately so tests can swap in mocks without touching configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: String,
    pub db_path: PathBuf,
    pub model: String,
    pub auth_username: String,
    pub auth_password: String,
    pub auth_secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub max_generate_count: u64,
}

/// Shared per-process state handed to every handler.
pub struct GatewayState {
    pub config: GatewayConfig,
    pub store: VentureStore,
    pub chat: ChatPipeline,
    pub authority: TokenAuthority,
    pub credentials: StaticCredentials,
}

impl GatewayState {
    pub fn new(
        config: GatewayConfig,
        store: VentureStore,
        llm_client: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let chat = ChatPipeline::new(llm_client, config.model.clone());
        let authority = TokenAuthority::new(
            config.auth_secret.as_bytes().to_vec(),
            config.access_ttl_seconds,
            config.refresh_ttl_seconds,
        );
        let credentials =
            StaticCredentials::new(config.auth_username.clone(), config.auth_password.clone());
        Self {
            config,
            store,
            chat,
            authority,
            credentials,
        }
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(HEALTH_ENDPOINT, get(handle_health))
        .route(AUTH_LOGIN_ENDPOINT, post(handle_login))
        .route(AUTH_REFRESH_ENDPOINT, post(handle_refresh))
        .route(
            VENTURES_ENDPOINT,
            get(handle_list_ventures).post(handle_create_venture),
        )
        .route(VENTURES_METRICS_ENDPOINT, get(handle_metrics))
        .route(VENTURES_GENERATE_ENDPOINT, post(handle_generate_random))
        .route(VENTURES_CHAT_ENDPOINT, post(handle_chat))
        .route(
            VENTURE_DETAIL_ENDPOINT,
            get(handle_get_venture)
                .put(handle_update_venture)
                .delete(handle_delete_venture),
        )
        .with_state(state)
}

async fn handle_health(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let ventures = state
        .store
        .count()
        .map_err(|cause| ApiError::internal(cause.to_string()))?;
    Ok(Json(HealthResponse {
        status: "ok",
        ventures,
        chat_configured: state.chat.is_configured(),
    }))
}

/// Binds the configured address and serves until ctrl-c.
pub async fn run_server(
    config: GatewayConfig,
    llm_client: Option<Arc<dyn LlmClient>>,
) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", config.bind))?;

    let store = VentureStore::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind gateway server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound server address")?;

    info!(
        addr = %local_addr,
        db = %config.db_path.display(),
        chat_configured = llm_client.is_some(),
        "venture gateway listening"
    );

    let state = Arc::new(GatewayState::new(config, store, llm_client));
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("gateway server exited unexpectedly")?;

    Ok(())
}
