//! End-to-end tests against a real listener with a mocked LLM provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use foundry_ai::{
    AiError, AnswerContent, ChatRequest, ChatResponse, ChatUsage, LlmClient,
};
use foundry_chat::{NOT_CONFIGURED_MESSAGE, PROVIDER_ERROR_FALLBACK};
use foundry_gateway::{build_router, GatewayConfig, GatewayState};
use foundry_store::VentureStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Default)]
struct ScriptedLlmClient {
    content: Option<AnswerContent>,
    calls: AtomicUsize,
}

impl ScriptedLlmClient {
    fn answering(content: AnswerContent) -> Self {
        Self {
            content: Some(content),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.content.clone() {
            Some(content) => Ok(ChatResponse {
                content,
                finish_reason: Some("STOP".to_string()),
                usage: ChatUsage::default(),
            }),
            None => Err(AiError::HttpStatus {
                status: 503,
                body: "provider unavailable".to_string(),
            }),
        }
    }
}

struct TestGateway {
    base_url: String,
    http: reqwest::Client,
    _dir: TempDir,
}

async fn spawn_gateway(llm_client: Option<Arc<dyn LlmClient>>) -> TestGateway {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = GatewayConfig {
        bind: "127.0.0.1:0".to_string(),
        db_path: dir.path().join("ventures.db"),
        model: "gemini-3-flash-preview".to_string(),
        auth_username: "admin".to_string(),
        auth_password: "hunter2".to_string(),
        auth_secret: "integration-test-secret".to_string(),
        access_ttl_seconds: 300,
        refresh_ttl_seconds: 86_400,
        default_page_size: 10,
        max_page_size: 10_000,
        max_generate_count: 10_000,
    };
    let store = VentureStore::open(&config.db_path).expect("open store");
    let state = Arc::new(GatewayState::new(config, store, llm_client));
    let router = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    TestGateway {
        base_url: format!("http://{addr}"),
        http: reqwest::Client::new(),
        _dir: dir,
    }
}

impl TestGateway {
    async fn login(&self) -> String {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "username": "admin", "password": "hunter2" }))
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("login body");
        body["access"].as_str().expect("access token").to_string()
    }
}

fn sample_venture() -> Value {
    json!({
        "name": "PortFlow",
        "pod": "Infrastructure Intelligence",
        "stage": "Pilot",
        "founder": "Dr. Samir Hassan",
        "status": "on_track",
        "last_update": "2025-01-18",
        "metrics": {
            "burn_rate_monthly": 45000,
            "runway_months": 14,
            "pilot_customers": 3,
            "nps_score": 72
        }
    })
}

#[tokio::test]
async fn venture_endpoints_require_a_bearer_token() {
    let gateway = spawn_gateway(None).await;

    let response = gateway
        .http
        .get(format!("{}/ventures", gateway.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = gateway
        .http
        .post(format!("{}/ventures/chat", gateway.base_url))
        .json(&json!({ "question": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let gateway = spawn_gateway(None).await;

    let response = gateway
        .http
        .post(format!("{}/auth/login", gateway.base_url))
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn refresh_mints_a_working_access_token() {
    let gateway = spawn_gateway(None).await;

    let response = gateway
        .http
        .post(format!("{}/auth/login", gateway.base_url))
        .json(&json!({ "username": "admin", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let refresh = body["refresh"].as_str().unwrap();

    let response = gateway
        .http
        .post(format!("{}/auth/refresh", gateway.base_url))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let access = body["access"].as_str().unwrap();

    let response = gateway
        .http
        .get(format!("{}/ventures", gateway.base_url))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // an access token is not accepted as a refresh token
    let access_token = gateway.login().await;
    let response = gateway
        .http
        .post(format!("{}/auth/refresh", gateway.base_url))
        .json(&json!({ "refresh": access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn crud_round_trip_with_filters_and_metrics() {
    let gateway = spawn_gateway(None).await;
    let token = gateway.login().await;

    // create
    let response = gateway
        .http
        .post(format!("{}/ventures", gateway.base_url))
        .bearer_auth(&token)
        .json(&sample_venture())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    // blank names are rejected before persistence
    let mut invalid = sample_venture();
    invalid["name"] = json!("   ");
    let response = gateway
        .http
        .post(format!("{}/ventures", gateway.base_url))
        .bearer_auth(&token)
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // list with a case-insensitive pod substring filter
    let response = gateway
        .http
        .get(format!("{}/ventures?pod=INFRA", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let listing: Value = response.json().await.unwrap();
    assert_eq!(listing["count"], json!(1));
    assert_eq!(listing["results"][0]["name"], json!("PortFlow"));

    // metrics over the single record
    let response = gateway
        .http
        .get(format!("{}/ventures/metrics", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let metrics: Value = response.json().await.unwrap();
    assert_eq!(metrics["total_ventures"], json!(1));
    assert_eq!(metrics["active_ventures"], json!(0));
    assert_eq!(metrics["total_burn_rate"], json!(45_000));
    assert_eq!(metrics["avg_runway"], json!(14));

    // full-record update
    let mut revised = sample_venture();
    revised["status"] = json!("at_risk");
    let response = gateway
        .http
        .put(format!("{}/ventures/{id}", gateway.base_url))
        .bearer_auth(&token)
        .json(&revised)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = gateway
        .http
        .get(format!("{}/ventures/{id}", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["status"], json!("at_risk"));

    // delete, then the id is gone
    let response = gateway
        .http
        .delete(format!("{}/ventures/{id}", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = gateway
        .http
        .get(format!("{}/ventures/{id}", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn generate_random_bulk_creates_ventures() {
    let gateway = spawn_gateway(None).await;
    let token = gateway.login().await;

    let response = gateway
        .http
        .post(format!("{}/ventures/generate_random", gateway.base_url))
        .bearer_auth(&token)
        .json(&json!({ "count": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["created"], json!(5));

    let response = gateway
        .http
        .get(format!("{}/ventures/metrics", gateway.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let metrics: Value = response.json().await.unwrap();
    assert_eq!(metrics["total_ventures"], json!(5));
}

#[tokio::test]
async fn chat_answers_with_normalized_provider_output() {
    let client = Arc::new(ScriptedLlmClient::answering(
        serde_json::from_value(json!(["hello ", { "text": "world" }])).unwrap(),
    ));
    let gateway = spawn_gateway(Some(client.clone())).await;
    let token = gateway.login().await;

    gateway
        .http
        .post(format!("{}/ventures", gateway.base_url))
        .bearer_auth(&token)
        .json(&sample_venture())
        .send()
        .await
        .unwrap();

    let response = gateway
        .http
        .post(format!("{}/ventures/chat", gateway.base_url))
        .bearer_auth(&token)
        .json(&json!({ "question": "How are the ventures doing?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["question"], json!("How are the ventures doing?"));
    assert_eq!(body["answer"], json!("hello world"));
    assert_eq!(body["ventures_analyzed"], json!(1));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_questions_are_rejected_before_the_provider_is_touched() {
    let client = Arc::new(ScriptedLlmClient::answering(AnswerContent::Text(
        "should never be seen".to_string(),
    )));
    let gateway = spawn_gateway(Some(client.clone())).await;
    let token = gateway.login().await;

    for body in [json!({ "question": "   " }), json!({})] {
        let response = gateway
            .http
            .post(format!("{}/ventures/chat", gateway.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_failures_degrade_to_the_fixed_fallback() {
    let client = Arc::new(ScriptedLlmClient::failing());
    let gateway = spawn_gateway(Some(client.clone())).await;
    let token = gateway.login().await;

    let response = gateway
        .http
        .post(format!("{}/ventures/chat", gateway.base_url))
        .bearer_auth(&token)
        .json(&json!({ "question": "What is on fire?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["answer"], json!(PROVIDER_ERROR_FALLBACK));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unconfigured_chat_returns_the_sentinel_notice() {
    let gateway = spawn_gateway(None).await;
    let token = gateway.login().await;

    let response = gateway
        .http
        .post(format!("{}/ventures/chat", gateway.base_url))
        .bearer_auth(&token)
        .json(&json!({ "question": "any question" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["answer"], json!(NOT_CONFIGURED_MESSAGE));
}

#[tokio::test]
async fn health_does_not_require_authentication() {
    let gateway = spawn_gateway(None).await;

    let response = gateway
        .http
        .get(format!("{}/health", gateway.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["chat_configured"], json!(false));
}
