//! Request/response bodies for the gateway endpoints.

use foundry_ventures::Venture;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Query string accepted by `GET /ventures` and `GET /ventures/metrics`.
#[derive(Debug, Default, Deserialize)]
pub struct VentureListParams {
    pub pod: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct VentureListResponse {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<Venture>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRandomRequest {
    pub count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateRandomResponse {
    pub message: String,
    pub created: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub question: String,
    pub answer: String,
    pub ventures_analyzed: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ventures: u64,
    pub chat_configured: bool,
}
