//! Bearer authorization and credential issuance handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use foundry_auth::{AuthError, TokenClaims, TokenKind};
use foundry_core::current_unix_timestamp;
use tracing::warn;

use crate::error::ApiError;
use crate::types::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use crate::GatewayState;

fn bearer_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?;
    let raw = header.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Requires a valid access token on the request. Every venture and chat
/// endpoint calls this before touching the store.
pub(crate) fn authorize_request(
    state: &GatewayState,
    headers: &HeaderMap,
) -> Result<TokenClaims, ApiError> {
    let Some(token) = bearer_token_from_headers(headers) else {
        return Err(ApiError::unauthorized(
            "unauthorized",
            "missing or invalid bearer token",
        ));
    };

    state
        .authority
        .verify(&token, TokenKind::Access, current_unix_timestamp())
        .map_err(|error| match error {
            AuthError::Expired => {
                ApiError::unauthorized("token_expired", "access token is expired")
            }
            _ => ApiError::unauthorized("unauthorized", "missing or invalid bearer token"),
        })
}

pub(crate) async fn handle_login(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state
        .credentials
        .matches(&request.username, &request.password)
    {
        warn!(username = %request.username, "rejected login attempt");
        return Err(ApiError::unauthorized(
            "invalid_credentials",
            "username or password is incorrect",
        ));
    }

    let pair = state
        .authority
        .issue_pair(&request.username, current_unix_timestamp())
        .map_err(|_| ApiError::internal("failed to issue tokens"))?;
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            access: pair.access,
            refresh: pair.refresh,
        }),
    )
        .into_response())
}

pub(crate) async fn handle_refresh(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Response, ApiError> {
    let now_unix = current_unix_timestamp();
    let claims = state
        .authority
        .verify(&request.refresh, TokenKind::Refresh, now_unix)
        .map_err(|error| match error {
            AuthError::Expired => {
                ApiError::unauthorized("token_expired", "refresh token is expired")
            }
            _ => ApiError::unauthorized("unauthorized", "refresh token is invalid"),
        })?;

    let access = state
        .authority
        .issue(&claims.sub, TokenKind::Access, now_unix)
        .map_err(|_| ApiError::internal("failed to issue tokens"))?;
    Ok((StatusCode::OK, Json(RefreshResponse { access })).into_response())
}
