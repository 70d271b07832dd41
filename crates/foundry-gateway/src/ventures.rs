//! Venture CRUD, metrics, fixture, and chat handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use foundry_store::{OrderField, StoreError, VentureQuery};
use foundry_ventures::{summarize, VentureDraft};
use tracing::error;

use crate::auth::authorize_request;
use crate::error::ApiError;
use crate::types::{
    ChatRequestBody, ChatResponseBody, GenerateRandomRequest, GenerateRandomResponse,
    VentureListParams, VentureListResponse,
};
use crate::GatewayState;

const DEFAULT_GENERATE_COUNT: u64 = 20;

fn store_failure(cause: StoreError) -> ApiError {
    error!(%cause, "venture store request failed");
    ApiError::internal("venture store request failed")
}

/// Translates the query string into a store query, rejecting unknown
/// ordering fields. Blank filter values are treated as absent.
fn parse_store_query(params: &VentureListParams) -> Result<VentureQuery, ApiError> {
    let mut query = VentureQuery {
        pod: non_blank(params.pod.as_deref()),
        stage: non_blank(params.stage.as_deref()),
        status: non_blank(params.status.as_deref()),
        ..VentureQuery::default()
    };

    if let Some(ordering) = non_blank(params.ordering.as_deref()) {
        let (field, descending) = match ordering.strip_prefix('-') {
            Some(field) => (field, true),
            None => (ordering.as_str(), false),
        };
        let Some(order_by) = OrderField::parse(field) else {
            return Err(ApiError::bad_request(
                "invalid_ordering",
                format!("unknown ordering field '{field}'"),
            ));
        };
        query.order_by = order_by;
        query.descending = descending;
    }

    Ok(query)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) async fn handle_list_ventures(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Query(params): Query<VentureListParams>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let query = parse_store_query(&params)?;

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::bad_request("invalid_page", "page starts at 1"));
    }
    let page_size = params
        .page_size
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);

    let ventures = state.store.list(&query).map_err(store_failure)?;
    let count = ventures.len() as u64;
    let offset = (page - 1).saturating_mul(page_size);
    let results = ventures
        .into_iter()
        .skip(offset as usize)
        .take(page_size as usize)
        .collect();

    Ok((
        StatusCode::OK,
        Json(VentureListResponse {
            count,
            page,
            page_size,
            results,
        }),
    )
        .into_response())
}

pub(crate) async fn handle_create_venture(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(draft): Json<VentureDraft>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    draft
        .validate()
        .map_err(|cause| ApiError::bad_request("invalid_venture", cause.to_string()))?;

    let created = state.store.create(&draft).map_err(store_failure)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub(crate) async fn handle_get_venture(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let venture = state
        .store
        .get(id)
        .map_err(store_failure)?
        .ok_or_else(|| ApiError::not_found(format!("no venture with id {id}")))?;
    Ok((StatusCode::OK, Json(venture)).into_response())
}

pub(crate) async fn handle_update_venture(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(draft): Json<VentureDraft>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    draft
        .validate()
        .map_err(|cause| ApiError::bad_request("invalid_venture", cause.to_string()))?;

    let updated = state
        .store
        .update(id, &draft)
        .map_err(store_failure)?
        .ok_or_else(|| ApiError::not_found(format!("no venture with id {id}")))?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub(crate) async fn handle_delete_venture(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let removed = state.store.delete(id).map_err(store_failure)?;
    if !removed {
        return Err(ApiError::not_found(format!("no venture with id {id}")));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn handle_metrics(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Query(params): Query<VentureListParams>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let query = parse_store_query(&params)?;
    let ventures = state.store.list(&query).map_err(store_failure)?;
    Ok((StatusCode::OK, Json(summarize(&ventures))).into_response())
}

pub(crate) async fn handle_generate_random(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(request): Json<GenerateRandomRequest>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let count = request.count.unwrap_or(DEFAULT_GENERATE_COUNT);
    if count > state.config.max_generate_count {
        return Err(ApiError::bad_request(
            "count_too_large",
            format!(
                "cannot generate more than {} ventures per request",
                state.config.max_generate_count
            ),
        ));
    }

    let drafts = foundry_fixtures::generate_ventures(count as usize);
    let created = state.store.create_batch(&drafts).map_err(store_failure)?;
    Ok((
        StatusCode::CREATED,
        Json(GenerateRandomResponse {
            message: format!("{created} random ventures generated successfully!"),
            created,
        }),
    )
        .into_response())
}

pub(crate) async fn handle_chat(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequestBody>,
) -> Result<Response, ApiError> {
    authorize_request(&state, &headers)?;
    let question = request.question.as_deref().unwrap_or("").trim().to_string();
    if question.is_empty() {
        return Err(ApiError::bad_request(
            "question_required",
            "question is required",
        ));
    }

    let ventures = state
        .store
        .list(&VentureQuery::default())
        .map_err(store_failure)?;
    let answer = state.chat.answer(&question, &ventures).await;

    Ok((
        StatusCode::OK,
        Json(ChatResponseBody {
            question,
            answer,
            ventures_analyzed: ventures.len() as u64,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_strings_parse_with_optional_descending_prefix() {
        let params = VentureListParams {
            ordering: Some("-last_update".to_string()),
            ..VentureListParams::default()
        };
        let query = parse_store_query(&params).unwrap();
        assert_eq!(query.order_by, OrderField::LastUpdate);
        assert!(query.descending);

        let params = VentureListParams {
            ordering: Some("name".to_string()),
            ..VentureListParams::default()
        };
        let query = parse_store_query(&params).unwrap();
        assert_eq!(query.order_by, OrderField::Name);
        assert!(!query.descending);
    }

    #[test]
    fn unknown_ordering_fields_are_rejected() {
        let params = VentureListParams {
            ordering: Some("founder".to_string()),
            ..VentureListParams::default()
        };
        let result = parse_store_query(&params);
        assert!(result.is_err());
    }

    #[test]
    fn blank_filters_are_treated_as_absent() {
        let params = VentureListParams {
            pod: Some("   ".to_string()),
            status: Some("risk".to_string()),
            ..VentureListParams::default()
        };
        let query = parse_store_query(&params).unwrap();
        assert!(query.pod.is_none());
        assert_eq!(query.status.as_deref(), Some("risk"));
    }
}
