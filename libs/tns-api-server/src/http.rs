use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use tns_api::TopicRecord;

use super::AppState;
use super::error::ApiError;

/// Ack body for update/delete: `{"result": "success"}`.
#[derive(Serialize)]
struct Ack {
    result: &'static str,
}

const SUCCESS: Ack = Ack { result: "success" };

/// Decode a topic record from a request body. The content type is not
/// checked; anything that is not a JSON object with a string `topic`
/// is rejected.
fn decode_record(body: Result<Bytes, BytesRejection>) -> Result<TopicRecord, ApiError> {
    serde_json::from_slice(&body?).map_err(|e| {
        tracing::debug!(error = %e, "undecodable topic payload");
        ApiError::InvalidPayload
    })
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/v1/tns/topic
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_topics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.registry.find_all().await?;
    Ok(axum::Json(records))
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /api/v1/tns/topic
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_register_topic(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let candidate = decode_record(body)?;
    let record = state.registry.register(candidate).await?;
    Ok((StatusCode::CREATED, axum::Json(record)))
}

// ═══════════════════════════════════════════════════════════════
//  REST: PUT /api/v1/tns/topic  (resolve by payload, read-only)
// ═══════════════════════════════════════════════════════════════

/// Legacy resolution verb: looks the payload's `topic` up and returns
/// the stored record. Never writes; `GET /topic/{topic}` is the
/// canonical form.
pub(crate) async fn handle_resolve_topic(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = decode_record(body)?;
    let record = state.registry.discover_topic(&query.topic).await?;
    Ok(axum::Json(record))
}

// ═══════════════════════════════════════════════════════════════
//  REST: PATCH /api/v1/tns/topic
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_update_topic(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let record = decode_record(body)?;
    state.registry.update(record).await?;
    Ok(axum::Json(SUCCESS))
}

// ═══════════════════════════════════════════════════════════════
//  REST: DELETE /api/v1/tns/topic
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_delete_topic(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let record = decode_record(body)?;
    state.registry.delete(&record).await?;
    Ok(axum::Json(SUCCESS))
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/v1/tns/topic/{*topic}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_discover_topic(
    State(state): State<AppState>,
    topic: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(topic) = topic?;
    let record = state.registry.discover_topic(&topic).await?;
    Ok(axum::Json(record))
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/v1/tns/id/{id}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_find_by_id(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let record = state.registry.find_by_id(&id).await?;
    Ok(axum::Json(record))
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /api/v1/tns/health
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_topic_healthcheck() -> ApiError {
    ApiError::NotImplemented
}
