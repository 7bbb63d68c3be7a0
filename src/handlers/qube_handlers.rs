//! HTTP handlers for qube operations, delegating to `QubeService`.

use crate::{
    errors::AppError,
    models::qube::{Qube, QubeCreateRequest, QubeStatus, QubeType, QubeUpdateRequest},
    repositories::{DEFAULT_LIST_LIMIT, QubeListOptions},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Query params accepted by `GET /api/v1/qubes`.
#[derive(Debug, Deserialize)]
pub struct ListQubesQuery {
    pub zone_id: Option<String>,
    pub status: Option<QubeStatus>,
    #[serde(rename = "type")]
    pub qube_type: Option<QubeType>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListQubesQuery> for QubeListOptions {
    fn from(q: ListQubesQuery) -> Self {
        Self {
            zone_id: q.zone_id.filter(|id| !id.is_empty()),
            status: q.status,
            qube_type: q.qube_type,
            limit: q.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            offset: q.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListQubesResponse {
    pub qubes: Vec<Qube>,
    pub total: usize,
}

/// Body of `PUT /api/v1/qubes/{id}/ip`.
#[derive(Debug, Deserialize)]
pub struct AssignIpRequest {
    pub ip_address: String,
}

/// GET `/api/v1/qubes`
pub async fn list_qubes(
    State(state): State<AppState>,
    Query(q): Query<ListQubesQuery>,
) -> Result<Json<ListQubesResponse>, AppError> {
    let qubes = state.qubes.list(&q.into()).await?;
    Ok(Json(ListQubesResponse {
        total: qubes.len(),
        qubes,
    }))
}

/// GET `/api/v1/qubes/{id}`
pub async fn get_qube(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Qube>, AppError> {
    Ok(Json(state.qubes.get_by_id(&id).await?))
}

/// POST `/api/v1/qubes`
pub async fn create_qube(
    State(state): State<AppState>,
    payload: Result<Json<QubeCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let qube = state.qubes.create(req).await?;
    Ok((StatusCode::CREATED, Json(qube)))
}

/// PUT `/api/v1/qubes/{id}`
pub async fn update_qube(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QubeUpdateRequest>, JsonRejection>,
) -> Result<Json<Qube>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(state.qubes.update(&id, req).await?))
}

/// DELETE `/api/v1/qubes/{id}`: the qube must be stopped.
pub async fn delete_qube(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.qubes.delete(&id).await?;
    Ok(Json(json!({ "message": "qube deleted" })))
}

/// POST `/api/v1/qubes/{id}/start`
pub async fn start_qube(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Qube>, AppError> {
    Ok(Json(state.qubes.start(&id).await?))
}

/// POST `/api/v1/qubes/{id}/stop`
pub async fn stop_qube(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Qube>, AppError> {
    Ok(Json(state.qubes.stop(&id).await?))
}

/// PUT `/api/v1/qubes/{id}/ip`
pub async fn assign_qube_ip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignIpRequest>, JsonRejection>,
) -> Result<Json<Qube>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(state.qubes.assign_ip(&id, &req.ip_address).await?))
}
