//! HTTP handlers for zone operations. Each handler delegates to `ZoneService`
//! and serializes the result as JSON.

use crate::{
    errors::AppError,
    models::zone::{Zone, ZoneCreateRequest, ZoneStatus, ZoneType, ZoneUpdateRequest},
    repositories::{DEFAULT_LIST_LIMIT, ZoneListOptions},
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

/// Query params accepted by `GET /api/v1/zones`.
#[derive(Debug, Deserialize)]
pub struct ListZonesQuery {
    pub status: Option<ZoneStatus>,
    #[serde(rename = "type")]
    pub zone_type: Option<ZoneType>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListZonesQuery> for ZoneListOptions {
    fn from(q: ListZonesQuery) -> Self {
        Self {
            status: q.status,
            zone_type: q.zone_type,
            limit: q.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            offset: q.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListZonesResponse {
    pub zones: Vec<Zone>,
    pub total: usize,
}

/// GET `/api/v1/zones`
pub async fn list_zones(
    State(state): State<AppState>,
    Query(q): Query<ListZonesQuery>,
) -> Result<Json<ListZonesResponse>, AppError> {
    let zones = state.zones.list(&q.into()).await?;
    Ok(Json(ListZonesResponse {
        total: zones.len(),
        zones,
    }))
}

/// GET `/api/v1/zones/{id}`
pub async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Zone>, AppError> {
    Ok(Json(state.zones.get_by_id(&id).await?))
}

/// POST `/api/v1/zones`
pub async fn create_zone(
    State(state): State<AppState>,
    payload: Result<Json<ZoneCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let zone = state.zones.create(req).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

/// PUT `/api/v1/zones/{id}`
pub async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ZoneUpdateRequest>, JsonRejection>,
) -> Result<Json<Zone>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(state.zones.update(&id, req).await?))
}

/// DELETE `/api/v1/zones/{id}`: refused while any qube references the zone.
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.zones.delete(&id).await?;
    Ok(Json(json!({ "message": "zone deleted" })))
}

/// POST `/api/v1/zones/{id}/connect`
pub async fn connect_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Zone>, AppError> {
    Ok(Json(state.zones.connect(&id).await?))
}

/// POST `/api/v1/zones/{id}/disconnect`
pub async fn disconnect_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Zone>, AppError> {
    Ok(Json(state.zones.disconnect(&id).await?))
}
