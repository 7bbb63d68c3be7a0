//! Defines routes for all zone and qube operations.
//!
//! ## Structure
//! - **Zone endpoints** (`/api/v1/zones`)
//!   - `GET    /zones`: list zones (supports status, type, limit, offset)
//!   - `POST   /zones`: create zone
//!   - `GET    /zones/{id}`: fetch zone
//!   - `PUT    /zones/{id}`: update name/config
//!   - `DELETE /zones/{id}`: delete an unreferenced zone
//!   - `POST   /zones/{id}/connect`, `/disconnect`: toggle connectivity
//!
//! - **Qube endpoints** (`/api/v1/qubes`)
//!   - `GET    /qubes`: list qubes (supports zone_id, status, type, limit, offset)
//!   - `POST   /qubes`: create qube
//!   - `GET    /qubes/{id}`, `PUT`, `DELETE`: fetch, update, delete
//!   - `POST   /qubes/{id}/start`, `/stop`: lifecycle transitions
//!   - `PUT    /qubes/{id}/ip`: record the platform-assigned address
//!
//! Health probes are mounted at the root.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        qube_handlers::{
            assign_qube_ip, create_qube, delete_qube, get_qube, list_qubes, start_qube, stop_qube,
            update_qube,
        },
        zone_handlers::{
            connect_zone, create_zone, delete_zone, disconnect_zone, get_zone, list_zones,
            update_zone,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build the router for the console API.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Zone routes
        .route("/zones", get(list_zones).post(create_zone))
        .route(
            "/zones/{id}",
            get(get_zone).put(update_zone).delete(delete_zone),
        )
        .route("/zones/{id}/connect", post(connect_zone))
        .route("/zones/{id}/disconnect", post(disconnect_zone))
        // Qube routes
        .route("/qubes", get(list_qubes).post(create_qube))
        .route(
            "/qubes/{id}",
            get(get_qube).put(update_qube).delete(delete_qube),
        )
        .route("/qubes/{id}/start", post(start_qube))
        .route("/qubes/{id}/stop", post(stop_qube))
        .route("/qubes/{id}/ip", put(assign_qube_ip))
}
