//! Management console backend for zones (infrastructure connections) and
//! qubes (virtual machines hosted in them).

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Assemble the full application: routes, state, and HTTP middleware.
///
/// Requests that exceed `request_timeout` are answered with 408 and their
/// handler future is dropped, which cancels any in-flight query.
pub fn app(state: state::AppState, cfg: &config::AppConfig) -> Router {
    routes::routes::routes()
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            cfg.request_timeout,
        ))
        .layer(cors_layer(cfg))
        .layer(TraceLayer::new_for_http())
}

/// Router with test-friendly defaults.
pub fn app_with_defaults(state: state::AppState) -> Router {
    let cfg = config::AppConfig {
        host: "127.0.0.1".into(),
        port: 8080,
        database_url: "sqlite::memory:".into(),
        max_connections: 1,
        request_timeout: Duration::from_secs(30),
        cors_origins: vec!["*".into()],
    };
    app(state, &cfg)
}

fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cfg.cors_allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("ignoring invalid CORS origin {}: {}", origin, err);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
