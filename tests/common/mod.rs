#![allow(dead_code)]

use qube_console::{
    db,
    models::{
        qube::{Qube, QubeCreateRequest, QubeSpec},
        zone::{Zone, ZoneConfig, ZoneCreateRequest},
    },
    state::AppState,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Fresh in-memory database with both services wired over it.
pub async fn setup() -> AppState {
    let pool = db::connect_in_memory()
        .await
        .expect("in-memory database should open");
    AppState::new(Arc::new(pool))
}

/// File-backed database behind a multi-connection pool, for tests that race
/// operations against each other. The pool only lives as long as the `TempDir`.
pub async fn setup_file_backed() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let url = format!("sqlite://{}", dir.path().join("qubes-air.db").display());
    let pool = db::connect(&url, 8)
        .await
        .expect("file database should open");
    db::run_migrations(&pool)
        .await
        .expect("migrations should apply");
    (AppState::new(Arc::new(pool)), dir)
}

pub fn zone_request(name: &str, zone_type: &str) -> ZoneCreateRequest {
    ZoneCreateRequest {
        name: name.to_string(),
        zone_type: zone_type.to_string(),
        config: ZoneConfig::default(),
    }
}

pub fn qube_request(name: &str, qube_type: &str, zone_id: Option<&str>) -> QubeCreateRequest {
    QubeCreateRequest {
        name: name.to_string(),
        qube_type: qube_type.to_string(),
        zone_id: zone_id.map(str::to_string),
        spec: QubeSpec::default(),
    }
}

pub async fn create_zone(state: &AppState, name: &str) -> Zone {
    state
        .zones
        .create(zone_request(name, "proxmox"))
        .await
        .expect("zone should be created")
}

pub async fn create_connected_zone(state: &AppState, name: &str) -> Zone {
    let zone = create_zone(state, name).await;
    state
        .zones
        .connect(&zone.id)
        .await
        .expect("zone should connect")
}

pub async fn create_qube_in(state: &AppState, name: &str, zone_id: &str) -> Qube {
    state
        .qubes
        .create(qube_request(name, "app", Some(zone_id)))
        .await
        .expect("qube should be created")
}
