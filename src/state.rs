//! Shared application state handed to every handler.

use crate::{
    repositories::{QubeRepository, ZoneRepository},
    services::{QubeService, ZoneService},
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Shared SQLite pool; used directly only by the readiness probe.
    pub db: Arc<SqlitePool>,
    pub zones: ZoneService,
    pub qubes: QubeService,
}

impl AppState {
    /// Wire repositories and services over one pool.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        let zone_repo = ZoneRepository::new(db.clone());
        let qube_repo = QubeRepository::new(db.clone());

        Self {
            zones: ZoneService::new(zone_repo.clone(), qube_repo.clone()),
            qubes: QubeService::new(qube_repo, zone_repo),
            db,
        }
    }
}
