//! ZoneService: zone creation, deletion safety, and connect/disconnect.

use crate::{
    models::zone::{Zone, ZoneCreateRequest, ZoneStatus, ZoneType, ZoneUpdateRequest},
    repositories::{QubeListOptions, QubeRepository, ZoneListOptions, ZoneRepository},
};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ServiceError, ServiceResult, require_name};

/// Zone lifecycle operations over the zone and qube repositories.
#[derive(Clone)]
pub struct ZoneService {
    zones: ZoneRepository,
    qubes: QubeRepository,
}

impl ZoneService {
    pub fn new(zones: ZoneRepository, qubes: QubeRepository) -> Self {
        Self { zones, qubes }
    }

    /// Create a disconnected zone.
    ///
    /// Name and type are validated before anything is written.
    pub async fn create(&self, req: ZoneCreateRequest) -> ServiceResult<Zone> {
        let name = require_name(&req.name, "zone")?;
        let zone_type: ZoneType = req
            .zone_type
            .parse()
            .map_err(|_| ServiceError::InvalidZoneType(req.zone_type.clone()))?;

        let now = Utc::now();
        let zone = Zone {
            id: Uuid::new_v4().to_string(),
            name,
            zone_type,
            status: ZoneStatus::Disconnected,
            config: req.config,
            created_at: now,
            updated_at: now,
        };

        self.zones.create(&zone).await?;
        info!(zone_id = %zone.id, zone_type = %zone.zone_type, "zone created");
        Ok(zone)
    }

    /// A missing row is `ZoneNotFound`; a failing store stays `Storage` (500), not 404.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Zone> {
        self.fetch(id).await
    }

    pub async fn list(&self, opts: &ZoneListOptions) -> ServiceResult<Vec<Zone>> {
        Ok(self.zones.list(opts).await?)
    }

    /// Apply the provided fields; absent fields keep their values.
    pub async fn update(&self, id: &str, req: ZoneUpdateRequest) -> ServiceResult<Zone> {
        let name = req
            .name
            .as_deref()
            .map(|name| require_name(name, "zone"))
            .transpose()?;

        let mut zone = self.fetch(id).await?;
        if let Some(name) = name {
            zone.name = name;
        }
        if let Some(config) = req.config {
            zone.config = config;
        }
        zone.updated_at = Utc::now();

        if !self.zones.update(&zone).await? {
            return Err(ServiceError::ZoneNotFound(id.to_string()));
        }
        debug!(zone_id = %id, "zone updated");
        // Status may have moved since the read; return what is stored.
        self.fetch(id).await
    }

    /// Permanently remove a zone that no qube references.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.fetch(id).await?;
        self.ensure_unreferenced(id).await?;

        if !self.zones.delete_if_unreferenced(id).await? {
            // A qube was assigned or the zone vanished since the checks above.
            return match self.zones.get_by_id(id).await? {
                None => Err(ServiceError::ZoneNotFound(id.to_string())),
                Some(_) => Err(ServiceError::ZoneInUse(id.to_string())),
            };
        }
        info!(zone_id = %id, "zone deleted");
        Ok(())
    }

    pub async fn connect(&self, id: &str) -> ServiceResult<Zone> {
        self.set_status(id, ZoneStatus::Connected).await
    }

    pub async fn disconnect(&self, id: &str) -> ServiceResult<Zone> {
        self.set_status(id, ZoneStatus::Disconnected).await
    }

    /// Idempotent: setting the current status again is not an error.
    async fn set_status(&self, id: &str, status: ZoneStatus) -> ServiceResult<Zone> {
        if !self.zones.update_status(id, status, Utc::now()).await? {
            return Err(ServiceError::ZoneNotFound(id.to_string()));
        }
        info!(zone_id = %id, status = %status, "zone status changed");
        self.fetch(id).await
    }

    async fn ensure_unreferenced(&self, id: &str) -> ServiceResult<()> {
        let opts = QubeListOptions {
            zone_id: Some(id.to_string()),
            limit: 1,
            ..Default::default()
        };
        if !self.qubes.list(&opts).await?.is_empty() {
            return Err(ServiceError::ZoneInUse(id.to_string()));
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> ServiceResult<Zone> {
        self.zones
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::ZoneNotFound(id.to_string()))
    }
}
