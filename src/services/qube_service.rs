//! QubeService: qube creation with spec defaults, and start/stop gated by
//! zone connectivity.

use crate::{
    models::{
        qube::{Qube, QubeCreateRequest, QubeStatus, QubeType, QubeUpdateRequest},
        zone::{Zone, ZoneStatus},
    },
    repositories::{QubeListOptions, QubeRepository, ZoneRepository},
};
use chrono::Utc;
use std::net::IpAddr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult, require_name};

/// Qube lifecycle operations over the qube and zone repositories.
#[derive(Clone)]
pub struct QubeService {
    qubes: QubeRepository,
    zones: ZoneRepository,
}

impl QubeService {
    pub fn new(qubes: QubeRepository, zones: ZoneRepository) -> Self {
        Self { qubes, zones }
    }

    /// Create a stopped qube, optionally assigned to an existing zone.
    ///
    /// Zero-valued resources in the requested spec are filled from the
    /// defaults of the qube type; everything else is kept as given.
    pub async fn create(&self, req: QubeCreateRequest) -> ServiceResult<Qube> {
        let name = require_name(&req.name, "qube")?;
        let qube_type: QubeType = req
            .qube_type
            .parse()
            .map_err(|_| ServiceError::InvalidQubeType(req.qube_type.clone()))?;

        let zone_id = req
            .zone_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(zone_id) = &zone_id {
            self.fetch_zone(zone_id).await?;
        }

        let now = Utc::now();
        let qube = Qube {
            id: Uuid::new_v4().to_string(),
            name,
            qube_type,
            zone_id,
            status: QubeStatus::Stopped,
            spec: req.spec.with_defaults_for(qube_type),
            ip_address: None,
            created_at: now,
            updated_at: now,
        };

        if !self.qubes.create(&qube).await? {
            return Err(ServiceError::ZoneNotFound(
                qube.zone_id.unwrap_or_default(),
            ));
        }
        info!(qube_id = %qube.id, qube_type = %qube.qube_type, zone_id = ?qube.zone_id, "qube created");
        Ok(qube)
    }

    /// A missing row is `QubeNotFound`; a failing store stays `Storage` (500), not 404.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Qube> {
        self.fetch(id).await
    }

    pub async fn list(&self, opts: &QubeListOptions) -> ServiceResult<Vec<Qube>> {
        Ok(self.qubes.list(opts).await?)
    }

    /// Apply the provided name and spec. The spec is replaced as given;
    /// type defaults only apply at creation.
    pub async fn update(&self, id: &str, req: QubeUpdateRequest) -> ServiceResult<Qube> {
        let name = req
            .name
            .as_deref()
            .map(|name| require_name(name, "qube"))
            .transpose()?;

        let mut qube = self.fetch(id).await?;
        if let Some(name) = name {
            qube.name = name;
        }
        if let Some(spec) = req.spec {
            qube.spec = spec;
        }
        qube.updated_at = Utc::now();

        if !self.qubes.update(&qube).await? {
            return Err(ServiceError::QubeNotFound(id.to_string()));
        }
        debug!(qube_id = %id, "qube updated");
        // Status and address may have moved since the read; return what is stored.
        self.fetch(id).await
    }

    /// Remove a qube. Running qubes must be stopped first.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let qube = self.fetch(id).await?;
        if qube.status == QubeStatus::Running {
            return Err(ServiceError::QubeNotStopped(id.to_string()));
        }

        if !self.qubes.delete_if_not_running(id).await? {
            // Started or removed by a concurrent request since the read above.
            return match self.qubes.get_by_id(id).await? {
                None => Err(ServiceError::QubeNotFound(id.to_string())),
                Some(_) => Err(ServiceError::QubeNotStopped(id.to_string())),
            };
        }
        info!(qube_id = %id, "qube deleted");
        Ok(())
    }

    /// Transition to `running`. Requires the qube's zone to exist and be connected;
    /// an unassigned qube can never start.
    pub async fn start(&self, id: &str) -> ServiceResult<Qube> {
        let qube = self.fetch(id).await?;
        self.verify_zone_connected(&qube).await?;

        if !self.qubes.start_if_zone_connected(id, Utc::now()).await? {
            // The qube or its zone changed after the check. Re-check once and
            // retry; a zone that flaps again is reported as disconnected.
            warn!(qube_id = %id, "qube start lost a race with a concurrent change");
            let qube = self.fetch(id).await?;
            self.verify_zone_connected(&qube).await?;
            if !self.qubes.start_if_zone_connected(id, Utc::now()).await? {
                return Err(ServiceError::ZoneDisconnected(
                    qube.zone_id.unwrap_or_default(),
                ));
            }
        }

        info!(qube_id = %id, zone_id = ?qube.zone_id, "qube started");
        self.fetch(id).await
    }

    /// Transition to `stopped`. Never gated on the zone; idempotent.
    pub async fn stop(&self, id: &str) -> ServiceResult<Qube> {
        if !self
            .qubes
            .update_status(id, QubeStatus::Stopped, Utc::now())
            .await?
        {
            return Err(ServiceError::QubeNotFound(id.to_string()));
        }
        info!(qube_id = %id, "qube stopped");
        self.fetch(id).await
    }

    /// Record the address the hosting platform assigned to this qube.
    pub async fn assign_ip(&self, id: &str, ip_address: &str) -> ServiceResult<Qube> {
        let ip: IpAddr = ip_address.trim().parse().map_err(|_| {
            ServiceError::InvalidInput(format!("invalid ip address `{}`", ip_address))
        })?;

        if !self
            .qubes
            .update_ip_address(id, &ip.to_string(), Utc::now())
            .await?
        {
            return Err(ServiceError::QubeNotFound(id.to_string()));
        }
        debug!(qube_id = %id, %ip, "qube ip assigned");
        self.fetch(id).await
    }

    async fn verify_zone_connected(&self, qube: &Qube) -> ServiceResult<()> {
        let Some(zone_id) = qube.zone_id.as_deref() else {
            return Err(ServiceError::ZoneNotFound(String::new()));
        };
        let zone = self.fetch_zone(zone_id).await?;
        if zone.status != ZoneStatus::Connected {
            return Err(ServiceError::ZoneDisconnected(zone.id));
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> ServiceResult<Qube> {
        self.qubes
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::QubeNotFound(id.to_string()))
    }

    async fn fetch_zone(&self, id: &str) -> ServiceResult<Zone> {
        self.zones
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::ZoneNotFound(id.to_string()))
    }
}
