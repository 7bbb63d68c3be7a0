//! SQLite persistence for qubes.

use crate::models::{
    qube::{Qube, QubeSpec, QubeStatus, QubeType},
    zone::ZoneStatus,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;

use super::{DEFAULT_LIST_LIMIT, decode_err, encode_err};

/// Filters for listing qubes. `None` means "any".
#[derive(Clone, Debug)]
pub struct QubeListOptions {
    pub zone_id: Option<String>,
    pub status: Option<QubeStatus>,
    pub qube_type: Option<QubeType>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for QubeListOptions {
    fn default() -> Self {
        Self {
            zone_id: None,
            status: None,
            qube_type: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

#[derive(FromRow)]
struct QubeRow {
    id: String,
    name: String,
    #[sqlx(rename = "type")]
    qube_type: String,
    zone_id: Option<String>,
    status: String,
    spec: String,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QubeRow> for Qube {
    type Error = sqlx::Error;

    fn try_from(row: QubeRow) -> Result<Self, Self::Error> {
        Ok(Qube {
            id: row.id,
            name: row.name,
            qube_type: row.qube_type.parse().map_err(decode_err)?,
            zone_id: row.zone_id,
            status: row.status.parse().map_err(decode_err)?,
            spec: serde_json::from_str::<QubeSpec>(&row.spec).map_err(decode_err)?,
            ip_address: row.ip_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const QUBE_COLUMNS: &str =
    "id, name, type, zone_id, status, spec, ip_address, created_at, updated_at";

/// Row-level access to the `qubes` table. Every method is a single statement.
#[derive(Clone)]
pub struct QubeRepository {
    db: Arc<SqlitePool>,
}

impl QubeRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert the qube if it is unassigned or its zone still exists.
    ///
    /// Returns false when the zone is gone. The existence check is part of the
    /// insert, so a concurrent zone delete either sees this qube (and is
    /// refused) or removes the zone first (and the insert does nothing).
    pub async fn create(&self, qube: &Qube) -> Result<bool, sqlx::Error> {
        let spec = serde_json::to_string(&qube.spec).map_err(encode_err)?;
        let result = sqlx::query(
            "INSERT INTO qubes (id, name, type, zone_id, status, spec, ip_address, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE ? IS NULL OR EXISTS (SELECT 1 FROM zones WHERE id = ?)",
        )
        .bind(&qube.id)
        .bind(&qube.name)
        .bind(qube.qube_type.as_str())
        .bind(qube.zone_id.as_deref())
        .bind(qube.status.as_str())
        .bind(spec)
        .bind(qube.ip_address.as_deref())
        .bind(qube.created_at)
        .bind(qube.updated_at)
        .bind(qube.zone_id.as_deref())
        .bind(qube.zone_id.as_deref())
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Qube>, sqlx::Error> {
        let row = sqlx::query_as::<_, QubeRow>(&format!(
            "SELECT {QUBE_COLUMNS} FROM qubes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        row.map(Qube::try_from).transpose()
    }

    /// Newest first; insertion order breaks timestamp ties.
    pub async fn list(&self, opts: &QubeListOptions) -> Result<Vec<Qube>, sqlx::Error> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {QUBE_COLUMNS} FROM qubes WHERE 1=1"));

        if let Some(zone_id) = &opts.zone_id {
            builder.push(" AND zone_id = ");
            builder.push_bind(zone_id.clone());
        }
        if let Some(status) = opts.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(qube_type) = opts.qube_type {
            builder.push(" AND type = ");
            builder.push_bind(qube_type.as_str());
        }

        builder.push(" ORDER BY created_at DESC, rowid DESC LIMIT ");
        builder.push_bind(i64::from(opts.limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(opts.offset));

        let rows: Vec<QubeRow> = builder.build_query_as().fetch_all(&*self.db).await?;
        rows.into_iter().map(Qube::try_from).collect()
    }

    /// Write name and spec only. Status and address have their own statements,
    /// so a concurrent start/stop or IP assignment is never reverted.
    pub async fn update(&self, qube: &Qube) -> Result<bool, sqlx::Error> {
        let spec = serde_json::to_string(&qube.spec).map_err(encode_err)?;
        let result = sqlx::query("UPDATE qubes SET name = ?, spec = ?, updated_at = ? WHERE id = ?")
            .bind(&qube.name)
            .bind(spec)
            .bind(qube.updated_at)
            .bind(&qube.id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: QubeStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE qubes SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(at)
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_ip_address(
        &self,
        id: &str,
        ip_address: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE qubes SET ip_address = ?, updated_at = ? WHERE id = ?")
            .bind(ip_address)
            .bind(at)
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the qube running only while its zone exists and is connected.
    ///
    /// The zone check and the write happen in one statement, so a concurrent
    /// disconnect or zone delete cannot slip between them.
    pub async fn start_if_zone_connected(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE qubes SET status = ?, updated_at = ?
             WHERE id = ?
               AND zone_id IN (SELECT id FROM zones WHERE status = ?)",
        )
        .bind(QubeStatus::Running.as_str())
        .bind(at)
        .bind(id)
        .bind(ZoneStatus::Connected.as_str())
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the qube unless it is running. Returns false if it is missing or running.
    pub async fn delete_if_not_running(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qubes WHERE id = ? AND status != ?")
            .bind(id)
            .bind(QubeStatus::Running.as_str())
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
