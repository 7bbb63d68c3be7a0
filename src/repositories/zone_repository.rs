//! SQLite persistence for zones.

use crate::models::zone::{Zone, ZoneConfig, ZoneStatus, ZoneType};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;

use super::{DEFAULT_LIST_LIMIT, decode_err, encode_err};

/// Filters for listing zones. `None` means "any".
#[derive(Clone, Debug)]
pub struct ZoneListOptions {
    pub status: Option<ZoneStatus>,
    pub zone_type: Option<ZoneType>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ZoneListOptions {
    fn default() -> Self {
        Self {
            status: None,
            zone_type: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Raw `zones` row; enum and JSON columns are decoded in `TryFrom`.
#[derive(FromRow)]
struct ZoneRow {
    id: String,
    name: String,
    #[sqlx(rename = "type")]
    zone_type: String,
    status: String,
    config: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ZoneRow> for Zone {
    type Error = sqlx::Error;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        Ok(Zone {
            id: row.id,
            name: row.name,
            zone_type: row.zone_type.parse().map_err(decode_err)?,
            status: row.status.parse().map_err(decode_err)?,
            config: serde_json::from_str::<ZoneConfig>(&row.config).map_err(decode_err)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ZONE_COLUMNS: &str = "id, name, type, status, config, created_at, updated_at";

/// Row-level access to the `zones` table. Every method is a single statement.
#[derive(Clone)]
pub struct ZoneRepository {
    db: Arc<SqlitePool>,
}

impl ZoneRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn create(&self, zone: &Zone) -> Result<(), sqlx::Error> {
        let config = serde_json::to_string(&zone.config).map_err(encode_err)?;
        sqlx::query(
            "INSERT INTO zones (id, name, type, status, config, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&zone.id)
        .bind(&zone.name)
        .bind(zone.zone_type.as_str())
        .bind(zone.status.as_str())
        .bind(config)
        .bind(zone.created_at)
        .bind(zone.updated_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Zone>, sqlx::Error> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        row.map(Zone::try_from).transpose()
    }

    /// Newest first; insertion order breaks timestamp ties.
    pub async fn list(&self, opts: &ZoneListOptions) -> Result<Vec<Zone>, sqlx::Error> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ZONE_COLUMNS} FROM zones WHERE 1=1"));

        if let Some(status) = opts.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(zone_type) = opts.zone_type {
            builder.push(" AND type = ");
            builder.push_bind(zone_type.as_str());
        }

        builder.push(" ORDER BY created_at DESC, rowid DESC LIMIT ");
        builder.push_bind(i64::from(opts.limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(opts.offset));

        let rows: Vec<ZoneRow> = builder.build_query_as().fetch_all(&*self.db).await?;
        rows.into_iter().map(Zone::try_from).collect()
    }

    /// Write name and config. Status is left alone so a concurrent
    /// connect/disconnect is never overwritten. Returns false when the row is gone.
    pub async fn update(&self, zone: &Zone) -> Result<bool, sqlx::Error> {
        let config = serde_json::to_string(&zone.config).map_err(encode_err)?;
        let result = sqlx::query(
            "UPDATE zones SET name = ?, config = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&zone.name)
        .bind(config)
        .bind(zone.updated_at)
        .bind(&zone.id)
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: ZoneStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE zones SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(at)
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the zone only if no qube references it, in one statement.
    ///
    /// Returns false if the zone is missing or still referenced; the caller
    /// tells the two apart.
    pub async fn delete_if_unreferenced(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM zones
             WHERE id = ? AND NOT EXISTS (SELECT 1 FROM qubes WHERE zone_id = ?)",
        )
        .bind(id)
        .bind(id)
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
