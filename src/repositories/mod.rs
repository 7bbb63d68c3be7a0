//! SQLite-backed persistence for zones and qubes.
//!
//! Repositories return `Ok(None)` / `Ok(false)` for missing rows and leave the
//! translation into domain errors to the services.

pub mod qube_repository;
pub mod zone_repository;

pub use qube_repository::{QubeListOptions, QubeRepository};
pub use zone_repository::{ZoneListOptions, ZoneRepository};

/// Page size used when a list request does not specify one.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

fn decode_err<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

fn encode_err(err: serde_json::Error) -> sqlx::Error {
    sqlx::Error::Encode(Box::new(err))
}
