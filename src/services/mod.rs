//! Zone and qube lifecycle services.
//!
//! Services are stateless: every call validates its input, orchestrates the
//! repositories, and returns either the resulting entity or exactly one
//! [`ServiceError`].

use thiserror::Error;

pub mod qube_service;
pub mod zone_service;

pub use qube_service::QubeService;
pub use zone_service::ZoneService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("zone `{0}` not found")]
    ZoneNotFound(String),
    #[error("qube `{0}` not found")]
    QubeNotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid zone type `{0}`")]
    InvalidZoneType(String),
    #[error("invalid qube type `{0}`")]
    InvalidQubeType(String),
    #[error("zone `{0}` is in use by qubes")]
    ZoneInUse(String),
    #[error("qube `{0}` must be stopped")]
    QubeNotStopped(String),
    #[error("zone `{0}` is disconnected")]
    ZoneDisconnected(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Discriminant of [`ServiceError`], for callers that branch on the kind of
/// failure rather than on its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ZoneNotFound,
    QubeNotFound,
    InvalidInput,
    InvalidZoneType,
    InvalidQubeType,
    ZoneInUse,
    QubeNotStopped,
    ZoneDisconnected,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ZoneNotFound => "zone_not_found",
            ErrorKind::QubeNotFound => "qube_not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidZoneType => "invalid_zone_type",
            ErrorKind::InvalidQubeType => "invalid_qube_type",
            ErrorKind::ZoneInUse => "zone_in_use",
            ErrorKind::QubeNotStopped => "qube_not_stopped",
            ErrorKind::ZoneDisconnected => "zone_disconnected",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ZoneNotFound(_) => ErrorKind::ZoneNotFound,
            ServiceError::QubeNotFound(_) => ErrorKind::QubeNotFound,
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::InvalidZoneType(_) => ErrorKind::InvalidZoneType,
            ServiceError::InvalidQubeType(_) => ErrorKind::InvalidQubeType,
            ServiceError::ZoneInUse(_) => ErrorKind::ZoneInUse,
            ServiceError::QubeNotStopped(_) => ErrorKind::QubeNotStopped,
            ServiceError::ZoneDisconnected(_) => ErrorKind::ZoneDisconnected,
            ServiceError::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

/// Trim `name` and reject it if nothing is left.
fn require_name(name: &str, entity: &str) -> ServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{entity} name is required")));
    }
    Ok(trimmed.to_string())
}
