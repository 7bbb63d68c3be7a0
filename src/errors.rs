use crate::services::{ErrorKind, ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// An HTTP-facing error: status, machine-readable kind, and a message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::StorageFailure.as_str(),
            msg,
        )
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidInput.as_str(),
            msg,
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

/// Status code the HTTP boundary uses for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ZoneNotFound | ErrorKind::QubeNotFound => StatusCode::NOT_FOUND,
        ErrorKind::ZoneInUse | ErrorKind::QubeNotStopped => StatusCode::CONFLICT,
        ErrorKind::ZoneDisconnected => StatusCode::PRECONDITION_FAILED,
        ErrorKind::InvalidInput | ErrorKind::InvalidZoneType | ErrorKind::InvalidQubeType => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        if let ServiceError::Storage(inner) = &err {
            tracing::error!(error = %inner, "storage failure");
            return AppError::internal("internal storage error");
        }
        AppError::new(status_for(kind), kind.as_str(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_boundary_statuses() {
        let cases = [
            (ServiceError::ZoneNotFound("z".into()), StatusCode::NOT_FOUND),
            (ServiceError::QubeNotFound("q".into()), StatusCode::NOT_FOUND),
            (ServiceError::ZoneInUse("z".into()), StatusCode::CONFLICT),
            (ServiceError::QubeNotStopped("q".into()), StatusCode::CONFLICT),
            (
                ServiceError::ZoneDisconnected("z".into()),
                StatusCode::PRECONDITION_FAILED,
            ),
            (
                ServiceError::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::InvalidZoneType("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::InvalidQubeType("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Storage(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let app: AppError = err.into();
            assert_eq!(app.status, expected, "{}", app.kind);
        }
    }

    #[test]
    fn storage_failure_message_is_not_leaked() {
        let app: AppError = ServiceError::Storage(sqlx::Error::PoolTimedOut).into();
        assert_eq!(app.kind, "storage_failure");
        assert_eq!(app.message, "internal storage error");
    }
}
