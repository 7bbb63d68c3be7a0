//! Core data models for the console backend.
//!
//! Zones and qubes are persisted in SQLite by the repositories and serialize
//! as JSON via `serde`. Enumerations round-trip through their lowercase names.

use thiserror::Error;

pub mod qube;
pub mod zone;

/// A stored or submitted value that is not part of a closed enumeration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {what} `{value}`")]
pub struct ParseEnumError {
    pub what: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}
