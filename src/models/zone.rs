//! Zones: connections to a remote infrastructure provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// A configured infrastructure boundary that hosts qubes.
///
/// Zones start `disconnected` and only change status through explicit
/// connect/disconnect calls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Zone {
    /// Opaque identifier assigned at creation.
    pub id: String,

    /// Display name, trimmed and non-empty.
    pub name: String,

    /// Infrastructure provider behind this zone.
    #[serde(rename = "type")]
    pub zone_type: ZoneType,

    /// Current connectivity state.
    pub status: ZoneStatus,

    /// Provider-specific connection details.
    pub config: ZoneConfig,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Supported infrastructure providers.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Proxmox,
    Gcp,
    Aws,
    Azure,
}

impl ZoneType {
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Proxmox,
        ZoneType::Gcp,
        ZoneType::Aws,
        ZoneType::Azure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Proxmox => "proxmox",
            ZoneType::Gcp => "gcp",
            ZoneType::Aws => "aws",
            ZoneType::Azure => "azure",
        }
    }
}

impl FromStr for ZoneType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("zone type", s))
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity state of a zone.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Connected,
    Disconnected,
}

impl ZoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneStatus::Connected => "connected",
            ZoneStatus::Disconnected => "disconnected",
        }
    }
}

impl FromStr for ZoneStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(ZoneStatus::Connected),
            "disconnected" => Ok(ZoneStatus::Disconnected),
            other => Err(ParseEnumError::new("zone status", other)),
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form provider configuration. Every field is optional and copied verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Body of `POST /api/v1/zones`.
///
/// `type` stays a raw string so an unknown provider surfaces as
/// `InvalidZoneType` from the service rather than a deserialization failure.
#[derive(Deserialize, Clone, Debug)]
pub struct ZoneCreateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    #[serde(default)]
    pub config: ZoneConfig,
}

/// Body of `PUT /api/v1/zones/{id}`. Absent fields keep their prior values.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ZoneUpdateRequest {
    pub name: Option<String>,
    pub config: Option<ZoneConfig>,
}
