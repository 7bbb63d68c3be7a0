//! Qubes: virtual machine instances, optionally hosted in a zone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// A virtual machine instance with a resource spec and a running/stopped lifecycle.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Qube {
    /// Opaque identifier assigned at creation.
    pub id: String,

    /// Display name, trimmed and non-empty.
    pub name: String,

    /// Workload category; drives default resource sizing.
    #[serde(rename = "type")]
    pub qube_type: QubeType,

    /// Hosting zone, if any. Checked only when the qube is created.
    pub zone_id: Option<String>,

    pub status: QubeStatus,

    /// Resource allocation.
    pub spec: QubeSpec,

    /// Address assigned by the hosting platform, never by the lifecycle itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workload categories.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QubeType {
    App,
    Work,
    Dev,
    Gpu,
    Disp,
    Sys,
}

impl QubeType {
    pub const ALL: [QubeType; 6] = [
        QubeType::App,
        QubeType::Work,
        QubeType::Dev,
        QubeType::Gpu,
        QubeType::Disp,
        QubeType::Sys,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QubeType::App => "app",
            QubeType::Work => "work",
            QubeType::Dev => "dev",
            QubeType::Gpu => "gpu",
            QubeType::Disp => "disp",
            QubeType::Sys => "sys",
        }
    }

    /// Default `(vcpu, memory MB, disk GB)` for this workload category.
    pub fn default_resources(&self) -> (u32, u32, u32) {
        match self {
            QubeType::Work => (4, 4096, 50),
            QubeType::Gpu => (8, 16384, 100),
            QubeType::App | QubeType::Dev | QubeType::Disp | QubeType::Sys => (2, 2048, 20),
        }
    }
}

impl FromStr for QubeType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("qube type", s))
    }
}

impl fmt::Display for QubeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a qube.
///
/// Only `Stopped` and `Running` are reachable through start/stop; the others
/// are reserved for provisioning flows driven outside this service.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QubeStatus {
    Pending,
    Creating,
    Running,
    Stopped,
    Error,
}

impl QubeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QubeStatus::Pending => "pending",
            QubeStatus::Creating => "creating",
            QubeStatus::Running => "running",
            QubeStatus::Stopped => "stopped",
            QubeStatus::Error => "error",
        }
    }
}

impl FromStr for QubeStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QubeStatus::Pending),
            "creating" => Ok(QubeStatus::Creating),
            "running" => Ok(QubeStatus::Running),
            "stopped" => Ok(QubeStatus::Stopped),
            "error" => Ok(QubeStatus::Error),
            other => Err(ParseEnumError::new("qube status", other)),
        }
    }
}

impl fmt::Display for QubeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource allocation. Zero means "use the type default" at creation time.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct QubeSpec {
    #[serde(default)]
    pub vcpu: u32,

    /// Memory in MB.
    #[serde(default)]
    pub memory: u32,

    /// Disk in GB.
    #[serde(default)]
    pub disk: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuSpec>,
}

impl QubeSpec {
    /// Fill every zero-valued resource from the defaults of `qube_type`.
    /// Non-zero fields are left untouched.
    pub fn with_defaults_for(mut self, qube_type: QubeType) -> Self {
        let (vcpu, memory, disk) = qube_type.default_resources();
        if self.vcpu == 0 {
            self.vcpu = vcpu;
        }
        if self.memory == 0 {
            self.memory = memory;
        }
        if self.disk == 0 {
            self.disk = disk;
        }
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GpuSpec {
    #[serde(rename = "type")]
    pub gpu_type: String,
    pub count: u32,
}

/// Body of `POST /api/v1/qubes`.
///
/// An absent or empty `zone_id` creates an unassigned qube.
#[derive(Deserialize, Clone, Debug)]
pub struct QubeCreateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub qube_type: String,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub spec: QubeSpec,
}

/// Body of `PUT /api/v1/qubes/{id}`. Type and zone are fixed after creation.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct QubeUpdateRequest {
    pub name: Option<String>,
    pub spec: Option<QubeSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_spec_takes_type_defaults() {
        let app = QubeSpec::default().with_defaults_for(QubeType::App);
        assert_eq!((app.vcpu, app.memory, app.disk), (2, 2048, 20));

        let work = QubeSpec::default().with_defaults_for(QubeType::Work);
        assert_eq!((work.vcpu, work.memory, work.disk), (4, 4096, 50));

        let gpu = QubeSpec::default().with_defaults_for(QubeType::Gpu);
        assert_eq!((gpu.vcpu, gpu.memory, gpu.disk), (8, 16384, 100));

        for t in [QubeType::Dev, QubeType::Disp, QubeType::Sys] {
            let spec = QubeSpec::default().with_defaults_for(t);
            assert_eq!((spec.vcpu, spec.memory, spec.disk), (2, 2048, 20), "{t}");
        }
    }

    #[test]
    fn defaults_apply_per_field() {
        let spec = QubeSpec {
            vcpu: 6,
            template: Some("debian-12".into()),
            ..Default::default()
        }
        .with_defaults_for(QubeType::App);

        assert_eq!(spec.vcpu, 6);
        assert_eq!(spec.memory, 2048);
        assert_eq!(spec.disk, 20);
        assert_eq!(spec.template.as_deref(), Some("debian-12"));
    }

    #[test]
    fn qube_type_rejects_unknown_values() {
        assert_eq!("disp".parse::<QubeType>().unwrap(), QubeType::Disp);
        assert!("vm".parse::<QubeType>().is_err());
        assert!("GPU".parse::<QubeType>().is_err());
    }

    #[test]
    fn spec_deserializes_with_missing_fields_as_zero() {
        let spec: QubeSpec = serde_json::from_str(r#"{"vcpu": 3}"#).unwrap();
        assert_eq!(spec.vcpu, 3);
        assert_eq!(spec.memory, 0);
        assert_eq!(spec.disk, 0);
        assert!(spec.gpu.is_none());

        let spec: QubeSpec =
            serde_json::from_str(r#"{"gpu": {"type": "a100", "count": 2}}"#).unwrap();
        assert_eq!(
            spec.gpu,
            Some(GpuSpec {
                gpu_type: "a100".into(),
                count: 2
            })
        );
    }
}
