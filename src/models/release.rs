//! Release and revision types
//!
//! Mirrors the JSON the release server returns for Helm releases. A revision
//! is the same shape as a release, pinned to one `version`.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A deployed application instance at one version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    /// Monotonically increasing per release; the highest is the deployed state
    pub version: u64,
    pub info: ReleaseInfo,
    #[serde(default)]
    pub chart: Chart,
    /// User-supplied values, if the server includes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    /// Rendered manifest, if the server includes it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manifest: String,
}

/// An immutable snapshot of a [`Release`] at a specific version
pub type Revision = Release;

impl Release {
    /// Identity of this release within a cluster context
    pub fn identity(&self, context: Option<&str>) -> ReleaseIdentity {
        ReleaseIdentity {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            context: context.map(str::to_string),
        }
    }

    /// Display name from chart metadata, falling back to the release name
    pub fn display_name(&self) -> &str {
        if self.chart.metadata.name.is_empty() {
            &self.name
        } else {
            &self.chart.metadata.name
        }
    }
}

/// `(name, namespace, context)`: what makes two releases "the same release"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseIdentity {
    pub name: String,
    pub namespace: String,
    pub context: Option<String>,
}

impl fmt::Display for ReleaseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}/{}@{}", self.namespace, self.name, ctx),
            None => write!(f, "{}/{}", self.namespace, self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseInfo {
    pub status: ReleaseStatus,
    pub last_deployed: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_deployed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Release status as reported by the server.
///
/// The set is server-defined; anything unrecognised is kept verbatim in
/// [`ReleaseStatus::Other`] and treated as non-final.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseStatus {
    Unknown,
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
    Other(String),
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReleaseStatus::Unknown => "unknown",
            ReleaseStatus::Deployed => "deployed",
            ReleaseStatus::Uninstalled => "uninstalled",
            ReleaseStatus::Superseded => "superseded",
            ReleaseStatus::Failed => "failed",
            ReleaseStatus::Uninstalling => "uninstalling",
            ReleaseStatus::PendingInstall => "pending-install",
            ReleaseStatus::PendingUpgrade => "pending-upgrade",
            ReleaseStatus::PendingRollback => "pending-rollback",
            ReleaseStatus::Other(s) => s,
        }
    }

    /// Whether the release has settled in this state
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ReleaseStatus::Deployed
                | ReleaseStatus::Failed
                | ReleaseStatus::Superseded
                | ReleaseStatus::Uninstalled
        )
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            ReleaseStatus::Deployed => StatusTone::Ok,
            ReleaseStatus::Failed => StatusTone::Error,
            _ => StatusTone::Pending,
        }
    }
}

impl From<String> for ReleaseStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "unknown" => ReleaseStatus::Unknown,
            "deployed" => ReleaseStatus::Deployed,
            "uninstalled" => ReleaseStatus::Uninstalled,
            "superseded" => ReleaseStatus::Superseded,
            "failed" => ReleaseStatus::Failed,
            "uninstalling" => ReleaseStatus::Uninstalling,
            "pending-install" => ReleaseStatus::PendingInstall,
            "pending-upgrade" => ReleaseStatus::PendingUpgrade,
            "pending-rollback" => ReleaseStatus::PendingRollback,
            _ => ReleaseStatus::Other(s),
        }
    }
}

impl From<ReleaseStatus> for String {
    fn from(status: ReleaseStatus) -> Self {
        match status {
            ReleaseStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse status colouring used by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Ok,
    Error,
    Pending,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chart {
    #[serde(default)]
    pub metadata: ChartMetadata,
}

/// Descriptive chart metadata; opaque to the core beyond display
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Helm storage driver the server reads releases from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Secret,
    ConfigMap,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Secret => "secret",
            StorageBackend::ConfigMap => "configmap",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secret" | "secrets" => Ok(StorageBackend::Secret),
            "configmap" | "configmaps" => Ok(StorageBackend::ConfigMap),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!(
                "Unknown storage backend: {} (expected secret, configmap or memory)",
                s
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a timestamp in the local time zone as `"3:04 PM on 1/2/2006"`
pub fn readable_date(ts: &DateTime<Utc>) -> String {
    readable_date_in(&ts.with_timezone(&Local))
}

/// Same layout as [`readable_date`], in the timestamp's own zone
pub fn readable_date_in<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.format("%-I:%M %p on %-m/%-d/%Y").to_string()
}
