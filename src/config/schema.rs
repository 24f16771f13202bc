//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::models::StorageBackend;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the release server API
    #[serde(default = "default_server")]
    pub server: String,

    /// Per-request timeout (e.g. "30s", "500ms", "1m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// Namespace used when none is given on the command line
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Cluster context used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_context: Option<String>,

    /// Helm storage driver the server reads releases from
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Release listing defaults
    #[serde(default)]
    pub releases: ReleasesConfig,

    /// Show operator-oriented detail in listings
    #[serde(default = "default_true")]
    pub dev_ops_mode: bool,
}

/// Release listing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleasesConfig {
    /// Page size for release listings
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Sort listings by deployment date instead of name
    #[serde(default = "default_false")]
    pub by_date: bool,

    /// Statuses to include (empty = all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_filter: Vec<String>,
}

// Default value functions
fn default_server() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_limit() -> u32 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            request_timeout: default_request_timeout(),
            default_namespace: default_namespace(),
            default_context: None,
            storage_backend: StorageBackend::default(),
            releases: ReleasesConfig::default(),
            dev_ops_mode: default_true(),
        }
    }
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            by_date: default_false(),
            status_filter: Vec::new(),
        }
    }
}

impl Config {
    /// Parsed request timeout
    pub fn timeout(&self) -> anyhow::Result<std::time::Duration> {
        super::parse_duration(&self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.server, "http://localhost:8080/api");
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.storage_backend, StorageBackend::Secret);
        assert_eq!(config.releases.limit, 20);
        assert_eq!(config.timeout().unwrap(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("requestTimeout"));
        assert!(yaml.contains("storageBackend: secret"));
        assert!(!yaml.contains("defaultContext"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
server: https://releases.example.com/api
storageBackend: configmap
releases:
  byDate: true
  statusFilter: [deployed, failed]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server, "https://releases.example.com/api");
        assert_eq!(config.storage_backend, StorageBackend::ConfigMap);
        assert!(config.releases.by_date);
        assert_eq!(config.releases.limit, 20);
        assert_eq!(config.releases.status_filter, vec!["deployed", "failed"]);
    }
}
