//! Configuration system for chartdeck
//!
//! Layered YAML configuration (defaults, root file, per-context file,
//! environment) plus helpers for the `config get`/`config set` commands.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

use anyhow::{Context, Result};
use std::time::Duration;

pub use loader::ConfigLoader;
pub use schema::{Config, ReleasesConfig};

/// Keys accepted by `get_config_value` / `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "server",
    "requestTimeout",
    "defaultNamespace",
    "defaultContext",
    "storageBackend",
    "releases.limit",
    "releases.byDate",
    "releases.statusFilter",
    "devOpsMode",
];

/// Parse duration strings like "30s", "500ms", "1m", "2h"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().context("Invalid milliseconds in duration")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().context("Invalid seconds in duration")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().context("Invalid minutes in duration")?;
        scaled_secs(mins, 60, s)
    } else if let Some(hours) = s.strip_suffix('h') {
        let hours: u64 = hours.parse().context("Invalid hours in duration")?;
        scaled_secs(hours, 3600, s)
    } else {
        anyhow::bail!("Invalid duration format: {}", s)
    }
}

fn scaled_secs(count: u64, unit: u64, raw: &str) -> Result<Duration> {
    match count.checked_mul(unit) {
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => anyhow::bail!("Duration out of range: {}", raw),
    }
}

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "server" => Ok(config.server.clone()),
        "requestTimeout" => Ok(config.request_timeout.clone()),
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "defaultContext" => Ok(config.default_context.clone().unwrap_or_default()),
        "storageBackend" => Ok(config.storage_backend.to_string()),
        "releases.limit" => Ok(config.releases.limit.to_string()),
        "releases.byDate" => Ok(config.releases.by_date.to_string()),
        "releases.statusFilter" => Ok(config.releases.status_filter.join(",")),
        "devOpsMode" => Ok(config.dev_ops_mode.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "server" => {
            url::Url::parse(value).context("server must be an absolute URL")?;
            config.server = value.to_string();
        }
        "requestTimeout" => {
            parse_duration(value).context("requestTimeout must look like 30s, 500ms or 1m")?;
            config.request_timeout = value.to_string();
        }
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "defaultContext" => {
            if value.is_empty() {
                config.default_context = None;
            } else {
                config.default_context = Some(value.to_string());
            }
        }
        "storageBackend" => {
            config.storage_backend = value.parse()?;
        }
        "releases.limit" => {
            config.releases.limit = value
                .parse()
                .context("releases.limit must be a number")?;
        }
        "releases.byDate" => {
            config.releases.by_date = value
                .parse()
                .context("releases.byDate must be 'true' or 'false'")?;
        }
        "releases.statusFilter" => {
            config.releases.status_filter = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "devOpsMode" => {
            config.dev_ops_mode = value
                .parse()
                .context("devOpsMode must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
