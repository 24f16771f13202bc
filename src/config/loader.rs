//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, parse_duration, paths, schema::Config, set_config_value};
use crate::models::StorageBackend;
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Context-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    pub fn load(context: Option<&str>) -> Result<Config> {
        let context_path = context.map(paths::context_config_path);
        Self::load_from(
            &paths::root_config_path(),
            context_path.as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    /// Load configuration from explicit file locations
    ///
    /// Missing files are skipped; files that exist but do not parse are errors.
    pub fn load_from<F>(root: &Path, context: Option<&Path>, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;

        for path in std::iter::once(root).chain(context) {
            if path.exists() {
                let layer = Self::load_value(path)?;
                merge_values(&mut merged, layer);
            }
        }

        let config: Config =
            serde_yaml::from_value(merged).context("Failed to build merged configuration")?;

        Ok(Self::apply_env_overrides(config, env))
    }

    fn load_value(path: &Path) -> Result<Value> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let value: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // An empty file parses as null and contributes nothing
        Ok(if value.is_null() {
            Value::Mapping(Default::default())
        } else {
            value
        })
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on invalid YAML, invalid value types, an unparseable server URL,
    /// an unparseable request timeout or a zero page size.
    pub fn validate(context: Option<&str>) -> Result<()> {
        let config = Self::load(context).context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    /// Semantic checks on an already-loaded configuration
    pub fn check(config: &Config) -> Result<()> {
        let url = url::Url::parse(&config.server)
            .with_context(|| format!("server is not a valid URL: {}", config.server))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("server must be an absolute http(s) URL: {}", config.server);
        }

        parse_duration(&config.request_timeout)
            .with_context(|| format!("requestTimeout is invalid: {}", config.request_timeout))?;

        if config.releases.limit == 0 {
            anyhow::bail!("releases.limit must be greater than 0");
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: Config, env: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = env("CHARTDECK_SERVER") {
            config.server = server;
        }

        if let Some(namespace) = env("CHARTDECK_NAMESPACE") {
            config.default_namespace = namespace;
        }

        if let Some(context) = env("CHARTDECK_CONTEXT") {
            config.default_context = Some(context);
        }

        if let Some(storage) = env("CHARTDECK_STORAGE") {
            match storage.parse::<StorageBackend>() {
                Ok(backend) => config.storage_backend = backend,
                Err(e) => tracing::warn!("Ignoring CHARTDECK_STORAGE: {}", e),
            }
        }

        if let Some(timeout) = env("CHARTDECK_TIMEOUT") {
            config.request_timeout = timeout;
        }

        config
    }

    /// Set one key in a single config file, leaving its other keys as written.
    ///
    /// The value is checked against the full schema first. Keys that end up
    /// absent (e.g. a cleared `defaultContext`) are removed from the file.
    pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut layer = if path.exists() {
            Self::load_value(path)?
        } else {
            Value::Mapping(Default::default())
        };

        let mut config: Config = serde_yaml::from_value(layer.clone())
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        set_config_value(&mut config, key, value)?;

        let full = serde_yaml::to_value(&config).context("Failed to serialize configuration")?;
        let segments: Vec<&str> = key.split('.').collect();
        match lookup(&full, &segments) {
            Some(updated) => insert_at(&mut layer, &segments, updated.clone()),
            None => remove_at(&mut layer, &segments),
        }

        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let yaml = serde_yaml::to_string(&layer).context("Failed to serialize configuration")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

fn lookup<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.get(*segment))
}

fn insert_at(value: &mut Value, segments: &[&str], leaf: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *value = leaf;
        return;
    };
    if !value.is_mapping() {
        *value = Value::Mapping(Default::default());
    }
    if let Value::Mapping(map) = value {
        let child = map.entry(Value::from(*first)).or_insert(Value::Null);
        insert_at(child, rest, leaf);
    }
}

fn remove_at(value: &mut Value, segments: &[&str]) {
    match segments {
        [] => {}
        [last] => {
            if let Value::Mapping(map) = value {
                map.remove(*last);
            }
        }
        [first, rest @ ..] => {
            if let Some(child) = value.get_mut(*first) {
                remove_at(child, rest);
            }
        }
    }
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else
/// replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
