//! Configuration command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{CONFIG_KEYS, ConfigLoader, get_config_value, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "server", "releases.limit")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "server", "releases.limit")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// List the keys accepted by get and set
    Keys,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
///
/// With `context`, reads include that context's layer and `set` writes to it
/// instead of the root config.
pub async fn handle_config_command(cmd: ConfigSubcommand, context: Option<&str>) -> Result<()> {
    tracing::debug!("Handling config command: {:?}", cmd);

    match cmd {
        ConfigSubcommand::Get { key } => {
            let config =
                ConfigLoader::load(context).context("Failed to load configuration")?;

            if let Some(key) = key {
                println!("{}", get_config_value(&config, &key)?);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Edit the layer being saved, not the merged view
            let path = match context {
                Some(name) => paths::context_config_path(name),
                None => paths::root_config_path(),
            };
            ConfigLoader::set_value(&path, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            match context {
                Some(name) => println!("Configuration saved for context: {}", name),
                None => println!("Configuration saved"),
            }
        }
        ConfigSubcommand::List => {
            let config =
                ConfigLoader::load(context).context("Failed to load configuration")?;

            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Keys => {
            for key in CONFIG_KEYS {
                println!("{}", key);
            }
        }
        ConfigSubcommand::Path => {
            let path = match context {
                Some(name) => paths::context_config_path(name),
                None => paths::root_config_path(),
            };
            println!("{}", path.display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(context)
                .context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
