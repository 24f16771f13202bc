//! chartdeck - inspect Helm releases, browse their revision history and roll
//! them back through a release server

use anyhow::{Context, Result};
use chartdeck::cli::{self, ConfigSubcommand, ReleaseCommand, ServerArgs, Session};
use chartdeck::config::ConfigLoader;
use clap::{Parser, Subcommand};

/// chartdeck - a console for Helm releases and their revisions
#[derive(Parser, Debug)]
#[command(name = "chartdeck")]
#[command(about = "Inspect Helm releases, browse their revision history and roll them back", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(flatten)]
    server: ServerArgs,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Release(ReleaseCommand),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    match args.command {
        Command::Version => {
            cli::display_version();
            Ok(())
        }
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand, args.server.context.as_deref()).await
        }
        Command::Release(command) => {
            let config = ConfigLoader::load(args.server.context.as_deref())
                .context("Failed to load configuration")?;
            tracing::debug!(
                "Configuration loaded: server={}, namespace={}, storage={}",
                config.server,
                config.default_namespace,
                config.storage_backend
            );

            let session = Session::connect(&args.server, config)?;
            cli::handle_release_command(command, &session).await
        }
    }
}
