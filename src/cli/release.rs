//! Release command handlers
//!
//! Each command builds on a [`Session`]: the configured transport, the
//! release service, the application store and the release scope resolved
//! from flags and configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use super::format;
use crate::api::{ApiError, HttpTransport, Transport};
use crate::config::Config;
use crate::history::{RevisionHistoryController, RollbackOutcome};
use crate::services::{LATEST_REVISION, ListReleasesQuery, ReleaseScope, ReleaseService};
use crate::store::AppStore;

/// Connection flags shared by every release command
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Release server base URL (overrides config)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Bearer token sent with every request
    #[arg(
        long,
        global = true,
        env = "CHARTDECK_TOKEN",
        hide_env_values = true,
        default_value = ""
    )]
    pub token: String,

    /// Cluster context (overrides config)
    #[arg(long, short = 'c', global = true)]
    pub context: Option<String>,

    /// Namespace (overrides config)
    #[arg(long, short = 'n', global = true)]
    pub namespace: Option<String>,

    /// Helm storage backend: secret, configmap or memory (overrides config)
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// Id of the signed-in user on the release server
    #[arg(long, global = true, env = "CHARTDECK_USER_ID")]
    pub user_id: Option<u64>,
}

/// Release subcommands
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// List releases
    Releases {
        /// Page size (defaults to releases.limit)
        #[arg(long)]
        limit: Option<u32>,
        /// Number of releases to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Sort by deployment date
        #[arg(long)]
        by_date: bool,
        /// Only show releases in this status (repeatable)
        #[arg(long = "status")]
        status: Vec<String>,
    },
    /// Show one release
    Get {
        name: String,
        /// Revision to show (0 = latest)
        #[arg(long, default_value_t = LATEST_REVISION)]
        revision: u64,
    },
    /// List the resources rendered by a release
    Components {
        name: String,
        /// Revision to inspect (0 = latest)
        #[arg(long, default_value_t = LATEST_REVISION)]
        revision: u64,
    },
    /// Show the revision history of a release
    History { name: String },
    /// Roll a release back to an earlier revision
    Rollback {
        name: String,
        /// Revision to roll back to
        #[arg(long, short = 'r')]
        revision: u64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Upgrade a release with a new values file
    Upgrade {
        name: String,
        /// Path to the values YAML
        #[arg(long, short = 'f')]
        values: PathBuf,
    },
    /// List namespaces in the current cluster context
    Namespaces,
    /// List the cluster contexts available to a user
    Contexts {
        /// User id (defaults to --user-id)
        #[arg(long)]
        user: Option<u64>,
    },
}

/// Everything a release command needs
pub struct Session {
    pub service: ReleaseService,
    pub store: AppStore,
    pub scope: ReleaseScope,
    pub config: Config,
}

impl Session {
    /// Session talking HTTP to the configured (or overridden) server
    pub fn connect(args: &ServerArgs, config: Config) -> Result<Self> {
        let server = args.server.clone().unwrap_or_else(|| config.server.clone());
        let timeout = config.timeout()?;
        let transport = HttpTransport::new(&server, timeout)?;
        tracing::debug!("Using release server {}", transport.base_url());
        Self::with_transport(Arc::new(transport), args, config)
    }

    /// Session over an arbitrary transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        args: &ServerArgs,
        config: Config,
    ) -> Result<Self> {
        let context = args
            .context
            .clone()
            .or_else(|| config.default_context.clone());
        let namespace = args
            .namespace
            .clone()
            .unwrap_or_else(|| config.default_namespace.clone());
        let storage = match &args.storage {
            Some(storage) => storage.parse()?,
            None => config.storage_backend,
        };

        let store = AppStore::new();
        store.set_current_cluster(context.clone());
        store.set_dev_ops_mode(config.dev_ops_mode);
        if let Some(id) = args.user_id {
            store.set_user(id, "");
        }

        Ok(Self {
            service: ReleaseService::new(transport, args.token.clone()),
            store,
            scope: ReleaseScope::new(namespace, context, storage),
            config,
        })
    }

    /// User whose contexts to list: `explicit`, else the signed-in user
    pub fn user_id(&self, explicit: Option<u64>) -> Result<u64> {
        explicit
            .or_else(|| self.store.user().map(|user| user.id))
            .context("No user id; pass --user or --user-id")
    }

    /// History controller for the latest revision of `name`, history loaded
    pub async fn history_controller(&self, name: &str) -> Result<RevisionHistoryController> {
        let release = self
            .service
            .get_release(&self.scope, name, LATEST_REVISION)
            .await
            .map_err(server_error)?;

        let mut controller = RevisionHistoryController::new(
            self.service.clone(),
            self.store.clone(),
            self.scope.storage,
            release,
        );
        if !controller.load_history().await {
            anyhow::bail!("Failed to load revision history for {}", controller.identity());
        }
        Ok(controller)
    }
}

/// Surface an API failure the way the server phrased it
fn server_error(e: ApiError) -> anyhow::Error {
    tracing::debug!("Release server call failed: {:?}", e);
    anyhow::anyhow!(e.user_message())
}

/// Ask a yes/no question on stdin; anything but y/yes is no
pub fn prompt_yes_no(question: &str) -> Result<bool> {
    use std::io::Write;

    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Roll `name` back to `revision` through the history controller.
///
/// `confirm` is asked before anything is sent; `Ok(None)` means the user
/// declined and no rollback call was made. On success the new current
/// version is returned. A rejected rollback is an error carrying the message
/// left in the store.
pub async fn rollback_release<F>(
    session: &Session,
    name: &str,
    revision: u64,
    confirm: F,
) -> Result<Option<u64>>
where
    F: FnOnce(&str) -> Result<bool>,
{
    let mut controller = session.history_controller(name).await?;

    if !controller.select_target(revision) {
        if revision == controller.max_version() {
            anyhow::bail!(
                "Revision {} is already the current revision of {}",
                revision,
                name
            );
        }
        anyhow::bail!("Revision {} not found in the history of {}", revision, name);
    }

    let question = format!(
        "Roll back {} from revision {} to revision {}?",
        controller.identity(),
        controller.max_version(),
        revision
    );
    if !confirm(&question)? {
        controller.cancel();
        return Ok(None);
    }

    match controller.confirm_and_wait().await {
        Some(RollbackOutcome::Completed {
            current_version, ..
        }) => Ok(Some(current_version)),
        Some(RollbackOutcome::Failed { message, .. }) => {
            let message = session.store.take_current_error().unwrap_or(message);
            Err(anyhow::anyhow!(message))
        }
        None => anyhow::bail!("No rollback was pending for {}", name),
    }
}

/// Handle release subcommands
pub async fn handle_release_command(cmd: ReleaseCommand, session: &Session) -> Result<()> {
    tracing::debug!("Handling release command: {:?}", cmd);

    match cmd {
        ReleaseCommand::Releases {
            limit,
            skip,
            by_date,
            status,
        } => {
            let defaults = &session.config.releases;
            let query = ListReleasesQuery {
                scope: session.scope.clone(),
                limit: limit.unwrap_or(defaults.limit),
                skip,
                by_date: by_date || defaults.by_date,
                status_filter: if status.is_empty() {
                    defaults.status_filter.clone()
                } else {
                    status
                },
            };
            let releases = session
                .service
                .list_releases(&query)
                .await
                .map_err(server_error)?;

            if releases.is_empty() {
                println!("No releases found in namespace {}", session.scope.namespace);
            } else {
                println!(
                    "{}",
                    format::release_table(&releases, session.store.dev_ops_mode())
                );
            }
        }
        ReleaseCommand::Get { name, revision } => {
            let release = session
                .service
                .get_release(&session.scope, &name, revision)
                .await
                .map_err(server_error)?;
            println!("{}", format::release_detail(&release));
        }
        ReleaseCommand::Components { name, revision } => {
            let components = session
                .service
                .get_release_components(&session.scope, &name, revision)
                .await
                .map_err(server_error)?;
            println!("{}", format::component_table(&components));
        }
        ReleaseCommand::History { name } => {
            let controller = session.history_controller(&name).await?;
            println!("{}", controller.header_label());
            println!();
            println!("{}", format::revision_table(&controller.revision_rows()));
        }
        ReleaseCommand::Rollback {
            name,
            revision,
            yes,
        } => {
            let confirm = |question: &str| if yes { Ok(true) } else { prompt_yes_no(question) };
            match rollback_release(session, &name, revision, confirm).await? {
                Some(current_version) => println!(
                    "Rolled back {} to revision {} (now at revision {})",
                    name, revision, current_version
                ),
                None => println!("Rollback cancelled"),
            }
        }
        ReleaseCommand::Upgrade { name, values } => {
            let contents = tokio::fs::read_to_string(&values)
                .await
                .with_context(|| format!("Failed to read values file: {}", values.display()))?;
            serde_yaml::from_str::<serde_yaml::Value>(&contents)
                .with_context(|| format!("Values file is not valid YAML: {}", values.display()))?;

            session
                .service
                .upgrade_values(&session.scope, &name, &contents)
                .await
                .map_err(server_error)?;
            println!("Upgraded {} with values from {}", name, values.display());
        }
        ReleaseCommand::Namespaces => {
            let namespaces = session
                .service
                .list_namespaces(session.store.current_cluster())
                .await
                .map_err(server_error)?;
            for name in namespaces.names() {
                println!("{}", name);
            }
        }
        ReleaseCommand::Contexts { user } => {
            let contexts = session
                .service
                .list_contexts(session.user_id(user)?)
                .await
                .map_err(server_error)?;
            let current = session.store.current_cluster();
            println!("{}", format::context_table(&contexts, current.as_deref()));
        }
    }

    Ok(())
}
