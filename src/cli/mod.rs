//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
pub mod format;
mod logging;
mod release;
mod version;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use release::{
    ReleaseCommand, ServerArgs, Session, handle_release_command, prompt_yes_no, rollback_release,
};
pub use version::display_version;
