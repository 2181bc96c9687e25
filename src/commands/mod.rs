//! CLI command definitions and argument parsing.
//!
//! Commands are declared with the clap builder API, one submodule per
//! command group. Abbreviated command names are expanded before parsing by
//! [`crate::resolver::CommandResolver::expand_args`].

use clap::Command;

pub mod auth;
pub mod backup;
pub mod collections;
pub mod context;
pub mod params;

pub use params::{COMMAND_AUTH, COMMAND_BACKUP, COMMAND_COLLECTIONS, COMMAND_CONTEXT, COMMAND_VERSION, VALUE_OPTIONS};

/// Create the full command tree.
pub fn create_cli_commands() -> Command {
    Command::new("pb")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::output_parameter())
        .arg(params::colors_parameter())
        .arg(params::debug_parameter())
        .subcommand(context::context_command())
        .subcommand(collections::collections_command())
        .subcommand(auth::auth_command())
        .subcommand(backup::backup_command())
        .subcommand(Command::new(COMMAND_VERSION).about("Print version information"))
}
