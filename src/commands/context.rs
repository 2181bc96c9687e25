//! Context command definitions.
//!
//! This module defines CLI commands related to context management.

use crate::commands::params::{
    context_name_parameter, force_parameter, COMMAND_ADD, COMMAND_CLEAR, COMMAND_COLLECTIONS,
    COMMAND_CONTEXT, COMMAND_CREATE, COMMAND_DELETE, COMMAND_LIST, COMMAND_REMOVE,
    COMMAND_SELECT, COMMAND_SHOW, PARAMETER_AUTH_COLLECTION, PARAMETER_COLLECTION,
    PARAMETER_COLLECTIONS, PARAMETER_NAME, PARAMETER_URL,
};
use crate::context::DEFAULT_AUTH_COLLECTION;
use clap::{Arg, Command};

/// Create the context command with all its subcommands.
pub fn context_command() -> Command {
    Command::new(COMMAND_CONTEXT)
        .about("Manage PocketBase contexts")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new context")
                .arg(context_name_parameter())
                .arg(
                    Arg::new(PARAMETER_URL)
                        .long(PARAMETER_URL)
                        .num_args(1)
                        .required(true)
                        .help("PocketBase server URL"),
                )
                .arg(
                    Arg::new(PARAMETER_AUTH_COLLECTION)
                        .long(PARAMETER_AUTH_COLLECTION)
                        .num_args(1)
                        .default_value(DEFAULT_AUTH_COLLECTION)
                        .help("Collection used for authentication"),
                )
                .arg(
                    Arg::new(PARAMETER_COLLECTIONS)
                        .long(PARAMETER_COLLECTIONS)
                        .num_args(1)
                        .required(false)
                        .help("Collections available in this context (comma separated)"),
                ),
        )
        .subcommand(Command::new(COMMAND_LIST).about("List all contexts"))
        .subcommand(
            Command::new(COMMAND_SELECT)
                .about("Make a context the active one")
                .arg(context_name_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_SHOW)
                .about("Show a context (defaults to the active one)")
                .arg(context_name_parameter().required(false)),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a context")
                .arg(context_name_parameter())
                .arg(force_parameter()),
        )
        .subcommand(context_collections_command())
}

fn context_collections_command() -> Command {
    Command::new(COMMAND_COLLECTIONS)
        .about("Manage the collections available in the active context")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_ADD)
                .about("Add collections")
                .arg(
                    Arg::new(PARAMETER_NAME)
                        .num_args(1..)
                        .required(true)
                        .help("Collection names"),
                ),
        )
        .subcommand(
            Command::new(COMMAND_REMOVE)
                .about("Remove a collection")
                .arg(
                    Arg::new(PARAMETER_COLLECTION)
                        .num_args(1)
                        .required(true)
                        .help("Collection name"),
                ),
        )
        .subcommand(Command::new(COMMAND_LIST).about("List configured collections"))
        .subcommand(
            Command::new(COMMAND_CLEAR)
                .about("Remove all collections")
                .arg(force_parameter()),
        )
}
