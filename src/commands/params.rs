//! Shared command parameters for all CLI commands.
//!
//! Command and parameter names live here so that the command definitions and
//! the dispatch code agree on them.

use crate::format::OutputFormat;
use clap::{Arg, ArgAction};
use std::path::PathBuf;

// Top level commands
pub const COMMAND_CONTEXT: &str = "context";
pub const COMMAND_COLLECTIONS: &str = "collections";
pub const COMMAND_AUTH: &str = "auth";
pub const COMMAND_BACKUP: &str = "backup";
pub const COMMAND_VERSION: &str = "version";

// Context commands
pub const COMMAND_CREATE: &str = "create";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_SELECT: &str = "select";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_DELETE: &str = "delete";

// Context collection commands
pub const COMMAND_ADD: &str = "add";
pub const COMMAND_REMOVE: &str = "remove";
pub const COMMAND_CLEAR: &str = "clear";

// Record commands
pub const COMMAND_GET: &str = "get";
pub const COMMAND_UPDATE: &str = "update";

// Auth providers
pub const COMMAND_PB: &str = "pb";

// Backup commands
pub const COMMAND_DOWNLOAD: &str = "download";
pub const COMMAND_UPLOAD: &str = "upload";
pub const COMMAND_RESTORE: &str = "restore";

// Global parameters
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_COLORS: &str = "colors";
pub const PARAMETER_DEBUG: &str = "debug";

// Parameter names
pub const PARAMETER_NAME: &str = "name";
pub const PARAMETER_URL: &str = "url";
pub const PARAMETER_AUTH_COLLECTION: &str = "auth-collection";
pub const PARAMETER_COLLECTIONS: &str = "collections";
pub const PARAMETER_COLLECTION: &str = "collection";
pub const PARAMETER_FORCE: &str = "force";
pub const PARAMETER_QUIET: &str = "quiet";
pub const PARAMETER_EMAIL: &str = "email";
pub const PARAMETER_PASSWORD: &str = "password";
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_DATA: &str = "data";
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_OFFSET: &str = "offset";
pub const PARAMETER_LIMIT: &str = "limit";
pub const PARAMETER_FILTER: &str = "filter";
pub const PARAMETER_SORT: &str = "sort";
pub const PARAMETER_FIELDS: &str = "fields";
pub const PARAMETER_EXPAND: &str = "expand";
pub const PARAMETER_KEY: &str = "key";
pub const PARAMETER_PATH: &str = "path";

pub const OUTPUT_ENV: &str = "PB_OUTPUT";
pub const MAX_LIMIT: u32 = 500;

/// Options whose next token is their value. Argument expansion must not try
/// to resolve those values as commands.
pub const VALUE_OPTIONS: &[&str] = &[
    "-o",
    "--output",
    "--colors",
    "--url",
    "--auth-collection",
    "--collections",
    "--collection",
    "--email",
    "--password",
    "--file",
    "--offset",
    "--limit",
    "--filter",
    "--sort",
    "--fields",
    "--expand",
    "--name",
    "--path",
];

/// Create the global output format parameter.
///
/// When absent, the format stored in the global configuration applies.
pub fn output_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long(PARAMETER_OUTPUT)
        .num_args(1)
        .required(false)
        .env(OUTPUT_ENV)
        .global(true)
        .help("Output format")
        .value_parser(OutputFormat::names())
}

pub fn colors_parameter() -> Arg {
    Arg::new(PARAMETER_COLORS)
        .long(PARAMETER_COLORS)
        .num_args(1)
        .required(false)
        .global(true)
        .help("Enable or disable colored output")
        .value_parser(clap::value_parser!(bool))
}

pub fn debug_parameter() -> Arg {
    Arg::new(PARAMETER_DEBUG)
        .long(PARAMETER_DEBUG)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable debug logging")
}

pub fn force_parameter() -> Arg {
    Arg::new(PARAMETER_FORCE)
        .short('f')
        .long(PARAMETER_FORCE)
        .action(ArgAction::SetTrue)
        .help("Skip the confirmation prompt")
}

pub fn context_name_parameter() -> Arg {
    Arg::new(PARAMETER_NAME)
        .num_args(1)
        .required(true)
        .help("Context name")
}

pub fn record_id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .num_args(1)
        .required(true)
        .help("Record ID")
}

/// Inline JSON document. `--file` and piped stdin are the alternatives.
pub fn data_parameter() -> Arg {
    Arg::new(PARAMETER_DATA)
        .num_args(1)
        .required(false)
        .help("Record data as a JSON object")
}

pub fn file_parameter() -> Arg {
    Arg::new(PARAMETER_FILE)
        .long(PARAMETER_FILE)
        .num_args(1)
        .required(false)
        .help("Path to a JSON file with the record data")
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn expand_parameter() -> Arg {
    Arg::new(PARAMETER_EXPAND)
        .long(PARAMETER_EXPAND)
        .num_args(1)
        .required(false)
        .help("Relations to expand (comma separated)")
}

pub fn fields_parameter() -> Arg {
    Arg::new(PARAMETER_FIELDS)
        .long(PARAMETER_FIELDS)
        .num_args(1)
        .required(false)
        .help("Fields to return (comma separated)")
}

pub fn backup_key_parameter() -> Arg {
    Arg::new(PARAMETER_KEY)
        .num_args(1)
        .required(true)
        .help("Backup name")
}

pub fn backup_name_parameter() -> Arg {
    Arg::new(PARAMETER_NAME)
        .long(PARAMETER_NAME)
        .num_args(1)
        .required(false)
        .help("Backup file name")
}

pub fn email_parameter() -> Arg {
    Arg::new(PARAMETER_EMAIL)
        .long(PARAMETER_EMAIL)
        .num_args(1)
        .required(false)
        .help("Account email or username; prompted for when omitted")
}

pub fn password_parameter() -> Arg {
    Arg::new(PARAMETER_PASSWORD)
        .long(PARAMETER_PASSWORD)
        .num_args(1)
        .required(false)
        .help("Account password; prompted for when omitted")
}

pub fn auth_collection_override_parameter() -> Arg {
    Arg::new(PARAMETER_COLLECTION)
        .long(PARAMETER_COLLECTION)
        .num_args(1)
        .required(false)
        .help("Auth collection to authenticate against (defaults to the context's)")
}
