//! Backup command definitions.

use crate::commands::params::{
    backup_key_parameter, backup_name_parameter, force_parameter, COMMAND_BACKUP,
    COMMAND_CREATE, COMMAND_DELETE, COMMAND_DOWNLOAD, COMMAND_LIST, COMMAND_RESTORE,
    COMMAND_UPLOAD, PARAMETER_FILE, PARAMETER_PATH,
};
use clap::{Arg, Command};
use std::path::PathBuf;

/// Create the backup command with all its subcommands.
pub fn backup_command() -> Command {
    Command::new(COMMAND_BACKUP)
        .about("Manage server backups (requires superuser authentication)")
        .subcommand_required(true)
        .subcommand(Command::new(COMMAND_LIST).about("List backups"))
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new backup")
                .arg(backup_name_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DOWNLOAD)
                .about("Download a backup archive")
                .arg(backup_key_parameter())
                .arg(
                    Arg::new(PARAMETER_PATH)
                        .long(PARAMETER_PATH)
                        .num_args(1)
                        .required(false)
                        .help("Destination file or directory (defaults to the context's backups directory)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(force_parameter().help("Overwrite an existing file")),
        )
        .subcommand(
            Command::new(COMMAND_UPLOAD)
                .about("Upload a backup archive")
                .arg(
                    Arg::new(PARAMETER_FILE)
                        .num_args(1)
                        .required(true)
                        .help("Path to the backup archive")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(backup_name_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a backup")
                .arg(backup_key_parameter())
                .arg(force_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_RESTORE)
                .about("Restore the server from a backup")
                .arg(backup_key_parameter())
                .arg(force_parameter()),
        )
}
