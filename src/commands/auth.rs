//! Authentication command definitions.

use crate::commands::params::{
    auth_collection_override_parameter, email_parameter, password_parameter, COMMAND_AUTH,
    COMMAND_PB,
};
use clap::Command;

/// Create the authentication command.
///
/// `pb auth` and `pb auth pb` are equivalent; the provider subcommand is
/// optional and PocketBase password auth is the only provider.
pub fn auth_command() -> Command {
    Command::new(COMMAND_AUTH)
        .about("Authenticate the active context")
        .arg(email_parameter())
        .arg(password_parameter())
        .arg(auth_collection_override_parameter())
        .subcommand(
            Command::new(COMMAND_PB)
                .about("Authenticate with email and password")
                .arg(email_parameter())
                .arg(password_parameter())
                .arg(auth_collection_override_parameter()),
        )
}
