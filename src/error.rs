use thiserror::Error;

use crate::{
    actions::CliActionError, exit_codes::PbExitCode, format::FormattingError,
    registry::RegistryError, resolver::ResolveError, storage::StorageError,
};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Abbreviated command that could not be expanded
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    /// The configuration directory could not be opened
    #[error("Configuration error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Registry(#[from] RegistryError),
    #[error("{0}")]
    Formatting(#[from] FormattingError),
    #[error("{0}")]
    ActionError(#[from] CliActionError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> PbExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) | CliError::Resolve(_) => PbExitCode::UsageError,
            CliError::Storage(_) | CliError::Registry(_) => PbExitCode::ConfigError,
            CliError::Formatting(_) => PbExitCode::UsageError,
            CliError::ActionError(e) => e.exit_code(),
        }
    }
}
