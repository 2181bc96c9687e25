use std::path::PathBuf;
use thiserror::Error;

use crate::{
    client::ApiError, context::ContextError, exit_codes::PbExitCode, format::FormattingError,
    registry::RegistryError, resolver::ResolveError, session::SessionError,
};

pub mod auth;
pub mod backups;
pub mod collections;
pub mod contexts;
pub mod utils;

#[derive(Debug, Error)]
pub enum CliActionError {
    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}. Run 'pb auth' to authenticate")]
    Session(#[from] SessionError),

    #[error("{}", api_message(.0))]
    Api(#[from] ApiError),

    #[error("failed to connect to PocketBase at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    Formatting(#[from] FormattingError),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("no active context set. Use 'pb context select <name>' to set one")]
    NoActiveContext,

    #[error("active context '{0}' no longer exists. Use 'pb context select <name>' to choose another")]
    ActiveContextMissing(String),

    #[error("cannot read {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output file already exists: {0} (use --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} cancelled")]
    Cancelled(String),
}

fn api_message(error: &ApiError) -> String {
    match error.suggestion() {
        Some(suggestion) => format!("{}. {}", error.friendly_message(), suggestion),
        None => error.friendly_message(),
    }
}

impl CliActionError {
    pub fn exit_code(&self) -> PbExitCode {
        match self {
            CliActionError::Registry(e) => match e {
                RegistryError::NotFound(_) => PbExitCode::NotFound,
                RegistryError::AlreadyExists(_) | RegistryError::InvalidArgument(_) => {
                    PbExitCode::UsageError
                }
                RegistryError::NoActiveContext | RegistryError::Storage(_) => {
                    PbExitCode::ConfigError
                }
            },
            CliActionError::Context(_) | CliActionError::Resolve(_) => PbExitCode::UsageError,
            CliActionError::Session(_) => PbExitCode::AuthError,
            CliActionError::Api(e) => api_exit_code(e),
            CliActionError::Connection { .. } => PbExitCode::NetworkError,
            CliActionError::Formatting(_) | CliActionError::Json(_) => PbExitCode::DataError,
            CliActionError::NoActiveContext | CliActionError::ActiveContextMissing(_) => {
                PbExitCode::ConfigError
            }
            CliActionError::InputFile { .. } => PbExitCode::NoInput,
            CliActionError::Io(_) => PbExitCode::OSError,
            CliActionError::Prompt(_)
            | CliActionError::OutputExists(_)
            | CliActionError::MissingRequiredArgument(_)
            | CliActionError::InvalidInput(_)
            | CliActionError::Cancelled(_) => PbExitCode::UsageError,
        }
    }
}

fn api_exit_code(error: &ApiError) -> PbExitCode {
    if error.is_auth_error() {
        PbExitCode::AuthError
    } else if error.is_not_found() {
        PbExitCode::NotFound
    } else {
        match error {
            ApiError::Json(_) => PbExitCode::DataError,
            ApiError::Io { .. } => PbExitCode::OSError,
            ApiError::InvalidUrl(_) | ApiError::InvalidBaseUrl(_) => PbExitCode::ConfigError,
            ApiError::Http(_) if error.status().is_none() => PbExitCode::NetworkError,
            _ => PbExitCode::ApiError,
        }
    }
}
