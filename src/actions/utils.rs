use crate::{
    actions::CliActionError,
    configuration::GlobalConfig,
    context::Context,
    format::Formattable,
    record::{Record, SYSTEM_FIELDS},
    registry::{ContextRegistry, RegistryError},
    session,
    storage::Storage,
};
use color_print::cformat;
use std::{
    io::{IsTerminal, Read},
    path::Path,
};
use tracing::{debug, trace};

pub const MAX_RECORD_ID_LENGTH: usize = 255;

/// Print a value to stdout in the configured output format.
pub fn print_formatted<T: Formattable + ?Sized>(
    value: &T,
    config: &GlobalConfig,
) -> Result<(), CliActionError> {
    println!("{}", value.format(config.output_format)?);
    Ok(())
}

/// Status line on stderr so that stdout stays parseable.
pub fn report_success(config: &GlobalConfig, message: &str) {
    if config.colors_enabled {
        eprintln!("{}", cformat!("<green>✓</green> {}", message));
    } else {
        eprintln!("✓ {}", message);
    }
}

pub fn report_warning(config: &GlobalConfig, message: &str) {
    tracing::warn!("{}", message);
    if config.colors_enabled {
        eprintln!("{}", cformat!("<yellow>Warning:</yellow> {}", message));
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Indented `label: value` detail line on stderr.
pub fn report_detail(label: &str, value: &str) {
    eprintln!("  {}: {}", label, value);
}

/// Load the active context.
pub fn active_context<S: Storage>(
    registry: &ContextRegistry<S>,
) -> Result<Context, CliActionError> {
    registry.get_active().map_err(|e| match e {
        RegistryError::NoActiveContext => CliActionError::NoActiveContext,
        RegistryError::NotFound(name) => CliActionError::ActiveContextMissing(name),
        other => other.into(),
    })
}

/// Load the active context and make sure its session can be used.
pub fn authenticated_context<S: Storage>(
    registry: &ContextRegistry<S>,
) -> Result<Context, CliActionError> {
    let context = active_context(registry)?;
    session::ensure_usable(&context)?;
    trace!("Using authenticated context '{}'", context.name);
    Ok(context)
}

/// Ask the user to confirm a destructive operation. `force` skips the prompt.
pub fn confirm(prompt: &str, force: bool) -> Result<bool, CliActionError> {
    if force {
        return Ok(true);
    }
    let answer = inquire::Confirm::new(prompt)
        .with_default(false)
        .with_help_message("This action cannot be undone")
        .prompt()?;
    Ok(answer)
}

/// Reads record JSON from a file, the inline argument or piped stdin, in
/// that order of precedence.
pub fn read_json_input(data: Option<&str>, file: Option<&Path>) -> Result<Record, CliActionError> {
    let stdin = std::io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    load_json_input(data, file, piped)
}

pub fn load_json_input<R: Read>(
    data: Option<&str>,
    file: Option<&Path>,
    piped: Option<R>,
) -> Result<Record, CliActionError> {
    let raw = if let Some(path) = file {
        debug!("Reading record data from {}", path.display());
        std::fs::read_to_string(path).map_err(|source| CliActionError::InputFile {
            path: path.to_path_buf(),
            source,
        })?
    } else if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
        data.to_string()
    } else if let Some(mut reader) = piped {
        debug!("Reading record data from stdin");
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        buffer
    } else {
        String::new()
    };

    if raw.trim().is_empty() {
        return Err(CliActionError::InvalidInput(
            "JSON data is required either from an argument, the --file flag, or piped from stdin"
                .to_string(),
        ));
    }
    parse_record_json(&raw)
}

pub fn parse_record_json(raw: &str) -> Result<Record, CliActionError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    Record::try_from(value)
        .map_err(|_| CliActionError::InvalidInput("JSON data must be an object".to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAction {
    Create,
    Update,
}

/// Rejects empty payloads and server-managed fields.
pub fn validate_record_data(record: &Record, action: DataAction) -> Result<(), CliActionError> {
    if record.is_empty() {
        let message = match action {
            DataAction::Create => "record data cannot be empty",
            DataAction::Update => "update data cannot be empty",
        };
        return Err(CliActionError::InvalidInput(message.to_string()));
    }
    if let Some(field) = SYSTEM_FIELDS.iter().find(|f| record.has_field(f)) {
        let message = match action {
            DataAction::Create => format!(
                "field '{}' is automatically managed and should not be included",
                field
            ),
            DataAction::Update => {
                format!("field '{}' is automatically managed and cannot be updated", field)
            }
        };
        return Err(CliActionError::InvalidInput(message));
    }
    Ok(())
}

pub fn validate_record_id(id: &str) -> Result<(), CliActionError> {
    if id.trim().is_empty() {
        return Err(CliActionError::InvalidInput(
            "record ID cannot be empty".to_string(),
        ));
    }
    if id.chars().count() > MAX_RECORD_ID_LENGTH {
        return Err(CliActionError::InvalidInput(format!(
            "record ID must be between 1 and {} characters",
            MAX_RECORD_ID_LENGTH
        )));
    }
    Ok(())
}
