//! Dispatch of parsed command lines to their actions.

use crate::{
    actions::{auth, backups, collections, contexts, CliActionError},
    commands::params::{
        COMMAND_ADD, COMMAND_AUTH, COMMAND_BACKUP, COMMAND_CLEAR, COMMAND_COLLECTIONS,
        COMMAND_CONTEXT, COMMAND_CREATE, COMMAND_DELETE, COMMAND_DOWNLOAD, COMMAND_GET,
        COMMAND_LIST, COMMAND_PB, COMMAND_REMOVE, COMMAND_RESTORE, COMMAND_SELECT,
        COMMAND_SHOW, COMMAND_UPDATE, COMMAND_UPLOAD, COMMAND_VERSION, PARAMETER_AUTH_COLLECTION,
        PARAMETER_COLLECTION, PARAMETER_COLLECTIONS, PARAMETER_COLORS, PARAMETER_DATA,
        PARAMETER_DEBUG, PARAMETER_EMAIL, PARAMETER_EXPAND, PARAMETER_FIELDS, PARAMETER_FILE,
        PARAMETER_FILTER, PARAMETER_FORCE, PARAMETER_ID, PARAMETER_KEY, PARAMETER_LIMIT,
        PARAMETER_NAME, PARAMETER_OFFSET, PARAMETER_OUTPUT, PARAMETER_PASSWORD, PARAMETER_PATH,
        PARAMETER_QUIET, PARAMETER_SORT, PARAMETER_URL,
    },
    configuration::{GlobalConfig, Overrides},
    error::CliError,
    format::OutputFormat,
    model::{split_list, ListOptions},
    registry::ContextRegistry,
    storage::Storage,
};
use clap::ArgMatches;
use std::path::PathBuf;
use tracing::trace;

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    sub_matches
        .subcommand()
        .map(|(name, _)| name)
        .unwrap_or("unknown")
        .to_string()
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}

fn missing(id: &str) -> CliError {
    CliActionError::MissingRequiredArgument(id.to_string()).into()
}

/// Required positional arguments are enforced by clap before dispatch.
fn required_arg<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str, CliError> {
    string_arg(matches, id).ok_or_else(|| missing(id))
}

fn list_arg(matches: &ArgMatches, id: &str) -> Vec<String> {
    string_arg(matches, id).map(split_list).unwrap_or_default()
}

/// Per-invocation overrides of the stored global configuration.
pub fn overrides_from(matches: &ArgMatches) -> Result<Overrides, CliError> {
    let output_format = string_arg(matches, PARAMETER_OUTPUT)
        .map(OutputFormat::parse)
        .transpose()?;
    Ok(Overrides {
        output_format,
        colors_enabled: matches.get_one::<bool>(PARAMETER_COLORS).copied(),
        debug: matches.get_flag(PARAMETER_DEBUG),
    })
}

pub async fn execute_command<S: Storage>(
    matches: &ArgMatches,
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliError> {
    match matches.subcommand() {
        Some((COMMAND_CONTEXT, sub_matches)) => context_command(sub_matches, registry, config),
        Some((COMMAND_COLLECTIONS, sub_matches)) => {
            collections_command(sub_matches, registry, config).await
        }
        Some((COMMAND_AUTH, sub_matches)) => {
            let args = match sub_matches.subcommand() {
                Some((COMMAND_PB, pb_matches)) => pb_matches,
                _ => sub_matches,
            };
            let credentials = auth::Credentials {
                identity: string_arg(args, PARAMETER_EMAIL).map(String::from),
                password: string_arg(args, PARAMETER_PASSWORD).map(String::from),
                collection: string_arg(args, PARAMETER_COLLECTION).map(String::from),
            };
            Ok(auth::authenticate(registry, config, credentials).await?)
        }
        Some((COMMAND_BACKUP, sub_matches)) => backup_command(sub_matches, registry, config).await,
        Some((COMMAND_VERSION, _)) => {
            println!("pb version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            matches,
        ))),
    }
}

fn context_command<S: Storage>(
    matches: &ArgMatches,
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliError> {
    trace!("Dispatching context command");
    match matches.subcommand() {
        Some((COMMAND_CREATE, m)) => Ok(contexts::create_context(
            registry,
            config,
            required_arg(m, PARAMETER_NAME)?,
            required_arg(m, PARAMETER_URL)?,
            required_arg(m, PARAMETER_AUTH_COLLECTION)?,
            string_arg(m, PARAMETER_COLLECTIONS),
        )?),
        Some((COMMAND_LIST, _)) => Ok(contexts::list_contexts(registry, config)?),
        Some((COMMAND_SELECT, m)) => Ok(contexts::select_context(
            registry,
            config,
            required_arg(m, PARAMETER_NAME)?,
        )?),
        Some((COMMAND_SHOW, m)) => Ok(contexts::show_context(
            registry,
            config,
            string_arg(m, PARAMETER_NAME),
        )?),
        Some((COMMAND_DELETE, m)) => Ok(contexts::delete_context(
            registry,
            config,
            required_arg(m, PARAMETER_NAME)?,
            m.get_flag(PARAMETER_FORCE),
        )?),
        Some((COMMAND_COLLECTIONS, m)) => match m.subcommand() {
            Some((COMMAND_ADD, m)) => {
                let names: Vec<String> = m
                    .get_many::<String>(PARAMETER_NAME)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                Ok(contexts::add_collections(registry, config, &names)?)
            }
            Some((COMMAND_REMOVE, m)) => Ok(contexts::remove_collection(
                registry,
                config,
                required_arg(m, PARAMETER_COLLECTION)?,
            )?),
            Some((COMMAND_LIST, _)) => Ok(contexts::list_collections(registry, config)?),
            Some((COMMAND_CLEAR, m)) => Ok(contexts::clear_collections(
                registry,
                config,
                m.get_flag(PARAMETER_FORCE),
            )?),
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(m))),
        },
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            matches,
        ))),
    }
}

async fn collections_command<S: Storage>(
    matches: &ArgMatches,
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliError> {
    let collection = required_arg(matches, PARAMETER_COLLECTION)?;
    trace!("Dispatching record command for '{}'", collection);

    match matches.subcommand() {
        Some((COMMAND_LIST, m)) => {
            let offset = m.get_one::<u32>(PARAMETER_OFFSET).copied().unwrap_or(0);
            let limit = m
                .get_one::<u32>(PARAMETER_LIMIT)
                .copied()
                .unwrap_or(config.pagination_size);
            let options = ListOptions {
                filter: string_arg(m, PARAMETER_FILTER).map(String::from),
                sort: string_arg(m, PARAMETER_SORT).map(String::from),
                fields: list_arg(m, PARAMETER_FIELDS),
                expand: list_arg(m, PARAMETER_EXPAND),
                ..ListOptions::from_offset(offset, limit)
            };
            Ok(collections::list_records(registry, config, collection, &options).await?)
        }
        Some((COMMAND_GET, m)) => Ok(collections::get_record(
            registry,
            config,
            collection,
            required_arg(m, PARAMETER_ID)?,
            &list_arg(m, PARAMETER_EXPAND),
            &list_arg(m, PARAMETER_FIELDS),
        )
        .await?),
        Some((COMMAND_CREATE, m)) => Ok(collections::create_record(
            registry,
            config,
            collection,
            string_arg(m, PARAMETER_DATA),
            m.get_one::<PathBuf>(PARAMETER_FILE).map(PathBuf::as_path),
        )
        .await?),
        Some((COMMAND_UPDATE, m)) => Ok(collections::update_record(
            registry,
            config,
            collection,
            required_arg(m, PARAMETER_ID)?,
            string_arg(m, PARAMETER_DATA),
            m.get_one::<PathBuf>(PARAMETER_FILE).map(PathBuf::as_path),
        )
        .await?),
        Some((COMMAND_DELETE, m)) => Ok(collections::delete_record(
            registry,
            config,
            collection,
            required_arg(m, PARAMETER_ID)?,
            m.get_flag(PARAMETER_FORCE),
            m.get_flag(PARAMETER_QUIET),
        )
        .await?),
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            matches,
        ))),
    }
}

async fn backup_command<S: Storage>(
    matches: &ArgMatches,
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliError> {
    match matches.subcommand() {
        Some((COMMAND_LIST, _)) => Ok(backups::list_backups(registry, config).await?),
        Some((COMMAND_CREATE, m)) => {
            Ok(backups::create_backup(registry, config, string_arg(m, PARAMETER_NAME)).await?)
        }
        Some((COMMAND_DOWNLOAD, m)) => Ok(backups::download_backup(
            registry,
            config,
            required_arg(m, PARAMETER_KEY)?,
            m.get_one::<PathBuf>(PARAMETER_PATH).map(PathBuf::as_path),
            m.get_flag(PARAMETER_FORCE),
        )
        .await?),
        Some((COMMAND_UPLOAD, m)) => {
            let file = m
                .get_one::<PathBuf>(PARAMETER_FILE)
                .ok_or_else(|| missing(PARAMETER_FILE))?;
            Ok(backups::upload_backup(registry, config, file, string_arg(m, PARAMETER_NAME)).await?)
        }
        Some((COMMAND_DELETE, m)) => Ok(backups::delete_backup(
            registry,
            config,
            required_arg(m, PARAMETER_KEY)?,
            m.get_flag(PARAMETER_FORCE),
        )
        .await?),
        Some((COMMAND_RESTORE, m)) => Ok(backups::restore_backup(
            registry,
            config,
            required_arg(m, PARAMETER_KEY)?,
            m.get_flag(PARAMETER_FORCE),
        )
        .await?),
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            matches,
        ))),
    }
}
