//! Record command definitions.

use crate::commands::params::{
    data_parameter, expand_parameter, fields_parameter, file_parameter, force_parameter,
    record_id_parameter, COMMAND_COLLECTIONS, COMMAND_CREATE, COMMAND_DELETE, COMMAND_GET,
    COMMAND_LIST, COMMAND_UPDATE, MAX_LIMIT, PARAMETER_COLLECTION, PARAMETER_FILTER,
    PARAMETER_LIMIT, PARAMETER_OFFSET, PARAMETER_QUIET, PARAMETER_SORT,
};
use clap::{Arg, ArgAction, Command};

/// Create the collections command: `collections <collection> <action>`.
pub fn collections_command() -> Command {
    Command::new(COMMAND_COLLECTIONS)
        .about("Work with records of a configured collection")
        .subcommand_required(true)
        .arg(
            Arg::new(PARAMETER_COLLECTION)
                .num_args(1)
                .required(true)
                .help("Collection name"),
        )
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List records")
                .arg(
                    Arg::new(PARAMETER_OFFSET)
                        .long(PARAMETER_OFFSET)
                        .num_args(1)
                        .default_value("0")
                        .help("Number of records to skip")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new(PARAMETER_LIMIT)
                        .long(PARAMETER_LIMIT)
                        .num_args(1)
                        .required(false)
                        .help("Maximum number of records to return (defaults to the configured page size)")
                        .value_parser(clap::value_parser!(u32).range(1..=i64::from(MAX_LIMIT))),
                )
                .arg(
                    Arg::new(PARAMETER_FILTER)
                        .long(PARAMETER_FILTER)
                        .num_args(1)
                        .required(false)
                        .help("Filter expression, e.g. 'published = true'"),
                )
                .arg(
                    Arg::new(PARAMETER_SORT)
                        .long(PARAMETER_SORT)
                        .num_args(1)
                        .required(false)
                        .help("Sort expression, e.g. '-created,title'"),
                )
                .arg(fields_parameter())
                .arg(expand_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get a record by ID")
                .arg(record_id_parameter())
                .arg(fields_parameter())
                .arg(expand_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a record from JSON")
                .arg(data_parameter())
                .arg(file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE)
                .about("Update a record from JSON")
                .arg(record_id_parameter())
                .arg(data_parameter())
                .arg(file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a record")
                .arg(record_id_parameter())
                .arg(force_parameter())
                .arg(
                    Arg::new(PARAMETER_QUIET)
                        .short('q')
                        .long(PARAMETER_QUIET)
                        .action(ArgAction::SetTrue)
                        .help("Suppress the success message"),
                ),
        )
}
