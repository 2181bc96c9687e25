use pbcli::{
    cli::{execute_command, overrides_from},
    commands::{create_cli_commands, VALUE_OPTIONS},
    error::CliError,
    exit_codes::PbExitCode,
    registry::ContextRegistry,
    resolver::CommandResolver,
    storage::FileStorage,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), CliError> {
    // Abbreviated commands are expanded before clap sees them.
    let args = CommandResolver::new().expand_args(std::env::args(), VALUE_OPTIONS)?;

    let matches = match create_cli_commands().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(PbExitCode::UsageError.code());
        }
    };

    let overrides = overrides_from(&matches)?;
    let registry = ContextRegistry::new(FileStorage::open_default()?);
    let config = registry.load_global_config()?.with_overrides(&overrides);

    init_logging(config.debug);
    debug!("Expanded arguments: {:?}", args);

    execute_command(&matches, &registry, &config).await
}

/// Main entry point for the program
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code().code());
    }
}
