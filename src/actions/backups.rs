use crate::{
    actions::{
        auth::spinner,
        utils::{authenticated_context, confirm, print_formatted, report_detail, report_success},
        CliActionError,
    },
    client::PocketBaseClient,
    configuration::GlobalConfig,
    context::Context,
    format::{Formattable, OutputFormat},
    model::Backup,
    registry::ContextRegistry,
    storage::Storage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

fn backup_client<S: Storage>(
    registry: &ContextRegistry<S>,
) -> Result<(Context, PocketBaseClient), CliActionError> {
    let context = authenticated_context(registry)?;
    let client = PocketBaseClient::from_context(&context)?;
    Ok((context, client))
}

fn report_backup(backup: &Backup) {
    report_detail("Name", &backup.key);
    report_detail("Size", &backup.human_size());
    if !backup.modified.is_empty() {
        report_detail("Created", &backup.formatted_date());
    }
}

/// Where a download lands. Defaults to the context's backups directory; an
/// existing directory gets the backup name appended.
pub fn resolve_download_path(
    key: &str,
    requested: Option<&Path>,
    default_dir: &Path,
    force: bool,
) -> Result<PathBuf, CliActionError> {
    let mut path = requested
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_dir.join(key));
    if path.is_dir() {
        path = path.join(key);
    }
    if path.exists() && !force {
        return Err(CliActionError::OutputExists(path));
    }
    Ok(path)
}

pub async fn list_backups<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliActionError> {
    trace!("Executing 'backup list'");
    let (context, client) = backup_client(registry)?;
    let mut backups = client.list_backups().await?;
    backups.sort_by(|a, b| b.modified_at().cmp(&a.modified_at()));

    if config.output_format != OutputFormat::Table {
        return print_formatted(&backups, config);
    }
    if backups.is_empty() {
        println!("No backups found.");
        eprintln!("\nCreate your first backup with: pb backup create");
        return Ok(());
    }
    println!(
        "Backups for context '{}' ({} total):\n\n{}",
        context.name,
        backups.len(),
        backups.format(OutputFormat::Table)?
    );
    Ok(())
}

pub async fn create_backup<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    name: Option<&str>,
) -> Result<(), CliActionError> {
    let (context, client) = backup_client(registry)?;

    let progress = spinner("Creating backup...");
    let backup = client.create_backup(name).await;
    progress.finish_and_clear();
    let backup = backup?;

    report_success(config, "Backup created successfully!");
    report_backup(&backup);
    report_detail("Context", &context.name);
    print_formatted(&backup, config)
}

pub async fn download_backup<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    key: &str,
    requested: Option<&Path>,
    force: bool,
) -> Result<(), CliActionError> {
    let (context, client) = backup_client(registry)?;
    let backup = client.get_backup(key).await?;
    let destination =
        resolve_download_path(key, requested, &registry.backup_dir(&context.name), force)?;
    debug!("Downloading backup '{}' to {}", key, destination.display());

    eprintln!("Download Details:");
    report_backup(&backup);
    report_detail("Output", &destination.display().to_string());

    let progress = ProgressBar::new(backup.size);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        progress.set_style(style.progress_chars("#>-"));
    }
    let written = client
        .download_backup(key, &destination, |n| progress.inc(n))
        .await;
    progress.finish_and_clear();
    let written = written?;

    report_success(config, "Backup downloaded successfully!");
    report_detail("Downloaded", &crate::format::human_size(written));
    report_detail("Location", &destination.display().to_string());
    report_detail("Context", &context.name);
    Ok(())
}

pub async fn upload_backup<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    file: &Path,
    name: Option<&str>,
) -> Result<(), CliActionError> {
    if !file.is_file() {
        return Err(CliActionError::InputFile {
            path: file.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
        });
    }
    let (context, client) = backup_client(registry)?;

    let progress = spinner(&format!("Uploading {}...", file.display()));
    let backup = client.upload_backup(file, name).await;
    progress.finish_and_clear();
    let backup = backup?;

    report_success(config, "Backup uploaded successfully!");
    report_backup(&backup);
    report_detail("Context", &context.name);
    print_formatted(&backup, config)
}

pub async fn delete_backup<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    key: &str,
    force: bool,
) -> Result<(), CliActionError> {
    let (context, client) = backup_client(registry)?;
    let backup = client.get_backup(key).await?;

    if !force {
        eprintln!("Backup to be deleted:");
        report_backup(&backup);
        report_detail("Context", &context.name);
    }
    if !confirm("Are you sure you want to delete this backup?", force)? {
        return Err(CliActionError::Cancelled("backup deletion".to_string()));
    }

    client.delete_backup(key).await?;
    report_success(config, "Backup deleted successfully!");
    report_detail("Backup", &backup.key);
    report_detail("Size freed", &backup.human_size());
    Ok(())
}

pub async fn restore_backup<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    key: &str,
    force: bool,
) -> Result<(), CliActionError> {
    let (context, client) = backup_client(registry)?;
    let backup = client.get_backup(key).await?;

    if !force {
        eprintln!("Backup to restore:");
        report_backup(&backup);
        report_detail("Context", &context.name);
        eprintln!("\nRestoring replaces ALL current data on the server and restarts it.");
    }
    if !confirm("Are you sure you want to restore this backup?", force)? {
        return Err(CliActionError::Cancelled("restore".to_string()));
    }

    let progress = spinner("Restoring backup...");
    let result = client.restore_backup(key).await;
    progress.finish_and_clear();
    result?;

    report_success(config, "Backup restore started successfully!");
    report_detail("Backup", &backup.key);
    report_detail("Context", &context.name);
    eprintln!("\nThe server restarts during the restore. Authenticate again with: pb auth");
    Ok(())
}
