use crate::{
    actions::{
        utils::{active_context, report_detail, report_success},
        CliActionError,
    },
    client::PocketBaseClient,
    configuration::GlobalConfig,
    context::validate_collection_name,
    registry::ContextRegistry,
    session,
    storage::Storage,
};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, trace};

/// Credentials given on the command line. Missing values are prompted for.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub identity: Option<String>,
    pub password: Option<String>,
    pub collection: Option<String>,
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn collection_label(collection: &str) -> String {
    match collection {
        "users" => "Users".to_string(),
        "_superusers" => "Superusers".to_string(),
        other => format!("Collection: {}", other),
    }
}

/// Authenticate the active context with identity and password and store the
/// resulting session in it.
pub async fn authenticate<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    credentials: Credentials,
) -> Result<(), CliActionError> {
    trace!("Executing 'auth' command");
    let mut context = active_context(registry)?;

    let collection = credentials
        .collection
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| context.auth_collection.clone());
    validate_collection_name(&collection)?;

    let identity = match credentials.identity.filter(|i| !i.is_empty()) {
        Some(identity) => identity,
        None => inquire::Text::new("Email:").prompt()?,
    };
    let password = match credentials.password.filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()?,
    };
    if identity.trim().is_empty() {
        return Err(CliActionError::InvalidInput("identity cannot be empty".to_string()));
    }
    if password.is_empty() {
        return Err(CliActionError::InvalidInput("password cannot be empty".to_string()));
    }

    let client = PocketBaseClient::new(&context.base_url)?;

    let progress = spinner("Testing connection to PocketBase...");
    if let Err(source) = client.health().await {
        progress.finish_and_clear();
        return Err(CliActionError::Connection {
            url: context.base_url.clone(),
            source,
        });
    }

    progress.set_message(format!("Authenticating with collection '{}'...", collection));
    let response = client
        .auth_with_password(&collection, &identity, &password)
        .await;
    progress.finish_and_clear();
    let response = response?;

    let expires = session::resolve_expiry(&response.token, Utc::now());
    debug!("Session for context '{}' expires at {}", context.name, expires);
    session::apply_auth_result(&mut context, response.token, Some(expires), response.record);
    context.auth_collection = collection.clone();
    registry.save(&context)?;

    report_success(config, "Authentication successful!");
    report_detail("Collection", &collection_label(&collection));
    report_detail("Identity", &identity);
    report_detail("Expires", &expires.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    report_detail("Context", &context.name);
    let name = context.auth_record.display_name();
    if name != "Unknown" {
        report_detail("Name", &name);
    }
    if context.available_collections.is_empty() {
        eprintln!("\nNext step: pb context collections add <name>");
    }
    Ok(())
}
