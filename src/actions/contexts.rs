use crate::{
    actions::{
        utils::{active_context, confirm, print_formatted, report_detail, report_success, report_warning},
        CliActionError,
    },
    configuration::GlobalConfig,
    context::Context,
    format::{self, render_table, Formattable, FormattingError, OutputFormat},
    model::split_list,
    registry::{ContextRegistry, RegistryError},
    session,
    storage::Storage,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

const HIDDEN_TOKEN: &str = "***HIDDEN***";

/// One row of `context list`.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub name: String,
    pub active: bool,
    pub authenticated: bool,
    pub status: String,
    pub url: String,
    pub auth_collection: String,
    pub collections: Vec<String>,
    pub auth_expires: Option<DateTime<Utc>>,
}

impl ContextSummary {
    fn new(context: &Context, active: bool) -> Self {
        let authenticated = context.is_authenticated();
        Self {
            name: context.name.clone(),
            active,
            authenticated,
            status: status_label(active, authenticated).to_string(),
            url: context.base_url.clone(),
            auth_collection: context.auth_collection.clone(),
            collections: context.available_collections.clone(),
            auth_expires: context.auth_expires,
        }
    }

    fn table_row(&self) -> Vec<String> {
        let name = if self.active {
            format!("* {}", self.name)
        } else {
            self.name.clone()
        };
        let collections = if self.collections.is_empty() {
            "None".to_string()
        } else {
            self.collections.join(", ")
        };
        let last_auth = self
            .auth_expires
            .map(|t| t.format("%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string());
        vec![
            name,
            self.status.clone(),
            self.url.clone(),
            self.auth_collection.clone(),
            collections,
            last_auth,
        ]
    }
}

fn status_label(active: bool, authenticated: bool) -> &'static str {
    match (active, authenticated) {
        (true, true) => "Active & Authenticated",
        (true, false) => "Active (Not Authenticated)",
        (false, true) => "Authenticated",
        (false, false) => "Not Authenticated",
    }
}

impl Formattable for Vec<ContextSummary> {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => Ok(render_table(
                &["NAME", "STATUS", "URL", "AUTH COLLECTION", "COLLECTIONS", "LAST AUTH"],
                self.iter().map(ContextSummary::table_row),
            )),
            _ => format::serialize(self, f),
        }
    }
}

/// A context prepared for display, with the token masked.
#[derive(Debug, Clone, Serialize)]
pub struct ContextView {
    #[serde(flatten)]
    pub context: Context,
    pub active: bool,
    pub session_valid: bool,
}

impl ContextView {
    pub fn new(mut context: Context, active: bool) -> Self {
        let session_valid = session::is_valid(&context);
        if !context.auth_token.is_empty() {
            context.auth_token = HIDDEN_TOKEN.to_string();
        }
        Self {
            context,
            active,
            session_valid,
        }
    }
}

impl Formattable for ContextView {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => {
                let ctx = &self.context;
                let collections = if ctx.available_collections.is_empty() {
                    "None configured".to_string()
                } else {
                    ctx.available_collections.join(", ")
                };
                let session = match (ctx.is_authenticated(), self.session_valid) {
                    (false, _) => "Not authenticated".to_string(),
                    (true, true) => "Valid".to_string(),
                    (true, false) => "Expired".to_string(),
                };
                let mut rows = vec![
                    vec!["Name".to_string(), ctx.name.clone()],
                    vec!["Active".to_string(), if self.active { "yes" } else { "no" }.to_string()],
                    vec!["URL".to_string(), ctx.base_url.clone()],
                    vec!["Auth Collection".to_string(), ctx.auth_collection.clone()],
                    vec!["Collections".to_string(), collections],
                    vec!["Session".to_string(), session],
                ];
                if let Some(expires) = ctx.auth_expires {
                    rows.push(vec![
                        "Expires".to_string(),
                        expires.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    ]);
                }
                if !ctx.auth_record.is_empty() {
                    rows.push(vec![
                        "Authenticated As".to_string(),
                        ctx.auth_record.display_name(),
                    ]);
                }
                Ok(render_table(&["FIELD", "VALUE"], rows))
            }
            _ => format::serialize(self, f),
        }
    }
}

/// The collection list of the active context.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionList {
    pub context: String,
    pub collections: Vec<String>,
}

impl Formattable for CollectionList {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => Ok(render_table(
                &["#", "COLLECTION"],
                self.collections
                    .iter()
                    .enumerate()
                    .map(|(i, c)| vec![(i + 1).to_string(), c.clone()]),
            )),
            _ => format::serialize(self, f),
        }
    }
}

pub fn create_context<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    name: &str,
    url: &str,
    auth_collection: &str,
    collections: Option<&str>,
) -> Result<(), CliActionError> {
    trace!("Executing 'context create' for '{}'", name);
    let mut context = Context::new(name, url).with_auth_collection(auth_collection);
    for collection in collections.map(split_list).unwrap_or_default() {
        if !context.is_collection_available(&collection) {
            context.add_collection(&collection)?;
        }
    }

    registry.create(&context)?;

    report_success(config, &format!("Context '{}' created successfully", name));
    report_detail("URL", &context.base_url);
    report_detail("Auth Collection", &context.auth_collection);
    report_detail("Backups", &registry.backup_dir(name).display().to_string());
    if !registry.load_global_config()?.has_active_context() {
        eprintln!("\nSelect it with: pb context select {}", name);
    }
    Ok(())
}

pub fn list_contexts<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliActionError> {
    let names = registry.list()?;
    if names.is_empty() && config.output_format == OutputFormat::Table {
        eprintln!("No contexts configured.\n\nCreate your first context:\n  pb context create <name> --url <url>");
        return Ok(());
    }

    let active = registry.load_global_config()?.active_context;
    let mut summaries = Vec::with_capacity(names.len());
    for name in &names {
        match registry.load(name) {
            Ok(context) => summaries.push(ContextSummary::new(&context, *name == active)),
            Err(e) => report_warning(config, &format!("Skipping context '{}': {}", name, e)),
        }
    }
    print_formatted(&summaries, config)
}

pub fn select_context<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    name: &str,
) -> Result<(), CliActionError> {
    registry.set_active(name)?;
    let context = registry.load(name)?;
    report_success(config, &format!("Context switched to '{}'", name));
    report_detail("URL", &context.base_url);
    if !session::is_valid(&context) {
        eprintln!("\nAuthenticate with: pb auth");
    }
    Ok(())
}

pub fn show_context<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    name: Option<&str>,
) -> Result<(), CliActionError> {
    let context = match name {
        Some(name) => registry.load(name)?,
        None => active_context(registry)?,
    };
    let active = registry.load_global_config()?.active_context == context.name;
    print_formatted(&ContextView::new(context, active), config)
}

pub fn delete_context<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    name: &str,
    force: bool,
) -> Result<(), CliActionError> {
    // An unreadable context file must not block its removal.
    let context = match registry.load(name) {
        Ok(context) => Some(context),
        Err(RegistryError::Storage(e)) => {
            report_warning(config, &format!("Context '{}' is unreadable: {}", name, e));
            None
        }
        Err(e) => return Err(e.into()),
    };
    let active = registry.load_global_config()?.active_context == name;

    if !force {
        eprintln!("Context to be deleted: {}", name);
        if let Some(context) = &context {
            report_detail("URL", &context.base_url);
            report_detail("Auth Collection", &context.auth_collection);
        }
        if active {
            report_detail("Status", "CURRENTLY ACTIVE");
        }
    }
    let prompt = format!("Delete context '{}' and all of its local data?", name);
    if !confirm(&prompt, force)? {
        return Err(CliActionError::Cancelled("context deletion".to_string()));
    }

    registry.delete(name)?;
    if active {
        debug!("Deleted the active context, clearing the pointer");
        registry.clear_active()?;
    }
    report_success(config, &format!("Context '{}' deleted successfully", name));
    Ok(())
}

pub fn add_collections<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collections: &[String],
) -> Result<(), CliActionError> {
    let context = active_context(registry)?;
    let outcome = registry.add_collections(&context.name, collections)?;

    if !outcome.added.is_empty() {
        report_success(
            config,
            &format!("Added collections: {}", outcome.added.join(", ")),
        );
    }
    if !outcome.skipped.is_empty() {
        report_detail("Already configured", &outcome.skipped.join(", "));
    }
    if outcome.added.is_empty() {
        eprintln!("All specified collections were already configured.");
    }
    Ok(())
}

pub fn remove_collection<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
) -> Result<(), CliActionError> {
    let context = active_context(registry)?;
    registry.remove_collection(&context.name, collection)?;
    report_success(config, &format!("Removed collection: {}", collection));
    Ok(())
}

pub fn list_collections<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
) -> Result<(), CliActionError> {
    let context = active_context(registry)?;
    if context.available_collections.is_empty() && config.output_format == OutputFormat::Table {
        eprintln!(
            "No collections configured for context '{}'.\n\nAdd collections with:\n  pb context collections add <name>",
            context.name
        );
        return Ok(());
    }
    print_formatted(
        &CollectionList {
            context: context.name,
            collections: context.available_collections,
        },
        config,
    )
}

pub fn clear_collections<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    force: bool,
) -> Result<(), CliActionError> {
    let context = active_context(registry)?;
    if context.available_collections.is_empty() {
        eprintln!("No collections configured for context '{}'.", context.name);
        return Ok(());
    }
    let prompt = format!(
        "Remove all {} collections from context '{}'?",
        context.available_collections.len(),
        context.name
    );
    if !confirm(&prompt, force)? {
        return Err(CliActionError::Cancelled("clearing collections".to_string()));
    }
    let removed = registry.clear_collections(&context.name)?;
    report_success(
        config,
        &format!(
            "Cleared {} collection(s) from context '{}'",
            removed, context.name
        ),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::Record, storage::FileStorage};
    use tempfile::TempDir;

    fn registry() -> (TempDir, ContextRegistry<FileStorage>) {
        let dir = TempDir::new().unwrap();
        let registry = ContextRegistry::new(FileStorage::new(dir.path()));
        (dir, registry)
    }

    fn quiet_config() -> GlobalConfig {
        GlobalConfig {
            colors_enabled: false,
            ..GlobalConfig::default()
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(true, true), "Active & Authenticated");
        assert_eq!(status_label(true, false), "Active (Not Authenticated)");
        assert_eq!(status_label(false, true), "Authenticated");
        assert_eq!(status_label(false, false), "Not Authenticated");
    }

    #[test]
    fn test_context_view_masks_token() {
        let mut context = Context::new("dev", "http://localhost:8090");
        session::apply_auth_result(&mut context, "secret".into(), None, Record::new());
        let json = ContextView::new(context, true).format(OutputFormat::Json).unwrap();
        assert!(json.contains(HIDDEN_TOKEN));
        assert!(!json.contains("secret"));
        assert!(json.contains("\"url\": \"http://localhost:8090\""));
    }

    #[test]
    fn test_summary_table_marks_active() {
        let context = Context::new("dev", "http://localhost:8090");
        let table = vec![ContextSummary::new(&context, true)]
            .format(OutputFormat::Table)
            .unwrap();
        assert!(table.contains("* dev"));
        assert!(table.contains("Active (Not Authenticated)"));
        assert!(table.contains("Never"));
    }

    #[test]
    fn test_create_with_collections() {
        let (_dir, registry) = registry();
        create_context(
            &registry,
            &quiet_config(),
            "dev",
            "http://localhost:8090",
            "users",
            Some("posts, comments,posts"),
        )
        .unwrap();
        let context = registry.load("dev").unwrap();
        assert_eq!(context.available_collections, vec!["posts", "comments"]);
    }

    #[test]
    fn test_delete_active_context_clears_pointer() {
        let (_dir, registry) = registry();
        let config = quiet_config();
        create_context(&registry, &config, "dev", "http://localhost:8090", "users", None).unwrap();
        registry.set_active("dev").unwrap();

        delete_context(&registry, &config, "dev", true).unwrap();
        assert!(!registry.exists("dev"));
        assert!(matches!(
            registry.get_active(),
            Err(RegistryError::NoActiveContext)
        ));
    }

    #[test]
    fn test_delete_unreadable_context() {
        let (dir, registry) = registry();
        let config = quiet_config();
        std::fs::create_dir_all(dir.path().join("dev")).unwrap();
        std::fs::write(dir.path().join("dev").join("context.yaml"), "name: [unclosed").unwrap();
        registry
            .save_global_config(&GlobalConfig {
                active_context: "dev".into(),
                ..GlobalConfig::default()
            })
            .unwrap();

        delete_context(&registry, &config, "dev", true).unwrap();
        assert!(!dir.path().join("dev").exists());
        assert!(!registry.load_global_config().unwrap().has_active_context());
    }

    #[test]
    fn test_show_with_dangling_active_context() {
        let (_dir, registry) = registry();
        let config = quiet_config();
        create_context(&registry, &config, "dev", "http://localhost:8090", "users", None).unwrap();
        registry.set_active("dev").unwrap();
        registry.delete("dev").unwrap();

        let err = show_context(&registry, &config, None).unwrap_err();
        assert!(matches!(err, CliActionError::ActiveContextMissing(ref n) if n == "dev"));
        assert!(err.to_string().contains("pb context select"));
    }

    #[test]
    fn test_collection_actions_need_active_context() {
        let (_dir, registry) = registry();
        let err = add_collections(&registry, &quiet_config(), &["posts".to_string()]).unwrap_err();
        assert!(matches!(err, CliActionError::NoActiveContext));
    }

    #[test]
    fn test_clear_collections_forced() {
        let (_dir, registry) = registry();
        let config = quiet_config();
        create_context(&registry, &config, "dev", "http://localhost:8090", "users", Some("a,b"))
            .unwrap();
        registry.set_active("dev").unwrap();

        clear_collections(&registry, &config, true).unwrap();
        assert!(registry.load("dev").unwrap().available_collections.is_empty());
    }
}
