use crate::{
    actions::{
        utils::{
            authenticated_context, confirm, print_formatted, read_json_input, report_detail,
            report_success, validate_record_data, validate_record_id, DataAction,
        },
        CliActionError,
    },
    client::PocketBaseClient,
    configuration::GlobalConfig,
    context::Context,
    format::{title_case, Formattable, OutputFormat},
    model::{ListOptions, RecordsList},
    record::Record,
    registry::ContextRegistry,
    resolver::CommandResolver,
    storage::Storage,
};
use std::path::Path;
use tracing::{debug, trace};

const RECORD_RULE_WIDTH: usize = 50;

/// Active, authenticated context in which `collection` is configured.
fn collection_context<S: Storage>(
    registry: &ContextRegistry<S>,
    collection: &str,
) -> Result<Context, CliActionError> {
    let context = authenticated_context(registry)?;
    CommandResolver::validate_collection(collection, &context.available_collections)?;
    Ok(context)
}

/// Table rendering of one page with a title line and navigation hints.
pub fn render_records_page(collection: &str, list: &RecordsList) -> String {
    if list.items.is_empty() {
        return format!("No {} found.", collection);
    }

    let (first, last) = list.item_range();
    let mut out = format!(
        "{} ({}-{} of {} total)\n\n{}",
        title_case(collection),
        first,
        last,
        list.total_items,
        crate::model::records_table(&list.items)
    );

    if list.total_pages > 1 {
        out.push_str("\n\nPagination:");
        let (previous, next) = list.navigation();
        if let Some(offset) = previous {
            out.push_str(&format!("\n  Previous: --offset {}", offset));
        }
        if let Some(offset) = next {
            out.push_str(&format!("\n  Next: --offset {}", offset));
        }
        out.push_str(&format!(
            "\n  Page {} of {} (use --offset to navigate)",
            list.page, list.total_pages
        ));
    }
    out
}

/// Table rendering of a single record under a heading.
pub fn render_record(collection: &str, record: &Record) -> Result<String, CliActionError> {
    Ok(format!(
        "{} Record: {}\n{}\n{}",
        title_case(collection),
        record.id().unwrap_or_default(),
        "=".repeat(RECORD_RULE_WIDTH),
        record.format(OutputFormat::Table)?
    ))
}

fn print_record(
    collection: &str,
    record: &Record,
    config: &GlobalConfig,
) -> Result<(), CliActionError> {
    match config.output_format {
        OutputFormat::Table => {
            println!("{}", render_record(collection, record)?);
            Ok(())
        }
        _ => print_formatted(record, config),
    }
}

pub async fn list_records<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
    options: &ListOptions,
) -> Result<(), CliActionError> {
    trace!("Listing records of '{}'", collection);
    let context = collection_context(registry, collection)?;
    let client = PocketBaseClient::from_context(&context)?;

    let list = client.list_records(collection, options).await?;
    debug!(
        "Received {} of {} records from '{}'",
        list.items.len(),
        list.total_items,
        collection
    );

    match config.output_format {
        OutputFormat::Table => {
            println!("{}", render_records_page(collection, &list));
            Ok(())
        }
        _ => print_formatted(&list, config),
    }
}

pub async fn get_record<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
    id: &str,
    expand: &[String],
    fields: &[String],
) -> Result<(), CliActionError> {
    validate_record_id(id)?;
    let context = collection_context(registry, collection)?;
    let client = PocketBaseClient::from_context(&context)?;

    let record = client.get_record(collection, id, expand, fields).await?;
    print_record(collection, &record, config)
}

pub async fn create_record<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
    data: Option<&str>,
    file: Option<&Path>,
) -> Result<(), CliActionError> {
    let context = collection_context(registry, collection)?;
    let record = read_json_input(data, file)?;
    validate_record_data(&record, DataAction::Create)?;

    let client = PocketBaseClient::from_context(&context)?;
    let created = client.create_record(collection, &record).await?;

    report_success(config, "Record created successfully!");
    if let Some(id) = created.id() {
        report_detail("Record ID", id);
        report_detail("Collection", collection);
        report_detail("Display", &created.display_name());
    }
    print_record(collection, &created, config)
}

pub async fn update_record<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
    id: &str,
    data: Option<&str>,
    file: Option<&Path>,
) -> Result<(), CliActionError> {
    validate_record_id(id)?;
    let context = collection_context(registry, collection)?;
    let changes = read_json_input(data, file)?;
    validate_record_data(&changes, DataAction::Update)?;

    let client = PocketBaseClient::from_context(&context)?;
    let updated = client.update_record(collection, id, &changes).await?;

    report_success(config, "Record updated successfully!");
    report_detail("Record ID", id);
    report_detail("Collection", collection);
    report_detail("Updated", &format!("{} field(s)", changes.fields().len()));
    print_record(collection, &updated, config)
}

pub async fn delete_record<S: Storage>(
    registry: &ContextRegistry<S>,
    config: &GlobalConfig,
    collection: &str,
    id: &str,
    force: bool,
    quiet: bool,
) -> Result<(), CliActionError> {
    validate_record_id(id)?;
    let context = collection_context(registry, collection)?;
    let client = PocketBaseClient::from_context(&context)?;

    let mut display = None;
    if !force {
        let record = client.get_record(collection, id, &[], &[]).await?;
        eprintln!("Record to be deleted:");
        report_detail("Collection", collection);
        report_detail("Record ID", id);
        report_detail("Display", &record.display_name());
        display = Some(record.display_name());
        if !confirm("Are you sure you want to delete this record?", false)? {
            return Err(CliActionError::Cancelled("deletion".to_string()));
        }
    }

    client.delete_record(collection, id).await?;

    if !quiet {
        report_success(config, "Record deleted successfully!");
        report_detail("Record ID", id);
        report_detail("Collection", collection);
        if let Some(display) = display {
            report_detail("Display", &display);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{resolver::ResolveError, session, storage::FileStorage};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn page(page: u32, total_pages: u32, items: serde_json::Value) -> RecordsList {
        serde_json::from_value(json!({
            "page": page, "perPage": 2, "totalItems": 5, "totalPages": total_pages,
            "items": items
        }))
        .unwrap()
    }

    fn registry(url: &str, authenticated: bool) -> (TempDir, ContextRegistry<FileStorage>) {
        let dir = TempDir::new().unwrap();
        let registry = ContextRegistry::new(FileStorage::new(dir.path()));
        let mut context = Context::new("dev", url);
        context.add_collection("posts").unwrap();
        if authenticated {
            session::apply_auth_result(
                &mut context,
                "tok".into(),
                Some(Utc::now() + Duration::days(1)),
                Record::new(),
            );
        }
        registry.create(&context).unwrap();
        registry.set_active("dev").unwrap();
        (dir, registry)
    }

    fn quiet() -> GlobalConfig {
        GlobalConfig {
            colors_enabled: false,
            ..GlobalConfig::default()
        }
    }

    #[test]
    fn test_render_empty_page() {
        assert_eq!(render_records_page("posts", &page(1, 0, json!([]))), "No posts found.");
    }

    #[test]
    fn test_render_middle_page_has_navigation() {
        let out = render_records_page("posts", &page(2, 3, json!([{"id": "c"}, {"id": "d"}])));
        assert!(out.starts_with("Posts (3-4 of 5 total)"));
        assert!(out.contains("Previous: --offset 0"));
        assert!(out.contains("Next: --offset 4"));
        assert!(out.contains("Page 2 of 3 (use --offset to navigate)"));
    }

    #[test]
    fn test_render_single_page_has_no_navigation() {
        let list: RecordsList = serde_json::from_value(json!({
            "page": 1, "perPage": 30, "totalItems": 1, "totalPages": 1,
            "items": [{"id": "a"}]
        }))
        .unwrap();
        assert!(!render_records_page("posts", &list).contains("Pagination"));
    }

    #[test]
    fn test_render_record_heading() {
        let record = Record::try_from(json!({"id": "r1", "title": "Hello"})).unwrap();
        let out = render_record("posts", &record).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Posts Record: r1"));
        assert_eq!(lines.next(), Some("=".repeat(50).as_str()));
    }

    #[tokio::test]
    async fn test_unconfigured_collection_is_rejected_before_request() {
        let (_dir, registry) = registry("http://127.0.0.1:9", true);
        let err = list_records(&registry, &quiet(), "comments", &ListOptions::from_offset(0, 30))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliActionError::Resolve(ResolveError::NotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn test_unauthenticated_context_is_rejected() {
        let (_dir, registry) = registry("http://127.0.0.1:9", false);
        let err = get_record(&registry, &quiet(), "posts", "r1", &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CliActionError::Session(_)));
    }

    #[tokio::test]
    async fn test_list_sends_token_and_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/posts/records"))
            .and(query_param("page", "2"))
            .and(query_param("perPage", "10"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2, "perPage": 10, "totalItems": 12, "totalPages": 2, "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, registry) = registry(&server.uri(), true);
        list_records(&registry, &quiet(), "posts", &ListOptions::from_offset(10, 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forced_delete_skips_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/collections/posts/records/r1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, registry) = registry(&server.uri(), true);
        delete_record(&registry, &quiet(), "posts", "r1", true, true)
            .await
            .unwrap();
    }
}
