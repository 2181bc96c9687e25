//! Wire types of the PocketBase REST API.

use crate::{
    format::{self, render_table, Formattable, FormattingError, OutputFormat},
    record::{parse_time, Record},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub identity: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub record: Record,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileToken {
    pub token: String,
}

/// One page of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsList {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub items: Vec<Record>,
}

impl RecordsList {
    /// 1-based positions of the first and last item on this page.
    pub fn item_range(&self) -> (u64, u64) {
        if self.items.is_empty() {
            return (0, 0);
        }
        let first = u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page) + 1;
        let last = (first + self.items.len() as u64 - 1).min(self.total_items.max(first));
        (first, last)
    }

    /// Offsets of the previous and next pages, when they exist.
    pub fn navigation(&self) -> (Option<u64>, Option<u64>) {
        let per_page = u64::from(self.per_page);
        let page = u64::from(self.page);
        let previous = (self.page > 1).then(|| (page - 2) * per_page);
        let next = (self.page < self.total_pages).then(|| page * per_page);
        (previous, next)
    }
}

impl Formattable for RecordsList {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => Ok(records_table(&self.items)),
            _ => format::serialize(self, f),
        }
    }
}

impl Formattable for Record {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => {
                let rows = ordered_fields(self)
                    .into_iter()
                    .map(|(k, v)| vec![format::title_case(k), format::cell_value(v)]);
                Ok(render_table(&["FIELD", "VALUE"], rows))
            }
            _ => format::serialize(self, f),
        }
    }
}

const LEADING_FIELDS: [&str; 5] = ["id", "name", "title", "email", "username"];
const TRAILING_FIELDS: [&str; 2] = ["created", "updated"];

/// Fields with identifying ones first and timestamps last. `expand` is omitted.
fn ordered_fields(record: &Record) -> Vec<(&str, &serde_json::Value)> {
    let fields = record.fields();
    let pick = |name: &'static str| fields.get(name).map(|v| (name, v));

    let mut ordered: Vec<(&str, &serde_json::Value)> =
        LEADING_FIELDS.into_iter().filter_map(pick).collect();
    ordered.extend(
        fields
            .iter()
            .filter(|(k, _)| {
                let k = k.as_str();
                k != "expand" && !LEADING_FIELDS.contains(&k) && !TRAILING_FIELDS.contains(&k)
            })
            .map(|(k, v)| (k.as_str(), v)),
    );
    ordered.extend(TRAILING_FIELDS.into_iter().filter_map(pick));
    ordered
}

/// One row per record. Columns follow the field order of the first record.
pub fn records_table(records: &[Record]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for (name, _) in ordered_fields(record) {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
    }

    let headers: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
    let rows = records.iter().map(|record| {
        columns
            .iter()
            .map(|c| record.get(c).map(format::cell_value).unwrap_or_default())
            .collect()
    });
    render_table(&headers, rows)
}

/// Query options of a record listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
}

impl ListOptions {
    /// Converts an item offset into the 1-based page containing it.
    pub fn from_offset(offset: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        Self {
            page: offset / limit + 1,
            per_page: limit,
            ..Self::default()
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.page > 0 {
            query.push(("page", self.page.to_string()));
        }
        if self.per_page > 0 {
            query.push(("perPage", self.per_page.to_string()));
        }
        if let Some(filter) = self.filter.as_ref().filter(|f| !f.is_empty()) {
            query.push(("filter", filter.clone()));
        }
        if let Some(sort) = self.sort.as_ref().filter(|s| !s.is_empty()) {
            query.push(("sort", sort.clone()));
        }
        if !self.fields.is_empty() {
            query.push(("fields", self.fields.join(",")));
        }
        if !self.expand.is_empty() {
            query.push(("expand", self.expand.join(",")));
        }
        query
    }
}

/// Splits a comma separated option value, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub key: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: String,
}

impl Backup {
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_time(&self.modified)
    }

    pub fn formatted_date(&self) -> String {
        self.modified_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.modified.clone())
    }

    pub fn human_size(&self) -> String {
        format::human_size(self.size)
    }

    fn table_row(&self, now: DateTime<Utc>) -> Vec<String> {
        let age = self
            .modified_at()
            .map(|t| format::time_ago(now - t))
            .unwrap_or_default();
        vec![self.key.clone(), self.human_size(), self.formatted_date(), age]
    }
}

/// Most recently modified backup.
pub fn most_recent(backups: &[Backup]) -> Option<&Backup> {
    backups.iter().max_by_key(|b| b.modified_at())
}

const BACKUP_HEADERS: [&str; 4] = ["NAME", "SIZE", "CREATED", "AGE"];

impl Formattable for Backup {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => Ok(render_table(
                &BACKUP_HEADERS,
                std::iter::once(self.table_row(Utc::now())),
            )),
            _ => format::serialize(self, f),
        }
    }
}

impl Formattable for Vec<Backup> {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Table => {
                let now = Utc::now();
                Ok(render_table(
                    &BACKUP_HEADERS,
                    self.iter().map(|b| b.table_row(now)),
                ))
            }
            _ => format::serialize(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_options_from_offset() {
        let options = ListOptions::from_offset(0, 30);
        assert_eq!((options.page, options.per_page), (1, 30));
        let options = ListOptions::from_offset(60, 30);
        assert_eq!(options.page, 3);
        let options = ListOptions::from_offset(45, 30);
        assert_eq!(options.page, 2);
        let options = ListOptions::from_offset(10, 0);
        assert_eq!((options.page, options.per_page), (11, 1));
    }

    #[test]
    fn test_list_options_query() {
        let options = ListOptions {
            filter: Some("published = true".into()),
            sort: Some("".into()),
            expand: vec!["author".into(), "tags".into()],
            ..ListOptions::from_offset(0, 10)
        };
        assert_eq!(
            options.query(),
            vec![
                ("page", "1".to_string()),
                ("perPage", "10".to_string()),
                ("filter", "published = true".to_string()),
                ("expand", "author,tags".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_records_list_from_wire() {
        let list: RecordsList = serde_json::from_value(json!({
            "page": 2, "perPage": 2, "totalItems": 5, "totalPages": 3,
            "items": [{"id": "a"}, {"id": "b"}]
        }))
        .unwrap();
        assert_eq!(list.item_range(), (3, 4));
        assert_eq!(list.navigation(), (Some(0), Some(4)));
    }

    #[test]
    fn test_records_table_column_order() {
        let records: Vec<Record> = vec![
            serde_json::from_value(json!({
                "updated": "2024-01-01 00:00:00Z", "title": "Hi", "id": "r1", "views": 3
            }))
            .unwrap(),
        ];
        let table = records_table(&records);
        let header = table.lines().next().unwrap();
        let id = header.find("ID").unwrap();
        let title = header.find("TITLE").unwrap();
        let views = header.find("VIEWS").unwrap();
        let updated = header.find("UPDATED").unwrap();
        assert!(id < title && title < views && views < updated);
    }

    #[test]
    fn test_most_recent_backup() {
        let backups = vec![
            Backup {
                key: "old.zip".into(),
                size: 1,
                modified: "2024-01-01 10:00:00.000Z".into(),
            },
            Backup {
                key: "new.zip".into(),
                size: 2,
                modified: "2024-03-01 10:00:00.000Z".into(),
            },
        ];
        assert_eq!(most_recent(&backups).unwrap().key, "new.zip");
        assert_eq!(backups[1].formatted_date(), "2024-03-01 10:00:00");
        assert!(most_recent(&[]).is_none());
    }
}
