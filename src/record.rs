//! Schemaless JSON documents returned by the backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names the server owns and clients must not send on create or update.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "created", "updated"];

const NAIVE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.fZ"];

/// Parses the timestamp forms the server emits.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|t| t.and_utc())
}

/// A single record. Accessors return `None` when a field is absent or has an
/// unexpected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get_string(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    /// Integer value. Whole floating point numbers are accepted.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        let value = self.0.get(field)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        })
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    /// Timestamp in RFC 3339 or the `YYYY-MM-DD HH:MM:SS.fffZ` server form.
    pub fn get_time(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get_string(field).and_then(parse_time)
    }

    pub fn get_array(&self, field: &str) -> Option<&Vec<Value>> {
        self.0.get(field).and_then(Value::as_array)
    }

    pub fn get_object(&self, field: &str) -> Option<&Map<String, Value>> {
        self.0.get(field).and_then(Value::as_object)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_string("id")
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.get_time("created")
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.get_time("updated")
    }

    /// Human readable label for the record.
    pub fn display_name(&self) -> String {
        let non_empty = |field: &str| self.get_string(field).filter(|s| !s.is_empty());

        for field in ["name", "title", "display_name", "full_name"] {
            if let Some(name) = non_empty(field) {
                return name.to_string();
            }
        }

        match (non_empty("first_name"), non_empty("last_name")) {
            (Some(first), Some(last)) => return format!("{} {}", first, last),
            (Some(first), None) => return first.to_string(),
            (None, Some(last)) => return last.to_string(),
            (None, None) => {}
        }

        if let Some(contact) = non_empty("email").or_else(|| non_empty("username")) {
            return contact.to_string();
        }

        match self.id().filter(|id| !id.is_empty()) {
            Some(id) => format!("ID: {}", id),
            None => "Unknown".to_string(),
        }
    }

    /// System fields present in this record, in declaration order.
    pub fn system_fields(&self) -> Vec<&'static str> {
        SYSTEM_FIELDS
            .into_iter()
            .filter(|field| self.has_field(field))
            .collect()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Only JSON objects convert. Any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
