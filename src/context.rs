//! The `Context` entity: one configured backend environment.

use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_AUTH_COLLECTION: &str = "users";
pub const MAX_NAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context name is required")]
    EmptyName,
    #[error("context name '{0}' is too long (max {MAX_NAME_LENGTH} characters)")]
    NameTooLong(String),
    #[error("context name '{0}' may only contain letters, digits, '-' and '_'")]
    InvalidName(String),
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("collection name is required")]
    EmptyCollectionName,
    #[error("collection name '{0}' is too long (max {MAX_NAME_LENGTH} characters)")]
    CollectionNameTooLong(String),
    #[error("collection '{0}' already exists in context")]
    DuplicateCollection(String),
    #[error("collection '{0}' not found in context")]
    CollectionNotInContext(String),
}

fn default_auth_collection() -> String {
    DEFAULT_AUTH_COLLECTION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(rename = "url")]
    pub base_url: String,
    #[serde(default = "default_auth_collection")]
    pub auth_collection: String,
    #[serde(default)]
    pub available_collections: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Record::is_empty")]
    pub auth_record: Record,
}

impl Context {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth_collection: default_auth_collection(),
            available_collections: Vec::new(),
            auth_token: String::new(),
            auth_expires: None,
            auth_record: Record::new(),
        }
    }

    pub fn with_auth_collection(mut self, collection: impl Into<String>) -> Self {
        self.auth_collection = collection.into();
        self
    }

    /// Checks every field constraint of a context about to be persisted.
    pub fn validate(&self) -> Result<(), ContextError> {
        validate_name(&self.name)?;
        validate_base_url(&self.base_url)?;
        validate_collection_name(&self.auth_collection)?;
        for (i, collection) in self.available_collections.iter().enumerate() {
            validate_collection_name(collection)?;
            if self.available_collections[..i].contains(collection) {
                return Err(ContextError::DuplicateCollection(collection.clone()));
            }
        }
        Ok(())
    }

    pub fn is_collection_available(&self, collection: &str) -> bool {
        self.available_collections.iter().any(|c| c == collection)
    }

    pub fn add_collection(&mut self, collection: &str) -> Result<(), ContextError> {
        validate_collection_name(collection)?;
        if self.is_collection_available(collection) {
            return Err(ContextError::DuplicateCollection(collection.to_string()));
        }
        self.available_collections.push(collection.to_string());
        Ok(())
    }

    pub fn remove_collection(&mut self, collection: &str) -> Result<(), ContextError> {
        let position = self
            .available_collections
            .iter()
            .position(|c| c == collection)
            .ok_or_else(|| ContextError::CollectionNotInContext(collection.to_string()))?;
        self.available_collections.remove(position);
        Ok(())
    }

    pub fn clear_collections(&mut self) {
        self.available_collections.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

pub fn validate_name(name: &str) -> Result<(), ContextError> {
    if name.is_empty() {
        return Err(ContextError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ContextError::NameTooLong(name.to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ContextError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub fn validate_collection_name(name: &str) -> Result<(), ContextError> {
    if name.is_empty() {
        return Err(ContextError::EmptyCollectionName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ContextError::CollectionNameTooLong(name.to_string()));
    }
    Ok(())
}

/// A base URL needs a scheme and a host.
pub fn validate_base_url(raw: &str) -> Result<(), ContextError> {
    let invalid = |reason: &str| ContextError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("URL must include a host")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("dev").is_ok());
        assert!(validate_name("prod_eu-1").is_ok());
        assert_eq!(validate_name(""), Err(ContextError::EmptyName));
        assert!(matches!(
            validate_name("has space"),
            Err(ContextError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name("a.b"),
            Err(ContextError::InvalidName(_))
        ));
        assert!(validate_name(&"x".repeat(50)).is_ok());
        assert!(matches!(
            validate_name(&"x".repeat(51)),
            Err(ContextError::NameTooLong(_))
        ));
    }

    #[test]
    fn test_base_url_validation() {
        assert!(validate_base_url("http://localhost:8090").is_ok());
        assert!(validate_base_url("https://pb.example.com").is_ok());
        assert!(validate_base_url("localhost:8090").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_collection_editing_preserves_order() {
        let mut ctx = Context::new("dev", "http://localhost:8090");
        ctx.add_collection("posts").unwrap();
        ctx.add_collection("comments").unwrap();
        ctx.add_collection("users").unwrap();
        assert_eq!(
            ctx.available_collections,
            vec!["posts", "comments", "users"]
        );

        assert_eq!(
            ctx.add_collection("posts"),
            Err(ContextError::DuplicateCollection("posts".into()))
        );

        ctx.remove_collection("comments").unwrap();
        assert_eq!(ctx.available_collections, vec!["posts", "users"]);
        assert_eq!(
            ctx.remove_collection("comments"),
            Err(ContextError::CollectionNotInContext("comments".into()))
        );

        ctx.clear_collections();
        assert!(ctx.available_collections.is_empty());
    }

    #[test]
    fn test_validate_rejects_duplicate_collections() {
        let mut ctx = Context::new("dev", "http://localhost:8090");
        ctx.available_collections = vec!["a".into(), "b".into(), "a".into()];
        assert_eq!(
            ctx.validate(),
            Err(ContextError::DuplicateCollection("a".into()))
        );
    }

    #[test]
    fn test_yaml_layout() {
        let mut ctx = Context::new("dev", "http://localhost:8090");
        ctx.add_collection("posts").unwrap();
        let yaml = serde_yaml::to_string(&ctx).unwrap();
        assert!(yaml.contains("url: http://localhost:8090"));
        assert!(yaml.contains("auth_collection: users"));
        assert!(!yaml.contains("auth_token"));

        let back: Context = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_missing_auth_collection_defaults_to_users() {
        let ctx: Context = serde_yaml::from_str("name: dev\nurl: http://x\n").unwrap();
        assert_eq!(ctx.auth_collection, "users");
        assert!(!ctx.is_authenticated());
    }
}
