//! Persistent store adapter.
//!
//! Records are YAML documents addressed by an optional namespace and a record
//! name. On disk a record `config` in the root namespace lives at
//! `<root>/config.yaml` and a record `context` in namespace `dev` lives at
//! `<root>/dev/context.yaml`. Namespaces may also hold auxiliary directories
//! such as `backups/`.

use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

pub const RECORD_EXTENSION: &str = "yaml";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to resolve the configuration directory")]
    ConfigDirectoryNotFound,
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Namespaced record storage used by the context registry.
pub trait Storage {
    /// Reads a record. A missing record is `Ok(None)`.
    fn read<T: DeserializeOwned>(
        &self,
        namespace: Option<&str>,
        record: &str,
    ) -> Result<Option<T>, StorageError>;

    /// Creates or replaces a record, creating its namespace if needed.
    fn write<T: Serialize>(
        &self,
        namespace: Option<&str>,
        record: &str,
        value: &T,
    ) -> Result<(), StorageError>;

    /// Whether a record is present, regardless of whether it parses.
    fn contains(&self, namespace: Option<&str>, record: &str) -> bool;

    /// Names of the namespaces that contain `record`.
    fn namespaces_with(&self, record: &str) -> Result<Vec<String>, StorageError>;

    /// Recursively removes a namespace. Returns `false` if it did not exist.
    fn remove_namespace(&self, namespace: &str) -> Result<bool, StorageError>;

    /// Location of an auxiliary directory inside a namespace.
    fn aux_dir(&self, namespace: &str, dir: &str) -> PathBuf;

    /// Creates an auxiliary directory if it does not exist yet.
    fn ensure_aux_dir(&self, namespace: &str, dir: &str) -> Result<PathBuf, StorageError> {
        let path = self.aux_dir(namespace, dir);
        fs::create_dir_all(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// YAML files under a single root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted at the default configuration directory.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(crate::configuration::default_configuration_directory()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, namespace: Option<&str>, record: &str) -> PathBuf {
        let mut path = self.root.clone();
        if let Some(namespace) = namespace {
            path.push(namespace);
        }
        path.push(format!("{}.{}", record, RECORD_EXTENSION));
        path
    }
}

impl Storage for FileStorage {
    fn read<T: DeserializeOwned>(
        &self,
        namespace: Option<&str>,
        record: &str,
    ) -> Result<Option<T>, StorageError> {
        let path = self.record_path(namespace, record);
        trace!("Reading record from {}", path.display());

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Yaml { path, source })
    }

    fn write<T: Serialize>(
        &self,
        namespace: Option<&str>,
        record: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let path = self.record_path(namespace, record);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_yaml::to_string(value).map_err(|source| StorageError::Yaml {
            path: path.clone(),
            source,
        })?;

        debug!("Writing record to {}", path.display());
        fs::write(&path, content).map_err(|source| StorageError::Io { path, source })
    }

    fn contains(&self, namespace: Option<&str>, record: &str) -> bool {
        self.record_path(namespace, record).is_file()
    }

    fn namespaces_with(&self, record: &str) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if self.record_path(Some(&name), record).is_file() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn remove_namespace(&self, namespace: &str) -> Result<bool, StorageError> {
        let path = self.root.join(namespace);
        if !path.is_dir() {
            return Ok(false);
        }
        debug!("Removing namespace {}", path.display());
        fs::remove_dir_all(&path).map_err(|source| StorageError::Io { path, source })?;
        Ok(true)
    }

    fn aux_dir(&self, namespace: &str, dir: &str) -> PathBuf {
        self.root.join(namespace).join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: String,
    }

    fn sample(value: &str) -> Sample {
        Sample {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_missing_record_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        let record: Option<Sample> = storage.read(None, "config").unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_write_then_read_namespaced_record() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write(Some("dev"), "context", &sample("a")).unwrap();

        assert!(dir.path().join("dev").join("context.yaml").is_file());
        let record: Option<Sample> = storage.read(Some("dev"), "context").unwrap();
        assert_eq!(record, Some(sample("a")));
    }

    #[test]
    fn test_namespaces_with_skips_directories_without_record() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write(Some("dev"), "context", &sample("a")).unwrap();
        storage.write(None, "config", &sample("b")).unwrap();
        fs::create_dir_all(dir.path().join("stray")).unwrap();

        let names = storage.namespaces_with("context").unwrap();
        assert_eq!(names, vec!["dev".to_string()]);
    }

    #[test]
    fn test_contains_ignores_content() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(!storage.contains(Some("dev"), "context"));

        fs::create_dir_all(dir.path().join("dev")).unwrap();
        fs::write(dir.path().join("dev").join("context.yaml"), "name: [unclosed").unwrap();
        assert!(storage.contains(Some("dev"), "context"));
        assert!(storage.read::<Sample>(Some("dev"), "context").is_err());
    }

    #[test]
    fn test_namespaces_with_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nope"));
        assert!(storage.namespaces_with("context").unwrap().is_empty());
    }

    #[test]
    fn test_remove_namespace_removes_aux_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write(Some("dev"), "context", &sample("a")).unwrap();
        let backups = storage.ensure_aux_dir("dev", "backups").unwrap();
        fs::write(backups.join("b.zip"), b"zip").unwrap();

        assert!(storage.remove_namespace("dev").unwrap());
        assert!(!dir.path().join("dev").exists());
        assert!(!storage.remove_namespace("dev").unwrap());
    }

    #[test]
    fn test_corrupt_record_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "value: [unclosed").unwrap();
        let storage = FileStorage::new(dir.path());
        let result: Result<Option<Sample>, _> = storage.read(None, "config");
        assert!(matches!(result, Err(StorageError::Yaml { .. })));
    }
}
