//! Durable CRUD over contexts plus the single active-context pointer.

use crate::{
    configuration::{GlobalConfig, GLOBAL_CONFIG_RECORD},
    context::{validate_collection_name, validate_name, Context, ContextError},
    storage::{Storage, StorageError},
};
use std::path::PathBuf;
use tracing::{debug, trace};

pub const CONTEXT_RECORD: &str = "context";
pub const BACKUPS_DIR: &str = "backups";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("context '{0}' already exists")]
    AlreadyExists(String),
    #[error("context '{0}' not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(#[from] ContextError),
    #[error("no active context set")]
    NoActiveContext,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of adding several collections at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContextRegistry<S: Storage> {
    storage: S,
}

impl<S: Storage> ContextRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persists a new context and provisions its backups directory.
    pub fn create(&self, context: &Context) -> Result<(), RegistryError> {
        context.validate()?;
        if self.exists(&context.name) {
            return Err(RegistryError::AlreadyExists(context.name.clone()));
        }
        debug!("Creating context '{}'", context.name);
        self.save(context)
    }

    pub fn load(&self, name: &str) -> Result<Context, RegistryError> {
        validate_name(name)?;
        let mut context: Context = self
            .storage
            .read(Some(name), CONTEXT_RECORD)?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        // The namespace is the source of truth for the name.
        context.name = name.to_string();
        Ok(context)
    }

    pub fn save(&self, context: &Context) -> Result<(), RegistryError> {
        if context.name.is_empty() {
            return Err(ContextError::EmptyName.into());
        }
        self.storage
            .write(Some(&context.name), CONTEXT_RECORD, context)?;
        self.storage.ensure_aux_dir(&context.name, BACKUPS_DIR)?;
        Ok(())
    }

    /// Context names, sorted.
    pub fn list(&self) -> Result<Vec<String>, RegistryError> {
        let mut names = self.storage.namespaces_with(CONTEXT_RECORD)?;
        names.sort();
        Ok(names)
    }

    /// Removes a context and everything stored under it.
    ///
    /// The active pointer is left alone; callers deleting the active context
    /// must call [`ContextRegistry::clear_active`] themselves. A context whose
    /// file no longer parses can still be deleted.
    pub fn delete(&self, name: &str) -> Result<(), RegistryError> {
        validate_name(name)?;
        if !self.exists(name) {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        debug!("Deleting context '{}'", name);
        self.storage.remove_namespace(name)?;
        Ok(())
    }

    /// Whether a context file is present under `name`. Invalid names never exist.
    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.storage.contains(Some(name), CONTEXT_RECORD)
    }

    pub fn get_active(&self) -> Result<Context, RegistryError> {
        let config = self.load_global_config()?;
        if !config.has_active_context() {
            return Err(RegistryError::NoActiveContext);
        }
        self.load(&config.active_context)
    }

    pub fn set_active(&self, name: &str) -> Result<(), RegistryError> {
        self.load(name)?;
        let mut config = self.load_global_config()?;
        config.active_context = name.to_string();
        self.save_global_config(&config)
    }

    pub fn clear_active(&self) -> Result<(), RegistryError> {
        let mut config = self.load_global_config()?;
        config.active_context.clear();
        self.save_global_config(&config)
    }

    pub fn load_global_config(&self) -> Result<GlobalConfig, RegistryError> {
        match self.storage.read(None, GLOBAL_CONFIG_RECORD)? {
            Some(config) => Ok(config),
            None => {
                trace!("Global configuration not found, creating defaults");
                let config = GlobalConfig::default();
                self.save_global_config(&config)?;
                Ok(config)
            }
        }
    }

    pub fn save_global_config(&self, config: &GlobalConfig) -> Result<(), RegistryError> {
        self.storage.write(None, GLOBAL_CONFIG_RECORD, config)?;
        Ok(())
    }

    /// Adds collections to a context, skipping ones already configured.
    pub fn add_collections(
        &self,
        name: &str,
        collections: &[String],
    ) -> Result<AddOutcome, RegistryError> {
        let mut context = self.load(name)?;
        for collection in collections {
            validate_collection_name(collection)?;
        }

        let mut outcome = AddOutcome::default();
        for collection in collections {
            if context.is_collection_available(collection) {
                outcome.skipped.push(collection.clone());
            } else {
                context.add_collection(collection)?;
                outcome.added.push(collection.clone());
            }
        }

        if !outcome.added.is_empty() {
            self.save(&context)?;
        }
        Ok(outcome)
    }

    pub fn remove_collection(&self, name: &str, collection: &str) -> Result<(), RegistryError> {
        let mut context = self.load(name)?;
        context.remove_collection(collection)?;
        self.save(&context)
    }

    /// Empties the collection list and returns how many were removed.
    pub fn clear_collections(&self, name: &str) -> Result<usize, RegistryError> {
        let mut context = self.load(name)?;
        let removed = context.available_collections.len();
        context.clear_collections();
        self.save(&context)?;
        Ok(removed)
    }

    /// Default location for downloaded backups of a context.
    pub fn backup_dir(&self, name: &str) -> PathBuf {
        self.storage.aux_dir(name, BACKUPS_DIR)
    }
}
