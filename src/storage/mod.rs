pub mod json_backend;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Record holding the ordered log entry collection.
pub const LOGS_KEY: &str = "logs";
/// Record holding the ordered category name collection.
pub const CATEGORIES_KEY: &str = "categories";

/// Abstraction over application-scoped persistent key-value stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Result of reading a stored collection. Unreadable content never fails the
/// load; it yields an empty collection plus a warning describing what was
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCollection<T> {
    pub items: Vec<T>,
    pub warning: Option<String>,
}

impl<T> LoadedCollection<T> {
    fn empty_with_warning(warning: String) -> Self {
        Self {
            items: Vec::new(),
            warning: Some(warning),
        }
    }
}

pub fn read_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> LoadedCollection<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return LoadedCollection {
                items: Vec::new(),
                warning: None,
            }
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "stored collection unreadable, starting empty");
            return LoadedCollection::empty_with_warning(format!(
                "`{key}` could not be read ({err}); starting with an empty collection"
            ));
        }
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => LoadedCollection {
            items,
            warning: None,
        },
        Err(err) => {
            tracing::warn!(key, error = %err, "stored collection corrupt, starting empty");
            LoadedCollection::empty_with_warning(format!(
                "`{key}` was corrupt ({err}); starting with an empty collection"
            ))
        }
    }
}

pub fn write_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let json = serde_json::to_string(items)?;
    store.set(key, &json)?;
    tracing::debug!(key, count = items.len(), "collection persisted");
    Ok(())
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
