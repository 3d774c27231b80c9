use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use super::{KeyValueStore, Result};

/// Volatile store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.records().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.records().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let store = MemoryStorage::with_records([("logs", "[]")]);
        store.set("logs", "[1]").unwrap();
        assert_eq!(store.get("logs").unwrap().as_deref(), Some("[1]"));
        store.remove("logs").unwrap();
        assert_eq!(store.get("logs").unwrap(), None);
    }
}
