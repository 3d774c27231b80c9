use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::clock::{Clock, SystemClock};
use crate::core::services::{CategoryRegistry, LogRepository};
use crate::domain::LogEntry;
use crate::storage::{JsonStorage, KeyValueStore, Result};

/// Session facade owning the log repository and category registry for one
/// application run. Both share the injected store.
pub struct ExpenseBook {
    logs: LogRepository,
    categories: CategoryRegistry,
    clock: Box<dyn Clock>,
    warnings: Vec<String>,
}

impl ExpenseBook {
    pub fn open(store: Arc<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let logs = LogRepository::load(store.clone());
        let categories = CategoryRegistry::load(store);
        let warnings = logs
            .load_warning()
            .into_iter()
            .chain(categories.load_warning())
            .map(str::to_string)
            .collect();
        tracing::info!(
            entries = logs.len(),
            categories = categories.list().len(),
            "expense book opened"
        );
        Self {
            logs,
            categories,
            clock,
            warnings,
        }
    }

    /// Opens the file-backed store under `base` (or the resolved application
    /// directory) with the system clock.
    pub fn open_default(base: Option<PathBuf>) -> Result<Self> {
        let storage = JsonStorage::new(base)?;
        Ok(Self::open(Arc::new(storage), Box::new(SystemClock)))
    }

    pub fn logs(&self) -> &LogRepository {
        &self.logs
    }

    pub fn logs_mut(&mut self) -> &mut LogRepository {
        &mut self.logs
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryRegistry {
        &mut self.categories
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Collections that were unreadable at load time and replaced by empty
    /// ones.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Persists a completed entry and registers its category. A failure to
    /// record the category does not undo the saved entry.
    pub fn record(&mut self, entry: LogEntry) -> Result<()> {
        let category = entry.category.clone();
        self.logs.add(entry)?;
        if let Err(err) = self.categories.add(&category) {
            tracing::warn!(category = %category, error = %err, "category could not be recorded");
        }
        Ok(())
    }
}
