use std::sync::Arc;

use strsim::jaro_winkler;

use crate::storage::{self, KeyValueStore, Result, CATEGORIES_KEY};

const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Ordered set of every category name ever used. Names are unique ignoring
/// case; the first casing seen is the one kept.
pub struct CategoryRegistry {
    store: Arc<dyn KeyValueStore>,
    names: Vec<String>,
    load_warning: Option<String>,
}

impl CategoryRegistry {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let loaded = storage::read_collection::<String>(store.as_ref(), CATEGORIES_KEY);
        let mut names: Vec<String> = Vec::with_capacity(loaded.items.len());
        for name in loaded.items {
            let trimmed = name.trim();
            if !trimmed.is_empty() && !contains_name(&names, trimmed) {
                names.push(trimmed.to_string());
            }
        }
        Self {
            store,
            names,
            load_warning: loaded.warning,
        }
    }

    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Records `name` if it is new. Returns `true` when it was inserted.
    pub fn add(&mut self, name: &str) -> Result<bool> {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return Ok(false);
        }
        self.names.push(trimmed.to_string());
        if let Err(err) =
            storage::write_collection(self.store.as_ref(), CATEGORIES_KEY, &self.names)
        {
            self.names.pop();
            return Err(err);
        }
        tracing::debug!(category = trimmed, "category registered");
        Ok(true)
    }

    pub fn list(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        contains_name(&self.names, name.trim())
    }

    /// Stored casing for a known category.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let needle = normalize(name);
        self.names
            .iter()
            .find(|candidate| normalize(candidate) == needle)
            .map(String::as_str)
    }

    /// Suggestions for a partially typed category: prefix matches in
    /// insertion order, then substring matches, then close spellings.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&str> {
        let needle = normalize(query);
        if needle.is_empty() {
            return self.names.iter().take(limit).map(String::as_str).collect();
        }

        let mut prefix = Vec::new();
        let mut substring = Vec::new();
        let mut similar: Vec<(f64, &str)> = Vec::new();
        for name in &self.names {
            let normalized = normalize(name);
            if normalized.starts_with(&needle) {
                prefix.push(name.as_str());
            } else if normalized.contains(&needle) {
                substring.push(name.as_str());
            } else {
                let score = jaro_winkler(&normalized, &needle);
                if score >= SIMILARITY_THRESHOLD {
                    similar.push((score, name.as_str()));
                }
            }
        }
        similar.sort_by(|a, b| b.0.total_cmp(&a.0));

        prefix
            .into_iter()
            .chain(substring)
            .chain(similar.into_iter().map(|(_, name)| name))
            .take(limit)
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn contains_name(names: &[String], candidate: &str) -> bool {
    let needle = normalize(candidate);
    names.iter().any(|name| normalize(name) == needle)
}
