use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{EntryId, LogEntry};
use crate::errors::StorageError;
use crate::storage::{self, KeyValueStore, Result, LOGS_KEY};

/// Write-through repository over the `logs` record. Entries are loaded once
/// and the in-memory copy answers every read.
pub struct LogRepository {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<LogEntry>,
    load_warning: Option<String>,
}

impl LogRepository {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let loaded = storage::read_collection::<LogEntry>(store.as_ref(), LOGS_KEY);
        tracing::debug!(count = loaded.items.len(), "log entries loaded");
        Self {
            store,
            entries: loaded.items,
            load_warning: loaded.warning,
        }
    }

    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Appends a validated entry and persists the collection. The entry is
    /// dropped again when the write fails.
    pub fn add(&mut self, entry: LogEntry) -> Result<()> {
        let id = entry.id;
        self.entries.push(entry);
        if let Err(err) = self.persist() {
            self.entries.pop();
            return Err(err);
        }
        tracing::debug!(id, "log entry added");
        Ok(())
    }

    /// Removes the entry with `id`. Returns `false` without touching storage
    /// when no such entry exists.
    pub fn remove(&mut self, id: EntryId) -> Result<bool> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };
        let removed = self.entries.remove(index);
        if let Err(err) = self.persist() {
            self.entries.insert(index, removed);
            return Err(err);
        }
        tracing::debug!(id, "log entry removed");
        Ok(true)
    }

    /// All entries, most recent id first.
    pub fn list(&self) -> Vec<&LogEntry> {
        let mut entries: Vec<&LogEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&LogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.entries);
        if let Err(err) = self.persist() {
            self.entries = previous;
            return Err(err);
        }
        tracing::debug!(removed = previous.len(), "log cleared");
        Ok(())
    }

    /// Sum of amounts whose timestamp falls in `[date 00:00, date 00:00 + 24h)`.
    pub fn total_for_day(&self, date: NaiveDate) -> f64 {
        self.entries_on(date).map(|entry| entry.amount).sum()
    }

    pub fn entries_on(&self, date: NaiveDate) -> impl Iterator<Item = &LogEntry> + '_ {
        let start = date.and_time(chrono::NaiveTime::MIN);
        let end = start + Duration::hours(24);
        self.entries.iter().filter(move |entry| {
            entry
                .timestamp()
                .is_some_and(|stamp| stamp >= start && stamp < end)
        })
    }

    /// Time-derived id (milliseconds of `now`), bumped past the highest id
    /// already stored so ids never repeat or go backwards.
    pub fn allocate_id(&self, now: NaiveDateTime) -> Result<EntryId> {
        let candidate = u64::try_from(now.and_utc().timestamp_millis()).unwrap_or(0);
        match self.entries.iter().map(|entry| entry.id).max() {
            Some(highest) if highest >= candidate => highest
                .checked_add(1)
                .ok_or(StorageError::IdsExhausted(highest)),
            _ => Ok(candidate),
        }
    }

    fn persist(&self) -> Result<()> {
        storage::write_collection(self.store.as_ref(), LOGS_KEY, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{key} is read-only"),
            )))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    fn entry(id: EntryId, amount: f64, datetime: &str) -> LogEntry {
        LogEntry {
            id,
            amount,
            item: format!("item-{id}"),
            category: "Makanan".into(),
            datetime: datetime.into(),
            location: String::new(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn add_writes_through_to_store() {
        let store = Arc::new(MemoryStorage::new());
        let mut repo = LogRepository::load(store.clone());
        repo.add(entry(1, 15000.0, "2024-01-01T08:00")).unwrap();

        let reopened = LogRepository::load(store);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(1).map(|e| e.amount), Some(15000.0));
    }

    #[test]
    fn list_is_most_recent_first() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        repo.add(entry(10, 1.0, "2024-01-01T08:00")).unwrap();
        repo.add(entry(30, 1.0, "2024-01-01T09:00")).unwrap();
        repo.add(entry(20, 1.0, "2024-01-01T10:00")).unwrap();
        let ids: Vec<EntryId> = repo.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![30, 20, 10]);
        let insertion: Vec<EntryId> = repo.entries().iter().map(|e| e.id).collect();
        assert_eq!(insertion, vec![10, 30, 20]);
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        repo.add(entry(1, 2.0, "2024-01-01T08:00")).unwrap();
        let before = repo.entries().to_vec();
        assert!(!repo.remove(99).unwrap());
        assert_eq!(repo.entries(), before.as_slice());
    }

    #[test]
    fn remove_drops_matching_entry() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        repo.add(entry(1, 2.0, "2024-01-01T08:00")).unwrap();
        repo.add(entry(2, 3.0, "2024-01-01T09:00")).unwrap();
        assert!(repo.remove(1).unwrap());
        assert!(repo.get(1).is_none());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let store = Arc::new(MemoryStorage::new());
        let mut repo = LogRepository::load(store.clone());
        repo.add(entry(1, 2.0, "2024-01-01T08:00")).unwrap();
        repo.clear().unwrap();
        assert!(repo.is_empty());
        assert!(LogRepository::load(store).is_empty());
    }

    #[test]
    fn daily_total_respects_midnight_boundary() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        repo.add(entry(1, 100.0, "2024-01-01T23:59")).unwrap();
        repo.add(entry(2, 250.0, "2024-01-02T00:01")).unwrap();
        repo.add(entry(3, 5.0, "2024-01-01T00:00")).unwrap();
        let jan_first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(repo.total_for_day(jan_first), 105.0);
        let jan_second = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(repo.total_for_day(jan_second), 250.0);
        let jan_third = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(repo.total_for_day(jan_third), 0.0);
    }

    #[test]
    fn unparseable_datetimes_never_count() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        repo.add(entry(1, 100.0, "not a date")).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(repo.total_for_day(day), 0.0);
    }

    #[test]
    fn allocated_ids_strictly_increase() {
        let mut repo = LogRepository::load(Arc::new(MemoryStorage::new()));
        let now = at(2024, 1, 1, 12, 0);
        let first = repo.allocate_id(now).unwrap();
        repo.add(entry(first, 1.0, "2024-01-01T12:00")).unwrap();
        let second = repo.allocate_id(now).unwrap();
        assert!(second > first);
        assert_eq!(repo.allocate_id(at(2023, 1, 1, 0, 0)).unwrap(), first + 1);
    }

    #[test]
    fn stored_max_id_reports_exhaustion_instead_of_wrapping() {
        let record = format!(
            r#"[{{"id":{},"amount":1.0,"item":"Kopi","category":"Makanan","datetime":"2024-01-01T08:00"}}]"#,
            u64::MAX
        );
        let store = Arc::new(MemoryStorage::with_records([(LOGS_KEY, record.as_str())]));
        let repo = LogRepository::load(store);
        assert_eq!(repo.len(), 1);

        let err = repo.allocate_id(at(2024, 1, 1, 12, 0)).unwrap_err();
        assert!(matches!(err, StorageError::IdsExhausted(id) if id == u64::MAX));
    }

    #[test]
    fn failed_write_leaves_mirror_untouched() {
        let mut repo = LogRepository::load(Arc::new(ReadOnlyStore));
        let err = repo
            .add(entry(1, 1.0, "2024-01-01T12:00"))
            .expect_err("read-only store rejects writes");
        assert!(matches!(err, StorageError::Io(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn corrupt_log_record_loads_empty_with_warning() {
        let store = Arc::new(MemoryStorage::with_records([(LOGS_KEY, "[{\"id\":")]));
        let repo = LogRepository::load(store);
        assert!(repo.is_empty());
        assert!(repo.load_warning().is_some());
    }
}
