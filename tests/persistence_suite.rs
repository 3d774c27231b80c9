mod common;

use std::fs;
use std::sync::Arc;

use common::{at, open_book, temp_base};
use quicklog::{
    core::{ExpenseBook, FixedClock},
    domain::LogEntry,
    storage::{self, JsonStorage, KeyValueStore, CATEGORIES_KEY, LOGS_KEY},
};

fn sample(id: u64, amount: f64, location: &str) -> LogEntry {
    LogEntry {
        id,
        amount,
        item: format!("Item \"{id}\""),
        category: "Makanan".into(),
        datetime: "2024-01-01T23:59".into(),
        location: location.into(),
    }
}

#[test]
fn log_collection_roundtrips_through_json_files() {
    let base = temp_base();
    let store = JsonStorage::new(Some(base.clone())).unwrap();
    let entries = vec![sample(1, 15000.0, ""), sample(2, 12.75, "-6.20000, 106.81667")];
    storage::write_collection(&store, LOGS_KEY, &entries).unwrap();

    let reopened = JsonStorage::new(Some(base)).unwrap();
    let loaded = storage::read_collection::<LogEntry>(&reopened, LOGS_KEY);
    assert_eq!(loaded.items, entries);
    assert!(loaded.warning.is_none());
}

#[test]
fn records_live_in_one_file_per_key() {
    let base = temp_base();
    let store = JsonStorage::new(Some(base.clone())).unwrap();
    store.set(CATEGORIES_KEY, r#"["Makanan"]"#).unwrap();

    let path = store.record_path(CATEGORIES_KEY).unwrap();
    assert!(path.starts_with(base.join("store")));
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Makanan"]"#);

    store.remove(CATEGORIES_KEY).unwrap();
    assert!(!path.exists());
    assert_eq!(store.get(CATEGORIES_KEY).unwrap(), None);
}

#[test]
fn corrupt_files_fail_soft_and_recover_on_next_write() {
    let base = temp_base();
    let store = Arc::new(JsonStorage::new(Some(base.clone())).unwrap());
    fs::write(store.record_path(LOGS_KEY).unwrap(), "{{{ not json").unwrap();

    let now = at(2024, 1, 1, 10, 0);
    let mut book = ExpenseBook::open(store.clone(), Box::new(FixedClock(now)));
    assert!(book.logs().is_empty());
    assert_eq!(book.warnings().len(), 1);

    book.record(sample(5, 10.0, "")).unwrap();
    let reopened = open_book(&base, now);
    assert_eq!(reopened.logs().len(), 1);
    assert!(reopened.warnings().is_empty());
}

#[test]
fn removing_unknown_id_leaves_file_untouched() {
    let base = temp_base();
    let now = at(2024, 1, 1, 10, 0);
    let mut book = open_book(&base, now);
    book.record(sample(1, 10.0, "")).unwrap();
    let store = JsonStorage::new(Some(base.clone())).unwrap();
    let before = store.get(LOGS_KEY).unwrap();

    assert!(!book.logs_mut().remove(404).unwrap());
    assert_eq!(store.get(LOGS_KEY).unwrap(), before);
}

#[test]
fn invalid_keys_are_rejected() {
    let base = temp_base();
    let store = JsonStorage::new(Some(base)).unwrap();
    assert!(store.set("../escape", "[]").is_err());
    assert!(store.get("").is_err());
}
