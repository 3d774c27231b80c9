#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use quicklog::{
    core::{ExpenseBook, FixedClock},
    storage::JsonStorage,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Unique data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid timestamp")
}

/// File-backed book under `base` with the clock pinned to `now`.
pub fn open_book(base: &PathBuf, now: NaiveDateTime) -> ExpenseBook {
    let storage = JsonStorage::new(Some(base.clone())).expect("create json storage backend");
    ExpenseBook::open(Arc::new(storage), Box::new(FixedClock(now)))
}
