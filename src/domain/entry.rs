use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier assigned to an entry when it is first saved.
pub type EntryId = u64;

/// Storage format for entry timestamps (local time, minute precision).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: [&str; 3] = [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A single persisted expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub amount: f64,
    pub item: String,
    pub category: String,
    pub datetime: String,
    #[serde(default)]
    pub location: String,
}

impl LogEntry {
    /// Parsed local timestamp, `None` when the stored text is unreadable.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.datetime)
    }

    pub fn has_location(&self) -> bool {
        !self.location.trim().is_empty()
    }
}

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parses the timestamp shapes QuickLog writes or accepts from users. RFC 3339
/// values carrying an offset are converted to local time.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|value| value.with_timezone(&Local).naive_local())
        })
}
