pub mod entry;

pub use entry::{format_datetime, parse_datetime, EntryId, LogEntry, DATETIME_FORMAT};
