//! CSV export of the expense log.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::core::utils::ensure_dir;
use crate::domain::LogEntry;
use crate::errors::ExportError;

pub const CSV_HEADER: [&str; 5] = ["Nominal", "Item", "Kategori", "Tanggal", "Lokasi"];

const FILE_PREFIX: &str = "QuickLog";

/// Writes a header row plus one fully quoted row per entry, in the order
/// given.
pub fn write_csv<'a, W, I>(writer: W, entries: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for entry in entries {
        csv.write_record([
            entry.amount.to_string(),
            entry.item.clone(),
            entry.category.clone(),
            entry.datetime.clone(),
            entry.location.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv_string(entries: &[LogEntry]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, entries)?;
    String::from_utf8(buffer).map_err(|err| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// `QuickLog_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes the export into `dir` (created if missing) and returns the file
/// path. An existing export for the same day is overwritten.
pub fn export_to_dir(
    dir: &Path,
    date: NaiveDate,
    entries: &[LogEntry],
) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;
    let path = dir.join(export_file_name(date));
    let file = fs::File::create(&path)?;
    write_csv(file, entries)?;
    tracing::debug!(path = %path.display(), rows = entries.len(), "csv export written");
    Ok(path)
}
