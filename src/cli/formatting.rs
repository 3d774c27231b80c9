//! Display helpers shared by the command handlers.

use chrono::NaiveDateTime;

use crate::domain::{parse_datetime, LogEntry};

const MAX_FRACTION_DIGITS: usize = 3;

/// Indonesian grouping: `.` between thousands, `,` before decimals, at most
/// three fraction digits. `format_amount(15000.0, "Rp") == "Rp15.000"`.
pub fn format_amount(amount: f64, symbol: &str) -> String {
    let negative = amount < 0.0;
    let text = format!("{:.*}", MAX_FRACTION_DIGITS, amount.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{symbol}{grouped}")
    } else {
        format!("{sign}{symbol}{grouped},{fraction}")
    }
}

/// Human readable timestamp, falling back to the stored text.
pub fn format_timestamp(raw: &str) -> String {
    parse_datetime(raw)
        .map(|value: NaiveDateTime| value.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One line of the log listing.
pub fn entry_line(entry: &LogEntry, symbol: &str) -> String {
    let mut line = format!(
        "[{}] {}  {} — {}  {}",
        entry.id,
        format_amount(entry.amount, symbol),
        entry.item,
        entry.category,
        format_timestamp(&entry.datetime)
    );
    if entry.has_location() {
        line.push_str(&format!("  @ {}", entry.location));
    }
    line
}
