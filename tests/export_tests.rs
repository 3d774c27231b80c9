mod common;

use std::fs;

use common::{at, open_book, temp_base};
use quicklog::core::Wizard;
use quicklog::export::{export_file_name, export_to_dir};
use regex::Regex;

#[test]
fn export_contains_entries_in_insertion_order() {
    let base = temp_base();
    let now = at(2024, 6, 1, 9, 0);
    let mut book = open_book(&base, now);
    let mut wizard = Wizard::new();
    for (amount, item) in [("15000", "Kopi"), ("2000", "Parkir")] {
        for value in [amount, item, "Harian", "", ""] {
            wizard.advance(value).unwrap();
        }
        wizard.save(&mut book).unwrap();
    }

    let path = export_to_dir(&base.join("exports"), book.today(), book.logs().entries()).unwrap();
    let name = path.file_name().and_then(|n| n.to_str()).unwrap();
    assert!(Regex::new(r"^QuickLog_\d{4}-\d{2}-\d{2}\.csv$").unwrap().is_match(name));
    assert_eq!(name, export_file_name(now.date()));

    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "\"Nominal\",\"Item\",\"Kategori\",\"Tanggal\",\"Lokasi\"");
    assert_eq!(lines[1], "\"15000\",\"Kopi\",\"Harian\",\"2024-06-01T09:00\",\"\"");
    assert_eq!(lines[2], "\"2000\",\"Parkir\",\"Harian\",\"2024-06-01T09:00\",\"\"");
    assert!(!csv.contains('\r'));
}
