mod common;

use common::{at, open_book, temp_base};
use quicklog::core::{SaveError, Step, Wizard};

fn fill(wizard: &mut Wizard, values: &[&str]) {
    for value in values {
        wizard.advance(value).expect("valid step input");
    }
}

#[test]
fn saved_entries_survive_reopen() {
    let base = temp_base();
    let now = at(2024, 6, 1, 7, 30);
    let mut book = open_book(&base, now);
    let mut wizard = Wizard::new();

    fill(&mut wizard, &["15000", "Kopi", "Makanan", "", ""]);
    let first = wizard.save(&mut book).expect("first save");
    fill(&mut wizard, &["3500", "Parkir", "transport", "2024-06-01T06:00", "-6.2, 106.8"]);
    let second = wizard.save(&mut book).expect("second save");
    fill(&mut wizard, &["20000", "Nasi", "makanan", "", ""]);
    wizard.save(&mut book).expect("third save");

    assert_eq!(first.datetime, "2024-06-01T07:30");
    assert!(second.id > first.id);

    let reopened = open_book(&base, now);
    assert_eq!(reopened.logs().len(), 3);
    assert_eq!(reopened.categories().list(), ["Makanan", "transport"]);
    assert_eq!(reopened.logs().total_for_day(now.date()), 38500.0);
    assert_eq!(reopened.logs().get(second.id), Some(&second));
}

#[test]
fn rejected_save_writes_nothing_to_disk() {
    let base = temp_base();
    let now = at(2024, 6, 1, 7, 30);
    let mut book = open_book(&base, now);
    let mut wizard = Wizard::new();
    wizard.jump_to(Step::Item);
    fill(&mut wizard, &["Kopi", "Makanan", "", ""]);

    let err = wizard.save(&mut book).expect_err("amount is missing");
    assert!(matches!(err, SaveError::Validation(ref v) if v.step == Step::Amount));
    assert_eq!(wizard.cursor(), 0);

    let reopened = open_book(&base, now);
    assert!(reopened.logs().is_empty());
    assert!(reopened.categories().list().is_empty());
}

#[test]
fn every_saved_entry_is_valid() {
    let base = temp_base();
    let mut book = open_book(&base, at(2024, 6, 1, 12, 0));
    let mut wizard = Wizard::new();
    let attempts: [&[&str]; 4] = [
        &["-1", "Kopi", "Makanan"],
        &["12", " ", "Makanan"],
        &["12", "Kopi", ""],
        &["12", "Kopi", "Makanan"],
    ];
    for attempt in attempts {
        wizard.reset();
        for value in attempt {
            let _ = wizard.advance(value);
        }
        wizard.jump_to(Step::Done);
        let _ = wizard.save(&mut book);
    }

    assert_eq!(book.logs().len(), 1);
    for entry in book.logs().entries() {
        assert!(entry.amount > 0.0);
        assert!(!entry.item.trim().is_empty());
        assert!(!entry.category.trim().is_empty());
    }
}
