//! Step-by-step collection of a single expense.
//!
//! The wizard walks a fixed table of steps (amount, item, category, datetime,
//! location, done). Each data step carries a validator; values that pass are
//! kept in a transient buffer until [`Wizard::save`] turns them into a
//! [`LogEntry`]. Nothing reaches storage until every required field checks
//! out again at save time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::core::book::ExpenseBook;
use crate::core::clock::Clock;
use crate::domain::{format_datetime, parse_datetime, LogEntry};
use crate::errors::StorageError;

/// Ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Amount,
    Item,
    Category,
    Datetime,
    Location,
    Done,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Amount,
        Step::Item,
        Step::Category,
        Step::Datetime,
        Step::Location,
        Step::Done,
    ];

    /// Required steps in the order save-time validation reports them.
    pub const SAVE_PRIORITY: [Step; 4] = [Step::Amount, Step::Item, Step::Category, Step::Datetime];

    pub fn name(self) -> &'static str {
        match self {
            Step::Amount => "amount",
            Step::Item => "item",
            Step::Category => "category",
            Step::Datetime => "datetime",
            Step::Location => "location",
            Step::Done => "done",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.name() == normalized)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static StepDescriptor {
        &STEPS[self.index()]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field-level validation failure, tagged with the step it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub step: Step,
    pub message: String,
}

impl ValidationError {
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Why [`Wizard::save`] did not produce an entry.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

type Validator = fn(&str) -> Result<String, String>;

/// Declarative description of one wizard step.
pub struct StepDescriptor {
    pub step: Step,
    pub label: &'static str,
    pub required: bool,
    pub help: Option<&'static str>,
    validator: Option<Validator>,
}

impl StepDescriptor {
    /// Normalized value for `raw`, or the message explaining the rejection.
    /// The terminal step accepts anything.
    pub fn validate(&self, raw: &str) -> Result<String, ValidationError> {
        match self.validator {
            Some(validator) => {
                validator(raw).map_err(|message| ValidationError::new(self.step, message))
            }
            None => Ok(String::new()),
        }
    }

    pub fn collects_input(&self) -> bool {
        self.validator.is_some()
    }
}

static STEPS: [StepDescriptor; 6] = [
    StepDescriptor {
        step: Step::Amount,
        label: "Nominal",
        required: true,
        help: Some("Amount spent, greater than zero (e.g. 15000 or 12.5)."),
        validator: Some(validate_amount),
    },
    StepDescriptor {
        step: Step::Item,
        label: "Item",
        required: true,
        help: Some("What the money was spent on."),
        validator: Some(validate_item),
    },
    StepDescriptor {
        step: Step::Category,
        label: "Kategori",
        required: true,
        help: Some("Pick a known category or type a new one."),
        validator: Some(validate_category),
    },
    StepDescriptor {
        step: Step::Datetime,
        label: "Tanggal & Waktu",
        required: true,
        help: Some("Local time as YYYY-MM-DDTHH:MM. Leave blank for now."),
        validator: Some(validate_datetime),
    },
    StepDescriptor {
        step: Step::Location,
        label: "Lokasi",
        required: false,
        help: Some("Optional \"lat, lng\". Leave blank to skip."),
        validator: Some(validate_location),
    },
    StepDescriptor {
        step: Step::Done,
        label: "Simpan",
        required: false,
        help: None,
        validator: None,
    },
];

/// Ordered step table.
pub fn steps() -> &'static [StepDescriptor] {
    &STEPS
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Amount is required".into());
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| "Enter a numeric amount".to_string())?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err("Amount must be greater than zero".into())
    }
}

fn validate_amount(raw: &str) -> Result<String, String> {
    parse_amount(raw).map(|_| raw.trim().to_string())
}

fn validate_item(raw: &str) -> Result<String, String> {
    non_empty(raw, "Item name is required")
}

fn validate_category(raw: &str) -> Result<String, String> {
    non_empty(raw, "Pick or type a category")
}

fn non_empty(raw: &str, message: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(message.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Blank stays blank (resolved to "now" at save time).
fn validate_datetime(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    parse_datetime(trimmed)
        .map(format_datetime)
        .ok_or_else(|| "Use YYYY-MM-DDTHH:MM format".to_string())
}

fn validate_location(raw: &str) -> Result<String, String> {
    Ok(raw.trim().to_string())
}

struct EntryDraft {
    amount: f64,
    item: String,
    category: String,
    datetime: Option<NaiveDateTime>,
    location: String,
}

/// Cursor plus buffered values for one expense being entered.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    buffer: BTreeMap<Step, String>,
    cursor: usize,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> Step {
        Step::ALL[self.cursor]
    }

    pub fn is_done(&self) -> bool {
        self.current_step() == Step::Done
    }

    pub fn buffer(&self) -> &BTreeMap<Step, String> {
        &self.buffer
    }

    pub fn value(&self, step: Step) -> Option<&str> {
        self.buffer.get(&step).map(String::as_str)
    }

    /// Validates `input` for the current step. On success the normalized
    /// value is buffered and the cursor moves forward (never past `done`);
    /// on failure nothing changes.
    pub fn advance(&mut self, input: &str) -> Result<Step, ValidationError> {
        let step = self.current_step();
        let descriptor = step.descriptor();
        if !descriptor.collects_input() {
            return Ok(step);
        }
        let value = descriptor.validate(input)?;
        tracing::debug!(step = %step, "wizard step accepted");
        self.buffer.insert(step, value);
        self.cursor = (self.cursor + 1).min(Step::ALL.len() - 1);
        Ok(self.current_step())
    }

    pub fn retreat(&mut self) -> Step {
        self.cursor = self.cursor.saturating_sub(1);
        self.current_step()
    }

    pub fn jump_to(&mut self, step: Step) -> Step {
        self.cursor = step.index();
        step
    }

    /// Forgets every buffered value and returns to the first step.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Value to offer as the default when prompting `step`: the buffered
    /// value, or the current time for an empty datetime. Location is never
    /// prefilled so that blank input always skips it.
    pub fn prefill(&self, step: Step, clock: &dyn Clock) -> Option<String> {
        if step == Step::Location {
            return None;
        }
        match self.value(step).filter(|value| !value.is_empty()) {
            Some(value) => Some(value.to_string()),
            None if step == Step::Datetime => Some(format_datetime(clock.now())),
            None => None,
        }
    }

    /// Label/value pairs for reviewing the buffer before saving.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        steps()
            .iter()
            .filter(|descriptor| descriptor.collects_input())
            .map(|descriptor| {
                let value = match (descriptor.step, self.value(descriptor.step)) {
                    (_, Some(value)) if !value.is_empty() => value.to_string(),
                    (Step::Datetime, _) => "(now)".to_string(),
                    (Step::Location, _) => "(skipped)".to_string(),
                    _ => "[unfilled]".to_string(),
                };
                (descriptor.label, value)
            })
            .collect()
    }

    /// Re-validates the buffer and records the entry. On a validation
    /// failure the cursor jumps to the first offending step and the buffer is
    /// kept for correction; on success the wizard starts over.
    pub fn save(&mut self, book: &mut ExpenseBook) -> Result<LogEntry, SaveError> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(err) => {
                tracing::debug!(step = %err.step, "save rejected");
                self.jump_to(err.step);
                return Err(err.into());
            }
        };

        let now = book.now();
        let entry = LogEntry {
            id: book.logs().allocate_id(now)?,
            amount: draft.amount,
            item: draft.item,
            category: draft.category,
            datetime: format_datetime(draft.datetime.unwrap_or(now)),
            location: draft.location,
        };
        book.record(entry.clone())?;
        self.reset();
        Ok(entry)
    }

    fn draft(&self) -> Result<EntryDraft, ValidationError> {
        for step in Step::SAVE_PRIORITY {
            step.descriptor().validate(self.raw(step))?;
        }
        let amount = parse_amount(self.raw(Step::Amount))
            .map_err(|message| ValidationError::new(Step::Amount, message))?;
        Ok(EntryDraft {
            amount,
            item: self.raw(Step::Item).trim().to_string(),
            category: self.raw(Step::Category).trim().to_string(),
            datetime: parse_datetime(self.raw(Step::Datetime)),
            location: self.raw(Step::Location).trim().to_string(),
        })
    }

    fn raw(&self, step: Step) -> &str {
        self.value(step).unwrap_or("")
    }
}
