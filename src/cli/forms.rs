//! Terminal driver for the expense wizard.
//!
//! [`WizardRunner`] owns the loop: it asks a [`WizardInteraction`] for each
//! step's answer, feeds it into [`Wizard`], and shows a review screen once
//! the cursor reaches `done`. The interaction trait keeps dialoguer at the
//! edge so the loop can be driven by a scripted fake in tests.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Select};

use crate::cli::io::{prompt_text, CategoryCompletion};
use crate::cli::output::{self, MessageKind};
use crate::core::wizard::{steps, SaveError, Step, StepDescriptor, Wizard};
use crate::core::ExpenseBook;
use crate::domain::LogEntry;
use crate::errors::Result;
use crate::location::{request_location, LocationProvider};

const BACK_COMMAND: &str = ":back";
const CANCEL_COMMAND: &str = ":cancel";
const LOCATE_COMMAND: &str = ":locate";
const MAX_SUGGESTIONS: usize = 5;
const REVIEW_CHOICES: [&str; 3] = ["Save", "Edit previous", "Cancel"];

/// High-level lifecycle states emitted by the form runner.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResult<T> {
    Completed(T),
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a value (possibly blank).
    Value(String),
    /// Go back to the previous step.
    Back,
    /// Abort the wizard, discarding the buffer.
    Cancel,
    /// Fill the location step from the device.
    Locate,
}

impl PromptResponse {
    /// Interprets typed text, recognising the `:back`, `:cancel` and
    /// `:locate` commands.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            BACK_COMMAND => PromptResponse::Back,
            CANCEL_COMMAND => PromptResponse::Cancel,
            LOCATE_COMMAND => PromptResponse::Locate,
            _ => PromptResponse::Value(text.to_string()),
        }
    }
}

/// Responses accepted when reviewing the collected data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

pub struct PromptContext<'a> {
    pub descriptor: &'static StepDescriptor,
    pub default: Option<&'a str>,
    pub index: usize,
    pub total: usize,
    /// Closest known categories, shown as a hint line.
    pub suggestions: &'a [String],
    /// Every known category, offered for tab completion.
    pub completions: &'a [String],
}

pub trait WizardInteraction {
    fn prompt_step(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse>;

    fn confirm(&mut self, lines: &[String]) -> Result<ConfirmationResponse>;

    fn notify(&mut self, kind: MessageKind, message: &str) {
        output::print(kind, message);
    }
}

/// dialoguer-backed interaction used by `quicklog add`.
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn step_title(context: &PromptContext<'_>) -> String {
        format!(
            "Step {} of {} - {}",
            context.index + 1,
            context.total,
            context.descriptor.label
        )
    }
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardInteraction for DialoguerInteraction {
    fn prompt_step(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse> {
        output::section(Self::step_title(context));
        if let Some(help) = context.descriptor.help {
            output::info(help);
        }
        let mut hints = vec![format!("{CANCEL_COMMAND} aborts")];
        if context.index > 0 {
            hints.insert(0, format!("{BACK_COMMAND} returns to the previous step"));
        }
        if context.descriptor.step == Step::Location {
            hints.push(format!("{LOCATE_COMMAND} uses the device location"));
        }
        output::info(format!("({})", hints.join(", ")));

        if !context.suggestions.is_empty() {
            output::info(format!("Known: {}", context.suggestions.join(", ")));
        }
        let completion = (!context.completions.is_empty())
            .then(|| CategoryCompletion::new(context.completions));
        let text = prompt_text(
            &self.theme,
            context.descriptor.label,
            context.default,
            completion.as_ref(),
        )?;
        Ok(PromptResponse::parse(&text))
    }

    fn confirm(&mut self, lines: &[String]) -> Result<ConfirmationResponse> {
        output::section("Review");
        for line in lines {
            output::info(line);
        }
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Save this entry?")
            .items(&REVIEW_CHOICES[..])
            .default(0)
            .interact_opt()?;
        Ok(match choice {
            Some(0) => ConfirmationResponse::Confirm,
            Some(1) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        })
    }
}

/// Drives one [`Wizard`] session against an [`ExpenseBook`].
pub struct WizardRunner {
    locator: Arc<dyn LocationProvider>,
    timeout: Duration,
}

impl WizardRunner {
    pub fn new(locator: Arc<dyn LocationProvider>, timeout: Duration) -> Self {
        Self { locator, timeout }
    }

    pub fn run<I: WizardInteraction>(
        &self,
        book: &mut ExpenseBook,
        interaction: &mut I,
    ) -> Result<FormResult<LogEntry>> {
        let mut wizard = Wizard::new();
        let total = steps().iter().filter(|d| d.collects_input()).count();

        loop {
            let step = wizard.current_step();
            if step == Step::Done {
                let lines = review_lines(&wizard);
                match interaction.confirm(&lines)? {
                    ConfirmationResponse::Confirm => match wizard.save(book) {
                        Ok(entry) => return Ok(FormResult::Completed(entry)),
                        Err(SaveError::Validation(err)) => {
                            let message = format!("{}: {}", err.step, err);
                            interaction.notify(MessageKind::Error, &message);
                        }
                        Err(SaveError::Storage(err)) => return Err(err.into()),
                    },
                    ConfirmationResponse::Back => {
                        wizard.retreat();
                    }
                    ConfirmationResponse::Cancel => return Ok(FormResult::Cancelled),
                }
                continue;
            }

            let default = wizard.prefill(step, book.clock());
            let (suggestions, completions) = if step == Step::Category {
                let query = wizard.value(step).unwrap_or("");
                let categories = book.categories();
                (
                    categories
                        .suggest(query, MAX_SUGGESTIONS)
                        .into_iter()
                        .map(str::to_string)
                        .collect::<Vec<String>>(),
                    categories.list().to_vec(),
                )
            } else {
                (Vec::new(), Vec::new())
            };
            let context = PromptContext {
                descriptor: step.descriptor(),
                default: default.as_deref(),
                index: step.index(),
                total,
                suggestions: &suggestions,
                completions: &completions,
            };

            match interaction.prompt_step(&context)? {
                PromptResponse::Value(value) => {
                    if let Err(err) = wizard.advance(&value) {
                        interaction.notify(MessageKind::Error, &err.message);
                    }
                }
                PromptResponse::Back => {
                    wizard.retreat();
                }
                PromptResponse::Cancel => return Ok(FormResult::Cancelled),
                PromptResponse::Locate if step == Step::Location => {
                    match request_location(self.locator.clone(), self.timeout) {
                        Ok(coords) => {
                            let text = coords.to_string();
                            interaction.notify(MessageKind::Info, &format!("Location: {text}"));
                            if let Err(err) = wizard.advance(&text) {
                                interaction.notify(MessageKind::Error, &err.message);
                            }
                        }
                        Err(err) => {
                            interaction.notify(
                                MessageKind::Warning,
                                &format!("Location unavailable: {err}"),
                            );
                        }
                    }
                }
                PromptResponse::Locate => {
                    interaction.notify(
                        MessageKind::Warning,
                        &format!("{LOCATE_COMMAND} only applies to the location step"),
                    );
                }
            }
        }
    }
}

fn review_lines(wizard: &Wizard) -> Vec<String> {
    wizard
        .summary()
        .into_iter()
        .map(|(label, value)| format!("  {label}: {value}"))
        .collect()
}
