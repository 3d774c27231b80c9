use std::path::PathBuf;

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;

use super::{CommandContext, CommandDefinition, CommandResult};
use crate::cli::forms::{DialoguerInteraction, FormResult, WizardRunner};
use crate::cli::formatting::{entry_line, format_amount};
use crate::cli::io;
use crate::cli::output;
use crate::core::services::SummaryService;
use crate::core::wizard::{Step, Wizard};
use crate::domain::{EntryId, LogEntry};
use crate::errors::{QuickLogError, Result};
use crate::export;
use crate::location::{provider_from_config, request_location};

const CATEGORY_SUGGESTIONS: usize = 10;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "add",
            "Record an expense (interactive wizard without flags)",
            "add [--amount <n> --item <text> --category <text> [--datetime <YYYY-MM-DDTHH:MM>] [--location <lat, lng> | --locate]]",
            cmd_add,
        ),
        CommandDefinition::new("list", "Show every entry, newest first", "list", cmd_list),
        CommandDefinition::new(
            "today",
            "Show the total spent on a day (default today)",
            "today [YYYY-MM-DD]",
            cmd_today,
        ),
        CommandDefinition::new("remove", "Delete an entry by id", "remove <id>", cmd_remove),
        CommandDefinition::new("clear", "Delete every entry", "clear [--yes]", cmd_clear),
        CommandDefinition::new(
            "export",
            "Write all entries to QuickLog_<date>.csv",
            "export [dir]",
            cmd_export,
        ),
        CommandDefinition::new(
            "categories",
            "List known categories or suggest matches",
            "categories [query]",
            cmd_categories,
        ),
    ]
}

/// Values supplied on the command line for a non-interactive `add`.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct AddArgs {
    pub amount: Option<String>,
    pub item: Option<String>,
    pub category: Option<String>,
    pub datetime: Option<String>,
    pub location: Option<String>,
    pub locate: bool,
}

impl AddArgs {
    pub(crate) fn parse(args: &[&str]) -> Result<Self> {
        let mut parsed = AddArgs::default();
        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            if *flag == "--locate" {
                parsed.locate = true;
                continue;
            }
            let slot = match *flag {
                "--amount" => &mut parsed.amount,
                "--item" => &mut parsed.item,
                "--category" => &mut parsed.category,
                "--datetime" => &mut parsed.datetime,
                "--location" => &mut parsed.location,
                other => {
                    return Err(QuickLogError::Input(format!("unknown option `{other}`")));
                }
            };
            let value = iter
                .next()
                .ok_or_else(|| QuickLogError::Input(format!("`{flag}` needs a value")))?;
            *slot = Some((*value).to_string());
        }
        if parsed.locate && parsed.location.is_some() {
            return Err(QuickLogError::Input(
                "use either `--location` or `--locate`, not both".into(),
            ));
        }
        Ok(parsed)
    }

    fn value_for(&self, step: Step) -> &str {
        let value = match step {
            Step::Amount => self.amount.as_deref(),
            Step::Item => self.item.as_deref(),
            Step::Category => self.category.as_deref(),
            Step::Datetime => self.datetime.as_deref(),
            Step::Location => self.location.as_deref(),
            Step::Done => None,
        };
        value.unwrap_or("")
    }
}

fn cmd_add(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return add_interactive(context);
    }
    let parsed = AddArgs::parse(args)?;
    let entry = add_from_args(context, &parsed)?;
    report_saved(context, &entry);
    Ok(())
}

fn add_interactive(context: &mut CommandContext) -> CommandResult {
    let runner = WizardRunner::new(
        provider_from_config(&context.config),
        context.config.location_timeout(),
    );
    let mut interaction = DialoguerInteraction::new();
    match runner.run(&mut context.book, &mut interaction)? {
        FormResult::Completed(entry) => report_saved(context, &entry),
        FormResult::Cancelled => output::info("Entry discarded."),
    }
    Ok(())
}

/// Feeds the flag values through the same wizard the interactive flow uses,
/// so both paths share validation.
pub(crate) fn add_from_args(context: &mut CommandContext, args: &AddArgs) -> Result<LogEntry> {
    let mut wizard = Wizard::new();
    let mut location = args.value_for(Step::Location).to_string();
    if args.locate {
        let provider = provider_from_config(&context.config);
        match request_location(provider, context.config.location_timeout()) {
            Ok(coords) => location = coords.to_string(),
            Err(err) => output::warning(format!("Location unavailable: {err}")),
        }
    }

    for step in [Step::Amount, Step::Item, Step::Category, Step::Datetime] {
        wizard.advance(args.value_for(step))?;
    }
    wizard.advance(&location)?;
    Ok(wizard.save(&mut context.book)?)
}

fn report_saved(context: &CommandContext, entry: &LogEntry) {
    output::success(format!(
        "Saved [{}] {} {} ({})",
        entry.id,
        format_amount(entry.amount, context.currency()),
        entry.item,
        entry.category
    ));
}

fn cmd_list(context: &mut CommandContext, _args: &[&str]) -> CommandResult {
    let entries = context.book.logs().list();
    if entries.is_empty() {
        output::info("No entries yet. Use `quicklog add` to record one.");
        return Ok(());
    }
    output::section("Log");
    for entry in &entries {
        output::info(entry_line(entry, context.currency()));
    }
    output::info(format!("{} entries", entries.len()));
    Ok(())
}

fn cmd_today(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    let date = match args.first() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| QuickLogError::Input(format!("expected YYYY-MM-DD, got `{raw}`")))?,
        None => context.book.today(),
    };
    let summary = SummaryService::daily(context.book.logs(), date);
    let symbol = context.currency();
    output::info(format!(
        "Total for {}: {} ({} entries)",
        date.format("%Y-%m-%d"),
        format_amount(summary.total, symbol),
        summary.count
    ));
    for total in SummaryService::totals_by_category(context.book.logs(), Some(date)) {
        output::info(format!(
            "  {}: {} ({})",
            total.category,
            format_amount(total.total, symbol),
            total.count
        ));
    }
    Ok(())
}

fn cmd_remove(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| QuickLogError::Input("usage: remove <id>".into()))?;
    let id: EntryId = raw
        .parse()
        .map_err(|_| QuickLogError::Input(format!("`{raw}` is not a valid id")))?;
    if context.book.logs_mut().remove(id)? {
        output::success(format!("Removed entry {id}."));
    } else {
        output::info(format!("No entry with id {id}; nothing removed."));
    }
    Ok(())
}

fn cmd_clear(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    let confirmed = args.iter().any(|arg| *arg == "--yes" || *arg == "-y")
        || io::confirm_action(
            &ColorfulTheme::default(),
            "Delete every entry? This cannot be undone.",
            false,
        )?;
    if !confirmed {
        output::info("Nothing deleted.");
        return Ok(());
    }
    let removed = context.book.logs().len();
    context.book.logs_mut().clear()?;
    output::success(format!("Deleted {removed} entries."));
    Ok(())
}

fn cmd_export(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    let dir = match args.first() {
        Some(dir) => context.cwd().join(PathBuf::from(dir)),
        None => context.config.resolve_export_dir(context.cwd()),
    };
    let path = export::export_to_dir(&dir, context.book.today(), context.book.logs().entries())?;
    output::success(format!(
        "Exported {} entries to {}",
        context.book.logs().len(),
        path.display()
    ));
    Ok(())
}

fn cmd_categories(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    let registry = context.book.categories();
    let names: Vec<&str> = match args.first() {
        Some(_) => registry.suggest(&args.join(" "), CATEGORY_SUGGESTIONS),
        None => registry.list().iter().map(String::as_str).collect(),
    };
    if names.is_empty() {
        output::info("No matching categories.");
        return Ok(());
    }
    for name in names {
        output::info(name);
    }
    Ok(())
}
