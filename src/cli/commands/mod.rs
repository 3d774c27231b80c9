use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod config;
pub mod entry;
pub mod system;

use crate::cli::output::{self, OutputPreferences};
use crate::config::{Config, ConfigManager};
use crate::core::utils::PathResolver;
use crate::core::ExpenseBook;
use crate::errors::{QuickLogError, Result};

const SUGGESTION_THRESHOLD: f64 = 0.8;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(entry::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandResult = Result<()>;

pub type CommandHandler = fn(&mut CommandContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    /// Closest known command name to a mistyped one.
    pub fn closest(&self, name: &str) -> Option<&'static str> {
        let needle = name.to_lowercase();
        self.order
            .iter()
            .map(|candidate| (strsim::jaro_winkler(candidate, &needle), *candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate)
    }
}

/// State shared by every command of one invocation.
pub struct CommandContext {
    pub book: ExpenseBook,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub registry: CommandRegistry,
    cwd: PathBuf,
}

impl CommandContext {
    /// Opens configuration and storage under `base`.
    pub fn open(base: PathBuf, cwd: PathBuf) -> Result<Self> {
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load_or_default();
        output::set_preferences(OutputPreferences {
            plain_mode: config.plain_output,
        });
        let book = ExpenseBook::open_default(Some(base))?;
        for warning in book.warnings() {
            output::warning(format!("Stored data was unreadable and has been reset: {warning}"));
        }
        Ok(Self {
            book,
            config,
            config_manager,
            registry: CommandRegistry::new(all_definitions()),
            cwd,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    pub fn dispatch(&mut self, raw: &str, args: &[&str]) -> CommandResult {
        let name = raw.to_lowercase();
        let Some(definition) = self.registry.get(&name) else {
            let hint = self
                .registry
                .closest(&name)
                .map(|candidate| format!(" Did you mean `{candidate}`?"))
                .unwrap_or_default();
            return Err(QuickLogError::Input(format!(
                "unknown command `{raw}`.{hint} Run `quicklog help` for a list."
            )));
        };
        tracing::debug!(command = definition.name, "dispatching command");
        let handler = definition.handler;
        handler(self, args)
    }
}

/// Entry point for the `quicklog` binary.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cwd = std::env::current_dir().map_err(crate::errors::StorageError::from)?;
    run_with_args(PathResolver::base_dir(), cwd, &args)
}

/// Runs one command line against the data directory `base`. With no
/// arguments the command overview is shown.
pub fn run_with_args(base: PathBuf, cwd: PathBuf, args: &[String]) -> Result<()> {
    let mut context = CommandContext::open(base, cwd)?;
    let Some((command, rest)) = args.split_first() else {
        return context.dispatch("help", &[]);
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.dispatch(command, &rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> CommandContext {
        CommandContext::open(dir.path().to_path_buf(), dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn registry_keeps_declaration_order() {
        let registry = CommandRegistry::new(all_definitions());
        let names: Vec<&str> = registry.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "add",
                "list",
                "today",
                "remove",
                "clear",
                "export",
                "categories",
                "config",
                "help",
            ]
        );
    }

    #[test]
    fn mistyped_commands_get_a_hint() {
        let registry = CommandRegistry::new(all_definitions());
        assert_eq!(registry.closest("lsit"), Some("list"));
        assert_eq!(registry.closest("expotr"), Some("export"));
        assert_eq!(registry.closest("zzz"), None);
    }

    #[test]
    fn unknown_command_is_an_input_error() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let err = context.dispatch("frobnicate", &[]).unwrap_err();
        assert!(matches!(err, QuickLogError::Input(_)));
    }

    #[test]
    fn dispatch_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        context.dispatch("LIST", &[]).unwrap();
    }
}
