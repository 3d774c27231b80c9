use crate::cli::commands::{CommandDefinition, CommandRegistry};
use crate::cli::output;

pub fn print_overview(registry: &CommandRegistry) {
    output::section("QuickLog commands");
    for entry in registry.iter() {
        output::info(format!("  {:<12} {}", entry.name, entry.description));
    }
    output::info("Use `quicklog help <command>` for details.");
}

pub fn print_command(entry: &CommandDefinition) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  Description: {}", entry.description));
    output::info(format!("  Usage: quicklog {}", entry.usage));
}

pub fn print_unknown(name: &str, suggestion: Option<&str>) {
    match suggestion {
        Some(candidate) => {
            output::warning(format!("Unknown command `{name}`. Did you mean `{candidate}`?"))
        }
        None => output::warning(format!("Unknown command `{name}`.")),
    }
}
