use super::{CommandContext, CommandDefinition, CommandResult};
use crate::cli::help;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "help",
        "Show available commands",
        "help [command]",
        cmd_help,
    )]
}

fn cmd_help(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.registry.get(&name) {
            Some(command) => help::print_command(command),
            None => help::print_unknown(&name, context.registry.closest(&name)),
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}
