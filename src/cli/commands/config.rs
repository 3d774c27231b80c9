use super::{CommandContext, CommandDefinition, CommandResult};
use crate::cli::output;
use crate::config::SETTING_KEYS;
use crate::errors::QuickLogError;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences",
        "config [show|path|set <key> <value>|unset <key>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut CommandContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "path" => {
            output::info(context.config_manager.path().display());
            Ok(())
        }
        "set" => {
            if args.len() < 3 {
                return Err(QuickLogError::Input(format!(
                    "usage: config set <{}> <value>",
                    SETTING_KEYS.join("|")
                )));
            }
            let value = args[2..].join(" ");
            update(context, args[1], &value)
        }
        "unset" => {
            let key = args
                .get(1)
                .ok_or_else(|| QuickLogError::Input("usage: config unset <key>".into()))?;
            update(context, key, "")
        }
        other => Err(QuickLogError::Input(format!(
            "unknown config action `{other}`; expected show, path, set or unset"
        ))),
    }
}

fn show_config(context: &CommandContext) -> CommandResult {
    output::section("Configuration");
    for (key, value) in context.config.entries() {
        output::info(format!("  {key:<22} {value}"));
    }
    Ok(())
}

fn update(context: &mut CommandContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set(&key.to_lowercase(), value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    output::success(format!("Updated `{key}`."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use tempfile::TempDir;

    #[test]
    fn set_persists_and_updates_context() {
        let dir = TempDir::new().unwrap();
        let mut context =
            CommandContext::open(dir.path().to_path_buf(), dir.path().to_path_buf()).unwrap();
        cmd_config(&mut context, &["set", "default_location", "-6.2,", "106.8"]).unwrap();
        assert_eq!(context.config.default_location.as_deref(), Some("-6.2, 106.8"));

        let stored = ConfigManager::with_base_dir(dir.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(stored, context.config);

        cmd_config(&mut context, &["unset", "default_location"]).unwrap();
        assert_eq!(context.config.default_location, None);
    }

    #[test]
    fn invalid_values_leave_config_untouched() {
        let dir = TempDir::new().unwrap();
        let mut context =
            CommandContext::open(dir.path().to_path_buf(), dir.path().to_path_buf()).unwrap();
        let before = context.config.clone();
        assert!(cmd_config(&mut context, &["set", "location_timeout_secs", "soon"]).is_err());
        assert!(cmd_config(&mut context, &["set", "theme"]).is_err());
        assert_eq!(context.config, before);
    }
}
