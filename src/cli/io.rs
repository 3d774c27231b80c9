use dialoguer::{theme::ColorfulTheme, Completion, Confirm, Input};

use crate::errors::Result;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(theme: &ColorfulTheme, prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Prompt for free-form text. Blank input is allowed; `default` is offered
/// as the pre-filled answer.
pub fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    default: Option<&str>,
    completion: Option<&CategoryCompletion>,
) -> Result<String> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    if let Some(completion) = completion {
        input = input.completion_with(completion);
    }
    Ok(input.interact_text()?)
}

/// Tab completion over known category names (case-insensitive prefix).
pub struct CategoryCompletion {
    names: Vec<String>,
}

impl CategoryCompletion {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
        }
    }
}

impl Completion for CategoryCompletion {
    fn get(&self, input: &str) -> Option<String> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.names
            .iter()
            .find(|name| name.to_lowercase().starts_with(&needle))
            .cloned()
    }
}
