//! Terminal prompts via `dialoguer`.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::error::{ProvisionError, Result};

use super::{Prompt, PromptOption, PromptResult, PromptType};

fn dialog_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style(String::new()),
        ..ColorfulTheme::default()
    }
}

fn prompt_failed(prompt: &Prompt, e: dialoguer::Error) -> ProvisionError {
    tracing::debug!("Prompt '{}' failed: {}", prompt.key, e);
    ProvisionError::Io(e.into())
}

/// Ask `prompt` on `term` and wait for an answer.
pub fn ask(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => Confirm::with_theme(&dialog_theme())
            .with_prompt(&prompt.question)
            .default(default_answer(prompt))
            .interact_on(term)
            .map(PromptResult::Bool)
            .map_err(|e| prompt_failed(prompt, e)),
        PromptType::Select { options } => {
            let index = Select::with_theme(&dialog_theme())
                .with_prompt(&prompt.question)
                .items(&menu_labels(options))
                .default(default_index(prompt, options))
                .interact_on(term)
                .map_err(|e| prompt_failed(prompt, e))?;
            Ok(PromptResult::String(options[index].value.clone()))
        }
    }
}

/// Default of a confirm prompt; only an explicit yes counts.
fn default_answer(prompt: &Prompt) -> bool {
    PromptResult::String(prompt.default.clone().unwrap_or_default()).is_yes()
}

fn default_index(prompt: &Prompt, options: &[PromptOption]) -> usize {
    prompt
        .default
        .as_deref()
        .and_then(|d| options.iter().position(|o| o.value == d))
        .unwrap_or(0)
}

/// `1) Create a virtual environment`, ...
fn menu_labels(options: &[PromptOption]) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}) {}", i + 1, o.label))
        .collect()
}
