//! User interaction.
//!
//! Every stage talks to the user through [`UserInterface`]. Three
//! implementations exist:
//! - [`TerminalUI`]: colors, spinners and `dialoguer` prompts
//! - [`NonInteractiveUI`]: plain lines; prompts answered by
//!   `TTSPROV_PROMPT_<KEY>` overrides or their defaults
//! - [`MockUI`]: records everything for assertions
//!
//! Branch points go through [`confirm`] and [`select`], which normalize
//! whatever the implementation returns.
//!
//! # Example
//!
//! ```
//! use ttsprov::ui::{confirm, MockUI};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("smoke_test", "yes");
//! assert!(confirm(&mut ui, "smoke_test", "Run a smoke test?", false).unwrap());
//! assert!(ui.was_prompted("smoke_test"));
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{ErrorBlock, MockUI, UiEvent};
pub use non_interactive::NonInteractiveUI;
pub use output::{format_duration, OutputMode};
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::ProvTheme;

use std::time::Duration;

use crate::error::Result;

/// Everything a stage may show or ask.
pub trait UserInterface {
    /// Verbosity selected on the command line.
    fn output_mode(&self) -> OutputMode;

    /// Informational line.
    fn message(&mut self, msg: &str);

    /// Something completed.
    fn success(&mut self, msg: &str);

    /// A caveat the run continues past.
    fn warning(&mut self, msg: &str);

    /// A failure.
    fn error(&mut self, msg: &str);

    /// Ask a question.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for a long-running command.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Stage banner.
    fn show_header(&mut self, title: &str);

    /// Position in the install sequence.
    fn show_progress(&mut self, current: usize, total: usize);

    /// Remediation instructions.
    fn show_hint(&mut self, hint: &str);

    /// A failed command with the tail of its output and a hint.
    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>);

    /// End-of-run summary.
    fn show_summary(&mut self, summary: &RunSummary);
}

/// Result line of a spinner.
pub trait SpinnerHandle {
    /// The command succeeded.
    fn finish_success(&mut self, msg: &str);

    /// The command failed.
    fn finish_error(&mut self, msg: &str);
}

/// A question for the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Stable key, used for overrides and in tests.
    pub key: String,
    /// Text shown to the user.
    pub question: String,
    /// Kind of answer expected.
    pub prompt_type: PromptType,
    /// Answer used when the user (or a non-interactive run) gives none.
    pub default: Option<String>,
}

/// Kind of answer a prompt expects.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no.
    Confirm,
    /// One of a fixed set of options.
    Select { options: Vec<PromptOption> },
}

/// One menu entry.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Text shown in the menu.
    pub label: String,
    /// Value returned when chosen.
    pub value: String,
}

impl PromptOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Raw answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// From an interactive confirm.
    Bool(bool),
    /// From a menu, an override or a default.
    String(String),
}

impl PromptResult {
    /// Interpret a textual answer the way confirm prompts do.
    pub fn from_answer(prompt: &Prompt, answer: &str) -> Self {
        match prompt.prompt_type {
            PromptType::Confirm => Self::Bool(is_yes(answer)),
            PromptType::Select { .. } => Self::String(answer.to_string()),
        }
    }

    /// Answer as text.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Answer as yes/no.
    pub fn is_yes(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => is_yes(s),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

/// Ask a yes/no question.
pub fn confirm(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    default: bool,
) -> Result<bool> {
    let prompt = Prompt {
        key: key.to_string(),
        question: question.to_string(),
        prompt_type: PromptType::Confirm,
        default: Some(if default { "yes" } else { "no" }.to_string()),
    };
    let answer = ui.prompt(&prompt)?.is_yes();
    tracing::debug!("Prompt '{}' answered {}", key, answer);
    Ok(answer)
}

/// Ask the user to pick one option; returns the option's value.
///
/// Answers that match no option's value (e.g. a mistyped override) fall
/// back to `default`.
pub fn select(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    options: Vec<PromptOption>,
    default: &str,
) -> Result<String> {
    let values: Vec<String> = options.iter().map(|o| o.value.clone()).collect();
    let prompt = Prompt {
        key: key.to_string(),
        question: question.to_string(),
        prompt_type: PromptType::Select { options },
        default: Some(default.to_string()),
    };
    let answer = ui.prompt(&prompt)?.as_string().trim().to_lowercase();
    let chosen = if values.contains(&answer) {
        answer
    } else {
        tracing::debug!("Unrecognized answer '{}' for '{}'", answer, key);
        default.to_string()
    };
    tracing::debug!("Prompt '{}' answered {}", key, chosen);
    Ok(chosen)
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Done,
    /// Done, with a caveat.
    Warned,
    /// Not run or not needed.
    Skipped,
}

impl StageStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Done => "✓",
            Self::Warned => "⚠",
            Self::Skipped => "○",
        }
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub name: String,
    pub status: StageStatus,
    /// Version, path or step count.
    pub detail: Option<String>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Stages in execution order.
    pub stages: Vec<StageResult>,
    pub total_duration: Duration,
}

impl RunSummary {
    /// Append a stage result.
    pub fn record(&mut self, name: &str, status: StageStatus, detail: Option<String>) {
        self.stages.push(StageResult {
            name: name.to_string(),
            status,
            detail,
        });
    }

    /// Status of a stage by name.
    pub fn status_of(&self, name: &str) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }
}
