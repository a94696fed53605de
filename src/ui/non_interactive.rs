//! Plain-line UI for CI and piped output.

use std::collections::HashMap;

use crate::error::{ProvisionError, Result};

use super::output::{error_block_lines, summary_lines};
use super::{
    OutputMode, ProgressSpinner, Prompt, PromptResult, ProvTheme, RunSummary, SpinnerHandle,
    UserInterface,
};

/// Prefix of environment variables that answer prompts without a terminal.
pub const PROMPT_ENV_PREFIX: &str = "TTSPROV_PROMPT_";

/// UI without a terminal.
///
/// A prompt is answered by `TTSPROV_PROMPT_<KEY>` when set, otherwise by
/// its default. Status goes to stdout; warnings and failures to stderr.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: ProvTheme,
    answers: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Read prompt answers from the process environment.
    pub fn new(mode: OutputMode) -> Self {
        let answers = std::env::vars()
            .filter_map(|(k, v)| {
                k.strip_prefix(PROMPT_ENV_PREFIX)
                    .map(|key| (key.to_lowercase(), v))
            })
            .collect();
        Self::with_answers(mode, answers)
    }

    /// Use explicit answers, keyed by prompt key.
    pub fn with_answers(mode: OutputMode, answers: HashMap<String, String>) -> Self {
        Self {
            mode,
            theme: ProvTheme::plain(),
            answers,
        }
    }

    fn detail(&self, text: &str) {
        if self.mode.shows_details() {
            println!("{}", text);
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.detail(msg);
    }

    fn success(&mut self, msg: &str) {
        self.detail(&self.theme.format_success(msg));
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let (answer, source) = match (self.answers.get(&prompt.key), &prompt.default) {
            (Some(answer), _) => (answer.clone(), format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase())),
            (None, Some(default)) => (default.clone(), "default".to_string()),
            (None, None) => {
                return Err(ProvisionError::Other(anyhow::anyhow!(
                    "'{}' needs an answer; set {}{}",
                    prompt.key,
                    PROMPT_ENV_PREFIX,
                    prompt.key.to_uppercase()
                )))
            }
        };
        self.detail(&format!("{} {} ({})", prompt.question, answer, source));
        Ok(PromptResult::from_answer(prompt, &answer))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.detail(&format!("→ {}", message));
        Box::new(ProgressSpinner::line_only(
            Box::new(std::io::stdout()),
            self.theme.clone(),
        ))
    }

    fn show_header(&mut self, title: &str) {
        self.detail(&format!("\n{}\n", self.theme.format_header(title)));
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        self.detail(&format!("[{}/{}]", current, total));
    }

    fn show_hint(&mut self, hint: &str) {
        for line in hint.lines() {
            self.detail(&format!("  {}", line));
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        eprintln!();
        for line in error_block_lines(&self.theme, command, output, hint) {
            eprintln!("    {}", line);
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        println!();
        for line in summary_lines(&self.theme, summary) {
            println!("  {}", line);
        }
    }
}
