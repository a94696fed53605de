//! Recording [`UserInterface`] for tests.
//!
//! `MockUI` keeps one ordered log of everything shown, including spinner
//! results, and answers prompts from responses set up front. Unanswered
//! prompts take their default.
//!
//! # Example
//!
//! ```
//! use ttsprov::ui::{MockUI, UiEvent, UserInterface};
//!
//! let mut ui = MockUI::new();
//! let mut spinner = ui.start_spinner("Upgrade pip");
//! spinner.finish_success("Upgrade pip (1.2s)");
//! ui.warning("macOS 12.2 has no MPS backend");
//!
//! assert_eq!(ui.step_results(), vec![(true, "Upgrade pip (1.2s)".to_string())]);
//! assert!(ui.has_warning("no MPS"));
//! assert!(matches!(ui.events()[0], UiEvent::SpinnerStarted(_)));
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::{ProvisionError, Result};

use super::{OutputMode, Prompt, PromptResult, RunSummary, SpinnerHandle, UserInterface};

/// A failed command as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub command: String,
    pub output: String,
    pub hint: Option<String>,
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Message(String),
    Success(String),
    Warning(String),
    Error(String),
    Header(String),
    Progress(usize, usize),
    Hint(String),
    /// Prompt key.
    Prompt(String),
    SpinnerStarted(String),
    SpinnerFinished { success: bool, message: String },
    ErrorBlock(ErrorBlock),
    Summary(RunSummary),
}

type Log = Rc<RefCell<Vec<UiEvent>>>;

/// UI double that records instead of printing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    log: Log,
    responses: HashMap<String, String>,
    failing_prompts: HashSet<String>,
}

impl MockUI {
    /// Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Answer prompt `key` with `response`.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.responses.insert(key.to_string(), response.to_string());
    }

    /// Make prompt `key` fail as if the terminal went away.
    pub fn fail_prompt(&mut self, key: &str) {
        self.failing_prompts.insert(key.to_string());
    }

    /// Every recorded interaction, in order.
    pub fn events(&self) -> Vec<UiEvent> {
        self.log.borrow().clone()
    }

    fn record(&self, event: UiEvent) {
        self.log.borrow_mut().push(event);
    }

    fn collect<T>(&self, pick: impl Fn(&UiEvent) -> Option<T>) -> Vec<T> {
        self.log.borrow().iter().filter_map(pick).collect()
    }

    fn any(&self, pick: impl Fn(&UiEvent) -> Option<&String>, needle: &str) -> bool {
        self.log
            .borrow()
            .iter()
            .filter_map(pick)
            .any(|text| text.contains(needle))
    }

    /// Keys of the prompts shown, in order.
    pub fn prompts_shown(&self) -> Vec<String> {
        self.collect(|e| match e {
            UiEvent::Prompt(key) => Some(key.clone()),
            _ => None,
        })
    }

    pub fn was_prompted(&self, key: &str) -> bool {
        self.prompts_shown().iter().any(|k| k == key)
    }

    pub fn has_message(&self, needle: &str) -> bool {
        self.any(
            |e| match e {
                UiEvent::Message(m) => Some(m),
                _ => None,
            },
            needle,
        )
    }

    pub fn has_success(&self, needle: &str) -> bool {
        self.any(
            |e| match e {
                UiEvent::Success(m) => Some(m),
                _ => None,
            },
            needle,
        )
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.any(
            |e| match e {
                UiEvent::Warning(m) => Some(m),
                _ => None,
            },
            needle,
        )
    }

    /// Hints shown on their own or attached to an error block.
    pub fn has_hint(&self, needle: &str) -> bool {
        self.any(
            |e| match e {
                UiEvent::Hint(h) => Some(h),
                UiEvent::ErrorBlock(ErrorBlock { hint: Some(h), .. }) => Some(h),
                _ => None,
            },
            needle,
        )
    }

    pub fn error_blocks(&self) -> Vec<ErrorBlock> {
        self.collect(|e| match e {
            UiEvent::ErrorBlock(block) => Some(block.clone()),
            _ => None,
        })
    }

    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.collect(|e| match e {
            UiEvent::Progress(current, total) => Some((*current, *total)),
            _ => None,
        })
    }

    /// Spinner results as `(succeeded, line)`.
    pub fn step_results(&self) -> Vec<(bool, String)> {
        self.collect(|e| match e {
            UiEvent::SpinnerFinished { success, message } => Some((*success, message.clone())),
            _ => None,
        })
    }

    pub fn summaries(&self) -> Vec<RunSummary> {
        self.collect(|e| match e {
            UiEvent::Summary(summary) => Some(summary.clone()),
            _ => None,
        })
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.record(UiEvent::Message(msg.to_string()));
    }

    fn success(&mut self, msg: &str) {
        self.record(UiEvent::Success(msg.to_string()));
    }

    fn warning(&mut self, msg: &str) {
        self.record(UiEvent::Warning(msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.record(UiEvent::Error(msg.to_string()));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.record(UiEvent::Prompt(prompt.key.clone()));
        if self.failing_prompts.contains(&prompt.key) {
            return Err(ProvisionError::Other(anyhow::anyhow!(
                "prompt '{}' could not be shown",
                prompt.key
            )));
        }
        let answer = self
            .responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .unwrap_or_default();
        Ok(PromptResult::from_answer(prompt, &answer))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.record(UiEvent::SpinnerStarted(message.to_string()));
        Box::new(MockSpinner {
            log: Rc::clone(&self.log),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.record(UiEvent::Header(title.to_string()));
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        self.record(UiEvent::Progress(current, total));
    }

    fn show_hint(&mut self, hint: &str) {
        self.record(UiEvent::Hint(hint.to_string()));
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        self.record(UiEvent::ErrorBlock(ErrorBlock {
            command: command.to_string(),
            output: output.to_string(),
            hint: hint.map(str::to_string),
        }));
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        self.record(UiEvent::Summary(summary.clone()));
    }
}

/// Spinner that writes its result into the owning [`MockUI`]'s log.
struct MockSpinner {
    log: Log,
}

impl MockSpinner {
    fn finish(&mut self, success: bool, msg: &str) {
        self.log.borrow_mut().push(UiEvent::SpinnerFinished {
            success,
            message: msg.to_string(),
        });
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        self.finish(true, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(false, msg);
    }
}
