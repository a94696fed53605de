//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::output::{error_block_lines, summary_lines};
use super::prompts::ask;
use super::{
    NonInteractiveUI, OutputMode, ProgressSpinner, Prompt, PromptResult, ProvTheme, RunSummary,
    SpinnerHandle, UserInterface,
};

/// UI for a person at a terminal.
pub struct TerminalUI {
    term: Term,
    theme: ProvTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: ProvTheme::detect(),
            mode,
        }
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        writeln!(self.term, "{}", text).ok();
    }

    fn detail(&mut self, text: impl std::fmt::Display) {
        if self.mode.shows_details() {
            self.line(text);
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.detail(msg);
    }

    fn success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.detail(line);
    }

    fn warning(&mut self, msg: &str) {
        let line = self.theme.format_warning(msg);
        self.line(line);
    }

    fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.line(line);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        ask(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.streams_installer_output() {
            // pip writes to the same lines an animated spinner would redraw.
            let line = self.theme.dim.apply_to(format!("→ {}", message)).to_string();
            self.line(line);
            return Box::new(ProgressSpinner::line_only(
                Box::new(self.term.clone()),
                self.theme.clone(),
            ));
        }
        Box::new(ProgressSpinner::animated(message, self.theme.clone()))
    }

    fn show_header(&mut self, title: &str) {
        let line = format!("\n{}\n", self.theme.format_header(title));
        self.detail(line);
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        let line = self.theme.dim.apply_to(format!("[{}/{}]", current, total)).to_string();
        self.detail(line);
    }

    fn show_hint(&mut self, hint: &str) {
        let lines: Vec<String> = hint
            .lines()
            .map(|l| format!("  {}", self.theme.hint.apply_to(l)))
            .collect();
        for line in lines {
            self.detail(line);
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        self.line("");
        for line in error_block_lines(&self.theme, command, output, hint) {
            self.line(format!("    {}", line));
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        self.line("");
        for line in summary_lines(&self.theme, summary) {
            self.line(format!("  {}", line));
        }
    }
}

/// Terminal UI when asked for and stdout is a terminal, plain lines otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_ui_keeps_mode() {
        let ui = create_ui(false, OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
