//! Step spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

use super::theme::ProvTheme;
use super::SpinnerHandle;

enum Surface {
    /// Animated bar, replaced by the finish line.
    Bar(ProgressBar),
    /// Only the finish line, written as plain output.
    Lines(Box<dyn Write>),
}

/// Spinner shown while a command runs.
pub struct ProgressSpinner {
    surface: Surface,
    theme: ProvTheme,
}

impl ProgressSpinner {
    /// Animated spinner on stdout.
    pub fn animated(message: &str, theme: ProvTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            surface: Surface::Bar(bar),
            theme,
        }
    }

    /// No animation; the result is written to `out` as its own line.
    ///
    /// Used when installer output is streamed or there is no terminal.
    pub fn line_only(out: Box<dyn Write>, theme: ProvTheme) -> Self {
        Self {
            surface: Surface::Lines(out),
            theme,
        }
    }

    fn finish_with(&mut self, line: String) {
        match &mut self.surface {
            Surface::Bar(bar) => {
                if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
                    bar.set_style(style);
                }
                bar.finish_with_message(line);
            }
            Surface::Lines(out) => {
                writeln!(out, "{}", line).ok();
                out.flush().ok();
            }
        }
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[test]
    fn line_only_spinner_writes_result_line() {
        let out = Captured::default();
        let mut spinner = ProgressSpinner::line_only(Box::new(out.clone()), ProvTheme::plain());
        spinner.finish_success("Install torch + torchaudio (12.3s)");
        assert_eq!(out.text(), "✓ Install torch + torchaudio (12.3s)\n");
    }

    #[test]
    fn line_only_spinner_writes_failure_line() {
        let out = Captured::default();
        let mut spinner = ProgressSpinner::line_only(Box::new(out.clone()), ProvTheme::plain());
        spinner.finish_error("Install onnx==1.16.2 failed (3.0s)");
        assert_eq!(out.text(), "✗ Install onnx==1.16.2 failed (3.0s)\n");
    }
}
