//! Terminal styles.

use console::Style;

/// Styles for status lines and framed blocks.
#[derive(Debug, Clone)]
pub struct ProvTheme {
    /// Completed steps and stages.
    pub success: Style,
    /// Caveats the run continues past.
    pub warning: Style,
    /// Failures.
    pub error: Style,
    /// Secondary text: durations, paths, progress counters.
    pub dim: Style,
    /// Stage banners.
    pub header: Style,
    /// The command line inside an error block.
    pub command: Style,
    /// Box-drawing frame.
    pub border: Style,
    /// Remediation hints.
    pub hint: Style,
}

impl Default for ProvTheme {
    fn default() -> Self {
        Self::colored()
    }
}

impl ProvTheme {
    /// Colored styles for an interactive terminal.
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
            hint: Style::new().cyan(),
        }
    }

    /// No styling at all.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            command: Style::new(),
            border: Style::new(),
            hint: Style::new(),
        }
    }

    /// Colored unless `NO_COLOR` is set or stdout is not a terminal.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// `✓ msg`
    pub fn format_success(&self, msg: &str) -> String {
        self.success.apply_to(format!("✓ {}", msg)).to_string()
    }

    /// `⚠ msg`
    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(format!("⚠ {}", msg)).to_string()
    }

    /// `✗ msg`
    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(format!("✗ {}", msg)).to_string()
    }

    /// `▸ title`
    pub fn format_header(&self, title: &str) -> String {
        self.header.apply_to(format!("▸ {}", title)).to_string()
    }
}

/// Whether colored output is wanted.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_status_lines() {
        let theme = ProvTheme::plain();
        assert_eq!(theme.format_success("Installed torch"), "✓ Installed torch");
        assert_eq!(theme.format_warning("macOS 12.2"), "⚠ macOS 12.2");
        assert_eq!(theme.format_error("pip failed"), "✗ pip failed");
        assert_eq!(theme.format_header("Installing packages"), "▸ Installing packages");
    }
}
