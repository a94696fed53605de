//! Output verbosity and the framed blocks shared by every UI.

use std::time::Duration;

use super::theme::ProvTheme;
use super::RunSummary;

const FRAME_WIDTH: usize = 36;

/// How much the run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Installer output goes straight to the terminal.
    Verbose,
    /// Spinners, progress and stage messages.
    #[default]
    Normal,
    /// Step results, warnings, errors and the summary only.
    Quiet,
}

impl OutputMode {
    /// Whether pip and brew output is streamed instead of captured.
    pub fn streams_installer_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether informational messages, headers, progress and hints print.
    pub fn shows_details(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

fn rule(theme: &ProvTheme, corner: &str, title: &str) -> String {
    let label = if title.is_empty() {
        String::new()
    } else {
        format!(" {} ", title)
    };
    let fill = FRAME_WIDTH.saturating_sub(label.chars().count());
    theme
        .border
        .apply_to(format!("{}{}{}", corner, label, "─".repeat(fill)))
        .to_string()
}

fn framed(theme: &ProvTheme, text: impl std::fmt::Display) -> String {
    format!("{} {}", theme.border.apply_to("│"), text)
}

/// Lines of the block shown for a failed command.
pub fn error_block_lines(
    theme: &ProvTheme,
    command: &str,
    output: &str,
    hint: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        rule(theme, "┌─", "Command"),
        framed(theme, theme.command.apply_to(command)),
    ];
    if !output.is_empty() {
        lines.push(rule(theme, "├─", "Output"));
        lines.extend(output.lines().map(|line| framed(theme, line)));
    }
    lines.push(rule(theme, "└─", ""));
    if let Some(hint) = hint {
        lines.push(String::new());
        lines.extend(hint.lines().map(|line| theme.hint.apply_to(line).to_string()));
    }
    lines
}

/// Lines of the end-of-run summary.
pub fn summary_lines(theme: &ProvTheme, summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![rule(theme, "┌─", "Summary")];
    for stage in &summary.stages {
        let detail = stage.detail.as_deref().unwrap_or("");
        lines.push(framed(
            theme,
            format!(
                "{} {:<20} {}",
                stage.status.icon(),
                stage.name,
                theme.dim.apply_to(detail)
            ),
        ));
    }
    lines.push(rule(theme, "├─", ""));
    lines.push(framed(
        theme,
        format!("Total: {}", format_duration(summary.total_duration)),
    ));
    lines.push(rule(theme, "└─", ""));
    lines
}
