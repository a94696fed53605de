//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::ui::OutputMode;

/// Provision a macOS (Apple Silicon) machine for Coqui TTS with MPS acceleration.
///
/// Finds or installs a Python 3.9 to 3.12, sets up a virtual environment,
/// and installs the pinned TTS stack. Run without arguments.
#[derive(Debug, Parser)]
#[command(name = "ttsprov")]
#[command(author, version)]
pub struct Cli {
    /// Path to a plan file (overrides ./ttsprov.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stream installer output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Output mode selected by the flags.
    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}
