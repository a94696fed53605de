//! Command-line interface.
//!
//! The tool has a single entry point with no subcommands; [`run`] wires
//! the parsed flags, the plan file and the host into the workflow.

pub mod args;

pub use args::Cli;

use std::path::Path;

use crate::config::load_plan;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::system::HostSystem;
use crate::ui::UserInterface;
use crate::workflow::provision;

/// Run the full flow against the real host.
pub fn run(cli: &Cli, ui: &mut dyn UserInterface, cwd: &Path) -> Result<()> {
    let plan = load_plan(cli.config.as_deref(), cwd)?;
    let mut ctx = ExecutionContext::from_env();
    let mut system = HostSystem::new();
    provision(&mut system, ui, &mut ctx, &plan, cwd)?;
    Ok(())
}
