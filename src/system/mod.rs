//! Host interrogation behind a mockable seam.
//!
//! Every stage talks to the outside world through [`SystemInterrogator`]:
//! existence checks, version queries, and installer commands. Production
//! code uses [`HostSystem`]; tests use [`FakeSystem`], which records every
//! call so that ordering and short-circuit behavior can be asserted.

pub mod fake;

pub use fake::{FakeSystem, SystemCall};

use std::path::{Path, PathBuf};

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::shell::{execute, is_executable, resolve_tool_path, CommandLine, CommandResult};

/// Capabilities the provisioning stages need from the host.
pub trait SystemInterrogator {
    /// Whether `program` exists: an absolute path must be an executable
    /// file, a bare name must resolve on the context's search path.
    fn command_exists(&mut self, program: &str, ctx: &ExecutionContext) -> bool;

    /// Run `program --version` and return its combined output.
    ///
    /// Returns `None` if the program cannot be spawned or exits non-zero.
    fn run_and_capture_version(&mut self, program: &str, ctx: &ExecutionContext)
        -> Option<String>;

    /// Run an installer command.
    ///
    /// With `stream` set, output goes straight to the terminal; otherwise
    /// it is captured into the result.
    fn run_install_command(
        &mut self,
        command: &CommandLine,
        ctx: &ExecutionContext,
        stream: bool,
    ) -> Result<CommandResult>;

    /// Run a command and capture its output.
    fn run_capture(&mut self, command: &CommandLine, ctx: &ExecutionContext)
        -> Result<CommandResult>;
}

/// [`SystemInterrogator`] backed by real processes.
#[derive(Debug, Default)]
pub struct HostSystem;

impl HostSystem {
    /// Create a host interrogator.
    pub fn new() -> Self {
        Self
    }

    /// Resolve a bare program name against the context's search path.
    ///
    /// Unresolvable names are returned unchanged so that spawning reports
    /// the failure.
    fn resolve(program: &str, ctx: &ExecutionContext) -> PathBuf {
        if program.contains(std::path::MAIN_SEPARATOR) {
            return PathBuf::from(program);
        }
        resolve_tool_path(program, ctx.search_path()).unwrap_or_else(|| PathBuf::from(program))
    }

    fn resolved_line(command: &CommandLine, ctx: &ExecutionContext) -> CommandLine {
        CommandLine {
            program: Self::resolve(&command.program, ctx)
                .to_string_lossy()
                .into_owned(),
            args: command.args.clone(),
        }
    }
}

impl SystemInterrogator for HostSystem {
    fn command_exists(&mut self, program: &str, ctx: &ExecutionContext) -> bool {
        if program.contains(std::path::MAIN_SEPARATOR) {
            let path = Path::new(program);
            path.is_file() && is_executable(path)
        } else {
            resolve_tool_path(program, ctx.search_path()).is_some()
        }
    }

    fn run_and_capture_version(
        &mut self,
        program: &str,
        ctx: &ExecutionContext,
    ) -> Option<String> {
        let command = CommandLine::new(program, ["--version"]);
        match self.run_capture(&command, ctx) {
            Ok(result) if result.success => Some(result.combined_output()),
            Ok(result) => {
                tracing::debug!(
                    "{} --version exited with {:?}",
                    program,
                    result.exit_code
                );
                None
            }
            Err(e) => {
                tracing::debug!("{} --version could not run: {}", program, e);
                None
            }
        }
    }

    fn run_install_command(
        &mut self,
        command: &CommandLine,
        ctx: &ExecutionContext,
        stream: bool,
    ) -> Result<CommandResult> {
        let line = Self::resolved_line(command, ctx);
        execute(&line, &ctx.command_options(!stream))
    }

    fn run_capture(
        &mut self,
        command: &CommandLine,
        ctx: &ExecutionContext,
    ) -> Result<CommandResult> {
        let line = Self::resolved_line(command, ctx);
        execute(&line, &ctx.command_options(true))
    }
}
