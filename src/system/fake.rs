//! Recording [`SystemInterrogator`] for tests.
//!
//! `FakeSystem` knows a fixed set of executables (by bare name or absolute
//! path) with the text their `--version` query prints. Installer commands
//! succeed unless they match a configured failure, and may register new
//! executables when they succeed (e.g. `brew install python@3.11`).
//!
//! # Example
//!
//! ```
//! use ttsprov::context::ExecutionContext;
//! use ttsprov::system::{FakeSystem, SystemCall, SystemInterrogator};
//!
//! let mut system = FakeSystem::new();
//! system.add_executable("python3", "Python 3.11.9");
//!
//! let ctx = ExecutionContext::default();
//! assert!(system.command_exists("python3", &ctx));
//! assert_eq!(
//!     system.run_and_capture_version("python3", &ctx).as_deref(),
//!     Some("Python 3.11.9")
//! );
//! assert_eq!(system.calls().len(), 2);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::shell::{CommandLine, CommandResult};

use super::SystemInterrogator;

/// A recorded interaction with the fake host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCall {
    /// `command_exists(program)`.
    Exists(String),
    /// `run_and_capture_version(program)`.
    Version(String),
    /// `run_install_command(command)`, rendered.
    Install(String),
    /// `run_capture(command)`, rendered.
    Capture(String),
}

/// An executable the fake host knows about.
#[derive(Debug, Clone)]
enum Executable {
    /// Runs and prints this text for `--version`.
    Runs(String),
    /// Exists but cannot be executed.
    Broken,
}

/// Files a successful install makes appear.
#[derive(Debug, Clone)]
struct InstallEffect {
    pattern: String,
    adds: Vec<(String, String)>,
}

/// Fake host for exercising stages without real processes.
#[derive(Debug, Default)]
pub struct FakeSystem {
    executables: HashMap<String, Executable>,
    failures: Vec<(String, i32)>,
    unspawnable: Vec<String>,
    effects: Vec<InstallEffect>,
    capture_outputs: Vec<(String, String)>,
    install_output: String,
    calls: Vec<SystemCall>,
}

impl FakeSystem {
    /// Create an empty fake host.
    pub fn new() -> Self {
        Self {
            install_output: "Requirement already satisfied".to_string(),
            ..Default::default()
        }
    }

    /// Register an executable whose `--version` prints `version_output`.
    pub fn add_executable(&mut self, program: &str, version_output: &str) {
        self.executables.insert(
            program.to_string(),
            Executable::Runs(version_output.to_string()),
        );
    }

    /// Register an executable that exists but fails to run.
    pub fn add_broken_executable(&mut self, program: &str) {
        self.executables
            .insert(program.to_string(), Executable::Broken);
    }

    /// Make any install/capture command whose rendering contains `pattern`
    /// exit with `code`.
    pub fn fail_when(&mut self, pattern: &str, code: i32) {
        self.failures.push((pattern.to_string(), code));
    }

    /// Make any command whose rendering contains `pattern` fail to spawn.
    pub fn unspawnable_when(&mut self, pattern: &str) {
        self.unspawnable.push(pattern.to_string());
    }

    /// When an install command containing `pattern` succeeds, register
    /// `program` with the given version output.
    pub fn on_install(&mut self, pattern: &str, program: &str, version_output: &str) {
        if let Some(effect) = self.effects.iter_mut().find(|e| e.pattern == pattern) {
            effect
                .adds
                .push((program.to_string(), version_output.to_string()));
            return;
        }
        self.effects.push(InstallEffect {
            pattern: pattern.to_string(),
            adds: vec![(program.to_string(), version_output.to_string())],
        });
    }

    /// Stdout returned by `run_capture` for commands containing `pattern`.
    ///
    /// Setting the same pattern again replaces the earlier output.
    pub fn set_capture_output(&mut self, pattern: &str, stdout: &str) {
        if let Some(entry) = self.capture_outputs.iter_mut().find(|(p, _)| p == pattern) {
            entry.1 = stdout.to_string();
            return;
        }
        self.capture_outputs
            .push((pattern.to_string(), stdout.to_string()));
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> &[SystemCall] {
        &self.calls
    }

    /// Rendered install commands, in order.
    pub fn installs(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SystemCall::Install(cmd) => Some(cmd.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Programs whose version was queried, in order.
    pub fn version_queries(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SystemCall::Version(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether any install command contained `pattern`.
    pub fn installed(&self, pattern: &str) -> bool {
        self.installs().iter().any(|c| c.contains(pattern))
    }

    /// Forget recorded calls, keeping configuration.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn outcome(&self, rendered: &str, stdout: String) -> Result<CommandResult> {
        if self.unspawnable.iter().any(|p| rendered.contains(p)) {
            return Err(ProvisionError::CommandFailed {
                command: rendered.to_string(),
                code: None,
            });
        }
        if let Some((_, code)) = self.failures.iter().find(|(p, _)| rendered.contains(p)) {
            return Ok(CommandResult::failure(
                Some(*code),
                String::new(),
                format!("ERROR: simulated failure for {}", rendered),
                Duration::ZERO,
            ));
        }
        Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
    }
}

impl SystemInterrogator for FakeSystem {
    fn command_exists(&mut self, program: &str, _ctx: &ExecutionContext) -> bool {
        self.calls.push(SystemCall::Exists(program.to_string()));
        self.executables.contains_key(program)
    }

    fn run_and_capture_version(
        &mut self,
        program: &str,
        _ctx: &ExecutionContext,
    ) -> Option<String> {
        self.calls.push(SystemCall::Version(program.to_string()));
        match self.executables.get(program) {
            Some(Executable::Runs(output)) => Some(output.clone()),
            Some(Executable::Broken) | None => None,
        }
    }

    fn run_install_command(
        &mut self,
        command: &CommandLine,
        _ctx: &ExecutionContext,
        _stream: bool,
    ) -> Result<CommandResult> {
        let rendered = command.to_string();
        self.calls.push(SystemCall::Install(rendered.clone()));
        let result = self.outcome(&rendered, self.install_output.clone())?;
        if result.success {
            let added: Vec<(String, String)> = self
                .effects
                .iter()
                .filter(|e| rendered.contains(&e.pattern))
                .flat_map(|e| e.adds.iter().cloned())
                .collect();
            for (program, version) in added {
                self.add_executable(&program, &version);
            }
        }
        Ok(result)
    }

    fn run_capture(
        &mut self,
        command: &CommandLine,
        _ctx: &ExecutionContext,
    ) -> Result<CommandResult> {
        let rendered = command.to_string();
        self.calls.push(SystemCall::Capture(rendered.clone()));
        let stdout = self
            .capture_outputs
            .iter()
            .find(|(p, _)| rendered.contains(p))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        self.outcome(&rendered, stdout)
    }
}
