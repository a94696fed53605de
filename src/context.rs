//! Execution context threaded through every provisioning stage.
//!
//! The context owns everything a stage may read from or change in the
//! "current environment": the search path, the isolation markers, and the
//! runtime that later commands should use. Spawned commands receive the
//! context's view through [`ExecutionContext::command_options`]; the parent
//! process environment is never mutated.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::shell::{default_os_marker, split_search_path, CommandOptions};

/// Primary isolation marker (set by `venv`/`virtualenv` activation).
pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// Secondary isolation marker (set by conda activation).
pub const CONDA_DEFAULT_ENV: &str = "CONDA_DEFAULT_ENV";

/// OS-type marker.
pub const OSTYPE: &str = "OSTYPE";

/// Variables the context snapshots and may override for child processes.
const TRACKED_VARS: &[&str] = &[VIRTUAL_ENV, CONDA_DEFAULT_ENV, OSTYPE];

/// Explicit, mutable provisioning environment.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    runtime: Option<PathBuf>,
    isolated: bool,
    env_dir: Option<PathBuf>,
    search_path: Vec<PathBuf>,
    vars: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Snapshot the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a context from a custom variable lookup.
    ///
    /// This allows testing without modifying actual environment variables.
    /// A missing `OSTYPE` falls back to [`default_os_marker`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut vars = BTreeMap::new();
        for key in TRACKED_VARS {
            if let Some(value) = lookup(key) {
                vars.insert((*key).to_string(), value);
            }
        }
        vars.entry(OSTYPE.to_string())
            .or_insert_with(default_os_marker);

        let search_path = lookup("PATH")
            .map(|p| split_search_path(&p))
            .unwrap_or_default();

        let mut ctx = Self {
            search_path,
            vars,
            ..Default::default()
        };
        ctx.isolated = ctx.markers_present();
        if ctx.isolated {
            ctx.env_dir = ctx.var(VIRTUAL_ENV).map(PathBuf::from);
        }
        ctx
    }

    /// Build a context from explicit pairs (tests and embedding).
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Look up a tracked variable; empty values read as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The OS-type marker.
    pub fn os_marker(&self) -> &str {
        self.var(OSTYPE).unwrap_or_default()
    }

    /// True iff either isolation marker is non-empty.
    pub fn markers_present(&self) -> bool {
        self.var(VIRTUAL_ENV).is_some() || self.var(CONDA_DEFAULT_ENV).is_some()
    }

    /// Whether execution is inside an isolated environment.
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Directory of the active virtual environment, if known.
    pub fn env_dir(&self) -> Option<&Path> {
        self.env_dir.as_deref()
    }

    /// The runtime later stages should invoke.
    pub fn runtime(&self) -> Option<&Path> {
        self.runtime.as_deref()
    }

    /// The runtime as a program string, defaulting to `python3`.
    pub fn runtime_program(&self) -> String {
        self.runtime
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "python3".to_string())
    }

    /// Set the runtime later stages should invoke.
    pub fn set_runtime(&mut self, runtime: impl Into<PathBuf>) {
        self.runtime = Some(runtime.into());
    }

    /// Current search path, highest priority first.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Put a directory at the front of the search path.
    ///
    /// An existing entry for the same directory is moved rather than duplicated.
    pub fn prepend_path(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.search_path.retain(|p| *p != dir);
        self.search_path.insert(0, dir);
    }

    /// Whether a directory is on the search path.
    pub fn has_path(&self, dir: &Path) -> bool {
        self.search_path.iter().any(|p| p == dir)
    }

    /// Activate a virtual environment for all later commands.
    pub fn activate(&mut self, env_dir: &Path) {
        let bin = env_dir.join("bin");
        self.prepend_path(&bin);
        self.vars.insert(
            VIRTUAL_ENV.to_string(),
            env_dir.to_string_lossy().into_owned(),
        );
        self.vars.remove(CONDA_DEFAULT_ENV);
        self.runtime = Some(bin.join("python"));
        self.env_dir = Some(env_dir.to_path_buf());
        self.isolated = true;
        tracing::debug!("Activated environment at {}", env_dir.display());
    }

    /// Drop the active environment from the context.
    pub fn deactivate(&mut self) {
        if let Some(dir) = self.env_dir.take() {
            let bin = dir.join("bin");
            self.search_path.retain(|p| *p != bin);
        }
        self.vars.remove(VIRTUAL_ENV);
        self.vars.remove(CONDA_DEFAULT_ENV);
        self.isolated = false;
        tracing::debug!("Deactivated environment");
    }

    /// The context's search path joined for a child's `PATH`.
    pub fn joined_path(&self) -> Option<OsString> {
        std::env::join_paths(&self.search_path).ok()
    }

    /// Command options reflecting this context.
    pub fn command_options(&self, capture: bool) -> CommandOptions {
        let mut options = CommandOptions {
            path: self.joined_path(),
            capture_stdout: capture,
            capture_stderr: capture,
            ..Default::default()
        };
        for key in [VIRTUAL_ENV, CONDA_DEFAULT_ENV] {
            match self.var(key) {
                Some(value) => {
                    options.env.insert(key.to_string(), value.to_string());
                }
                None => options.env_remove.push(key.to_string()),
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_markers_are_not_isolated() {
        let ctx = ExecutionContext::from_pairs([(VIRTUAL_ENV, ""), (CONDA_DEFAULT_ENV, "")]);
        assert!(!ctx.is_isolated());
    }

    #[test]
    fn either_marker_counts_as_isolated() {
        let venv = ExecutionContext::from_pairs([(VIRTUAL_ENV, "/tmp/venv")]);
        assert!(venv.is_isolated());
        assert_eq!(venv.env_dir(), Some(Path::new("/tmp/venv")));

        let conda = ExecutionContext::from_pairs([(CONDA_DEFAULT_ENV, "base")]);
        assert!(conda.is_isolated());
        assert_eq!(conda.env_dir(), None);
    }

    #[test]
    fn missing_ostype_uses_default_marker() {
        let ctx = ExecutionContext::from_lookup(|_| None);
        assert_eq!(ctx.os_marker(), default_os_marker());
    }

    #[test]
    fn explicit_ostype_is_kept() {
        let ctx = ExecutionContext::from_pairs([(OSTYPE, "darwin23")]);
        assert_eq!(ctx.os_marker(), "darwin23");
    }

    #[test]
    fn prepend_path_moves_existing_entry() {
        let mut ctx = ExecutionContext::from_pairs([("PATH", "/usr/bin:/opt/homebrew/bin")]);
        ctx.prepend_path("/opt/homebrew/bin");
        assert_eq!(
            ctx.search_path(),
            &[PathBuf::from("/opt/homebrew/bin"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn activate_sets_runtime_path_and_marker() {
        let mut ctx = ExecutionContext::from_pairs([("PATH", "/usr/bin"), (CONDA_DEFAULT_ENV, "base")]);
        ctx.activate(Path::new("/work/venv"));

        assert!(ctx.is_isolated());
        assert_eq!(ctx.runtime(), Some(Path::new("/work/venv/bin/python")));
        assert_eq!(ctx.search_path()[0], PathBuf::from("/work/venv/bin"));
        assert_eq!(ctx.var(VIRTUAL_ENV), Some("/work/venv"));
        assert_eq!(ctx.var(CONDA_DEFAULT_ENV), None);
    }

    #[test]
    fn deactivate_removes_env_bin() {
        let mut ctx = ExecutionContext::from_pairs([("PATH", "/usr/bin")]);
        ctx.activate(Path::new("/work/venv"));
        ctx.deactivate();

        assert!(!ctx.is_isolated());
        assert!(!ctx.has_path(Path::new("/work/venv/bin")));
        assert_eq!(ctx.var(VIRTUAL_ENV), None);
    }

    #[test]
    fn command_options_export_markers() {
        let mut ctx = ExecutionContext::from_pairs([("PATH", "/usr/bin")]);
        ctx.activate(Path::new("/work/venv"));
        let options = ctx.command_options(true);

        assert_eq!(options.env.get(VIRTUAL_ENV).map(String::as_str), Some("/work/venv"));
        assert!(options.env_remove.contains(&CONDA_DEFAULT_ENV.to_string()));
        assert!(options.capture_stdout);
        assert!(options.path.is_some());
    }

    #[test]
    fn runtime_program_defaults_to_python3() {
        let ctx = ExecutionContext::default();
        assert_eq!(ctx.runtime_program(), "python3");
    }
}
