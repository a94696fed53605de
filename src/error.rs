//! Error types for provisioning.
//!
//! This module defines [`ProvisionError`], the error type every stage
//! returns, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each fatal condition has its own variant carrying remediation text
//! - [`ProvisionError::Aborted`] is a user choice, not a failure, and maps to exit code 0
//! - Use `anyhow::Error` (via `ProvisionError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The host is not the targeted OS family.
    #[error("Unsupported host: OS type '{marker}' is not macOS (expected 'darwin*')")]
    UnsupportedHost { marker: String },

    /// No compatible runtime was found and remediation was declined or failed.
    #[error("No compatible Python found: {message}")]
    RuntimeUnresolved { message: String },

    /// Homebrew is required but missing and was not installed.
    #[error("Homebrew is required: {message}")]
    PackageManagerMissing { message: String },

    /// The user declined to continue past a failed precondition.
    #[error("Precondition not met: {message}")]
    PreconditionDeclined { message: String },

    /// The isolated environment could not be created.
    #[error("Failed to create virtual environment '{name}': {message}")]
    EnvironmentCreation { name: String, message: String },

    /// An installation step exited non-zero.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// A command could not be spawned at all.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Explicit plan file does not exist.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Plan file could not be parsed or validated.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The user chose to stop at a non-fatal branch point.
    #[error("Aborted by user")]
    Aborted,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProvisionError {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Aborted => 0,
            _ => 1,
        }
    }

    /// Whether this outcome is a graceful user abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
