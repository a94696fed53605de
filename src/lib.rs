//! ttsprov - macOS provisioning for a Coqui TTS stack with MPS acceleration.
//!
//! ttsprov checks the host, finds (or installs via Homebrew) a Python in
//! the 3.9 to 3.12 window, optionally creates a virtual environment, and
//! installs the pinned package set one pip command at a time, halting on
//! the first failure with the failing command and a remediation hint.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional YAML plan file and the built-in plan
//! - [`context`] - The execution context threaded through every stage
//! - [`error`] - Error types and result aliases
//! - [`install`] - Install steps, hints and the sequencer
//! - [`isolation`] - Virtual environment decision and creation
//! - [`probe`] - OS, Homebrew and MPS checks
//! - [`runtime`] - Python discovery and the compatibility window
//! - [`shell`] - Process execution
//! - [`system`] - Host interrogation seam and its test fake
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`verify`] - Optional post-install smoke test
//! - [`workflow`] - The end-to-end flow
//!
//! # Example
//!
//! ```
//! use ttsprov::runtime::is_compatible;
//!
//! assert!(is_compatible("Python 3.11.9"));
//! assert!(!is_compatible("Python 3.13.0"));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod install;
pub mod isolation;
pub mod probe;
pub mod runtime;
pub mod shell;
pub mod system;
pub mod ui;
pub mod verify;
pub mod workflow;

pub use error::{ProvisionError, Result};
