//! Provisioning plan configuration.
//!
//! The built-in plan installs the TTS stack as documented. An optional
//! `ttsprov.yml` (or the file given with `--config`) can override any of
//! its fields:
//!
//! ```yaml
//! environment_name: .venv
//! preferred_runtime: "3.11"
//! auxiliary: [flask, soundfile]
//! pinned:
//!   - numpy==1.26.4
//! ```
//!
//! # Example
//!
//! ```
//! use ttsprov::config::load_plan;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("ttsprov.yml"), "environment_name: tts").unwrap();
//!
//! let plan = load_plan(None, temp.path()).unwrap();
//! assert_eq!(plan.environment_name, "tts");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{discover, load_plan, parse_plan, PLAN_FILE_NAME};
pub use schema::{PlanConfig, PlanFile, DEFAULT_ENVIRONMENT_NAME, DEFAULT_INTERCHANGE};
pub use validator::{resolve, ValidationError};
