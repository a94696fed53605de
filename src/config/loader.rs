//! Plan file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{PlanConfig, PlanFile};
use crate::config::validator::resolve;
use crate::error::{ProvisionError, Result};

/// Plan file looked up in the working directory.
pub const PLAN_FILE_NAME: &str = "ttsprov.yml";

/// Find the plan file to load, if any.
///
/// An explicit path must exist. Without one, `ttsprov.yml` in `cwd` is
/// used when present.
pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ProvisionError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidate = cwd.join(PLAN_FILE_NAME);
    Ok(candidate.is_file().then_some(candidate))
}

/// Parse plan YAML. An empty document is an empty plan.
pub fn parse_plan(content: &str, path: &Path) -> Result<PlanConfig> {
    let file: PlanFile = if content.trim().is_empty() {
        PlanFile::default()
    } else {
        serde_yaml::from_str(content).map_err(|e| ProvisionError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    resolve(file).map_err(|errors| ProvisionError::ConfigParseError {
        path: path.to_path_buf(),
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    })
}

/// Load the plan, falling back to the built-in defaults when no file exists.
pub fn load_plan(explicit: Option<&Path>, cwd: &Path) -> Result<PlanConfig> {
    match discover(explicit, cwd)? {
        Some(path) => {
            tracing::debug!("Loading plan from {}", path.display());
            let content = fs::read_to_string(&path)?;
            parse_plan(&content, &path)
        }
        None => {
            tracing::debug!("No {} found; using built-in plan", PLAN_FILE_NAME);
            Ok(PlanConfig::default())
        }
    }
}
