//! Runtime candidates and probing.

use std::fmt;

use crate::config::PlanConfig;
use crate::context::ExecutionContext;
use crate::system::SystemInterrogator;

use super::version::{RuntimeVersion, MAX_MINOR, MIN_MINOR, REQUIRED_MAJOR};

/// Directories checked for the preferred runtime, before any search-path
/// lookup. `{v}` is the preferred `major.minor`.
const PREFERRED_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/usr/local/bin",
    "/Library/Frameworks/Python.framework/Versions/{v}/bin",
    "/opt/homebrew/opt/python@{v}/bin",
    "/usr/local/opt/python@{v}/bin",
];

/// Generic names tried last.
const GENERIC_NAMES: &[&str] = &["python3", "python"];

/// A runtime found on the host with a known version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCandidate {
    /// Bare name or absolute path.
    pub identifier: String,
    /// Version reported by `--version`.
    pub version: RuntimeVersion,
}

impl RuntimeCandidate {
    /// Whether this candidate falls in the supported window.
    pub fn is_compatible(&self) -> bool {
        self.version.is_compatible()
    }
}

impl fmt::Display for RuntimeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Python {} ({})", self.version, self.identifier)
    }
}

/// Absolute paths where the preferred runtime is usually installed.
pub fn preferred_paths(plan: &PlanConfig) -> Vec<String> {
    let short = plan.preferred_short();
    let executable = plan.preferred_executable();
    PREFERRED_DIRS
        .iter()
        .map(|dir| format!("{}/{}", dir.replace("{v}", &short), executable))
        .collect()
}

/// Every identifier to try, in priority order.
///
/// Preferred paths first, then the other versioned names from newest to
/// oldest, then the generic names.
pub fn candidate_list(plan: &PlanConfig) -> Vec<String> {
    let mut list = preferred_paths(plan);
    let (_, preferred_minor) = plan.preferred_runtime;
    for minor in (MIN_MINOR..=MAX_MINOR).rev() {
        if minor != preferred_minor {
            list.push(format!("python{}.{}", REQUIRED_MAJOR, minor));
        }
    }
    list.extend(GENERIC_NAMES.iter().map(|s| s.to_string()));
    list
}

/// Probe a single identifier.
///
/// Returns `None` if it does not exist, cannot run, or prints no version.
pub fn probe_candidate(
    system: &mut dyn SystemInterrogator,
    ctx: &ExecutionContext,
    identifier: &str,
) -> Option<RuntimeCandidate> {
    if !system.command_exists(identifier, ctx) {
        return None;
    }
    let output = system.run_and_capture_version(identifier, ctx)?;
    let Some(version) = RuntimeVersion::parse(&output) else {
        tracing::debug!("Could not parse version from {}: {:?}", identifier, output);
        return None;
    };
    tracing::debug!("{} reports Python {}", identifier, version);
    Some(RuntimeCandidate {
        identifier: identifier.to_string(),
        version,
    })
}

/// The first compatible candidate among `identifiers`.
pub fn first_compatible(
    system: &mut dyn SystemInterrogator,
    ctx: &ExecutionContext,
    identifiers: &[String],
) -> Option<RuntimeCandidate> {
    for identifier in identifiers {
        match probe_candidate(system, ctx, identifier) {
            Some(candidate) if candidate.is_compatible() => return Some(candidate),
            Some(candidate) => {
                tracing::debug!("Skipping incompatible {}", candidate);
            }
            None => {}
        }
    }
    None
}
