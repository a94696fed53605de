//! Remediation hints for failed install steps.
//!
//! Output patterns are checked first, most specific first; when none
//! matches, the step's phase decides the hint. A step that installs the
//! interchange library always gets its runtime-window constraint.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::PlanConfig;
use crate::runtime::version::{MAX_MINOR, MIN_MINOR, REQUIRED_MAJOR};

use super::plan::{DependencySpec, InstallStep, Phase};

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(
    RE_NO_MATCHING_DIST,
    r"No matching distribution found for (\S+)"
);
lazy_regex!(
    RE_REQUIRES_PYTHON,
    r"Requires-Python ([<>=!~][^ ]*)|requires a different Python"
);
lazy_regex!(RE_EXTERNALLY_MANAGED, r"externally-managed-environment");
lazy_regex!(
    RE_NETWORK,
    r"(?i)connection (refused|reset|timed out)|Temporary failure in name resolution|Could not fetch URL"
);
lazy_regex!(RE_NO_GIT, r"(?i)cannot find command 'git'|git: command not found");
lazy_regex!(RE_BUILD_WHEEL, r"Failed building wheel for (\S+)|Failed to build (\S+)");

/// Constraint hint for the planned interchange library.
pub fn interchange_constraint(spec: &DependencySpec, plan: &PlanConfig) -> String {
    format!(
        "{} requires Python >={}.{},<{}.{}. Recreate the virtual environment with Python {} (brew install {}) and re-run.",
        spec,
        REQUIRED_MAJOR,
        MIN_MINOR,
        REQUIRED_MAJOR,
        MAX_MINOR + 1,
        plan.preferred_short(),
        plan.preferred_formula()
    )
}

/// A known failure signature.
struct OutputPattern {
    regex: &'static LazyLock<Regex>,
    hint: fn(&regex::Captures) -> String,
}

fn output_patterns() -> Vec<OutputPattern> {
    vec![
        OutputPattern {
            regex: &RE_EXTERNALLY_MANAGED,
            hint: |_| {
                "pip refused to modify a system-managed Python. Create the virtual environment and re-run.".to_string()
            },
        },
        OutputPattern {
            regex: &RE_REQUIRES_PYTHON,
            hint: |_| {
                "The package does not support this Python version. Use Python 3.9 to 3.12 (3.11 recommended).".to_string()
            },
        },
        OutputPattern {
            regex: &RE_NO_MATCHING_DIST,
            hint: |caps| {
                let package = caps.get(1).map(|m| m.as_str()).unwrap_or("the package");
                format!(
                    "No wheel of {} matches this Python/platform. Check the Python version and that you are on arm64.",
                    package
                )
            },
        },
        OutputPattern {
            regex: &RE_NO_GIT,
            hint: |_| "git is required to install from source. Install it with `xcode-select --install`.".to_string(),
        },
        OutputPattern {
            regex: &RE_BUILD_WHEEL,
            hint: |caps| {
                let package = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or("a package");
                format!(
                    "Building {} from source failed. Install the Xcode command line tools (`xcode-select --install`) and re-run.",
                    package
                )
            },
        },
        OutputPattern {
            regex: &RE_NETWORK,
            hint: |_| "Network error while downloading. Check connectivity or proxy settings and re-run.".to_string(),
        },
    ]
}

/// Fallback hint by sequence phase.
pub fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::InstallerUpgrade => {
            "Upgrading pip failed. Check that the virtual environment is intact, or recreate it."
        }
        Phase::Accelerated => {
            "Installing PyTorch failed. MPS builds need an arm64 Python 3.9 to 3.12 on macOS 12.3+."
        }
        Phase::Primary => {
            "Installing TTS from source failed. Check that git is installed and GitHub is reachable."
        }
        Phase::Auxiliary => "Installing a helper package failed. Re-run once the cause above is fixed.",
        Phase::Pinned => {
            "A pinned dependency failed to install. Pins target Python 3.11; check the active Python version."
        }
        Phase::Tokenizer => "Installing the tokenizer failed. Re-run once the cause above is fixed.",
        Phase::Interchange => {
            "Installing the interchange library failed. It only supports Python 3.9 to 3.12."
        }
    }
}

/// Hint for a failed step given its captured output.
pub fn hint_for(step: &InstallStep, output: &str) -> String {
    if let Some(constraint) = &step.constraint {
        return constraint.clone();
    }

    for pattern in output_patterns() {
        if let Some(caps) = pattern.regex.captures(output) {
            return (pattern.hint)(&caps);
        }
    }

    phase_hint(step.phase).to_string()
}
