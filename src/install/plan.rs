//! Install steps and dependency specs.

use std::fmt;
use std::str::FromStr;

use crate::config::PlanConfig;
use crate::shell::CommandLine;

use super::hints::interchange_constraint;

/// A package name with an optional exact version pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Package name, including any extras (`gruut[de,es,fr]`).
    pub name: String,
    /// Exact version, if pinned.
    pub pin: Option<String>,
}

impl DependencySpec {
    /// An unpinned dependency.
    pub fn unpinned(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pin: None,
        }
    }

    /// A dependency pinned to an exact version.
    pub fn pinned(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            pin: Some(version.to_string()),
        }
    }

    /// Whether this dependency carries an exact pin.
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Package name without extras.
    pub fn base_name(&self) -> &str {
        self.name
            .split_once('[')
            .map(|(base, _)| base)
            .unwrap_or(&self.name)
    }
}

impl FromStr for DependencySpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty dependency".to_string());
        }
        match s.split_once("==") {
            Some((name, version)) => {
                let (name, version) = (name.trim(), version.trim());
                if name.is_empty() || version.is_empty() || version.contains("==") {
                    return Err(format!("malformed pin '{}'", s));
                }
                Ok(Self::pinned(name, version))
            }
            None => {
                if s.contains(['<', '>', '=', '~', '!', ' ']) {
                    return Err(format!(
                        "'{}' is neither a bare name nor an exact 'name==version' pin",
                        s
                    ));
                }
                Ok(Self::unpinned(s))
            }
        }
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pin {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Which part of the sequence a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Upgrade pip itself.
    InstallerUpgrade,
    /// PyTorch with the Metal backend.
    Accelerated,
    /// The TTS package from source, without its dependencies.
    Primary,
    /// Web-serving and audio helpers.
    Auxiliary,
    /// Exact pins required by the TTS package.
    Pinned,
    /// Tokenizer, without its dependencies.
    Tokenizer,
    /// The interchange-format library.
    Interchange,
}

/// One command in the install sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    /// Human-readable description.
    pub description: String,
    /// Command to run.
    pub command: CommandLine,
    /// Sequence phase.
    pub phase: Phase,
    /// Known runtime constraint reported when the step fails.
    pub constraint: Option<String>,
}

impl InstallStep {
    fn new(description: impl Into<String>, command: CommandLine, phase: Phase) -> Self {
        Self {
            description: description.into(),
            command,
            phase,
            constraint: None,
        }
    }
}

/// `<runtime> -m pip install <args...>`
fn pip_install<I, S>(runtime: &str, args: I) -> CommandLine
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut argv: Vec<String> = vec!["-m".into(), "pip".into(), "install".into()];
    argv.extend(args.into_iter().map(Into::into));
    CommandLine::new(runtime, argv)
}

/// Build the ordered install sequence for `runtime`.
///
/// Any step that installs the interchange library carries its runtime
/// constraint.
pub fn build_steps(plan: &PlanConfig, runtime: &str) -> Vec<InstallStep> {
    let mut steps = vec![
        InstallStep::new(
            "Upgrade pip",
            pip_install(runtime, ["--upgrade", "pip"]),
            Phase::InstallerUpgrade,
        ),
        InstallStep::new(
            format!("Install {} (MPS-enabled build)", plan.accelerated.join(" + ")),
            pip_install(runtime, plan.accelerated.iter().cloned()),
            Phase::Accelerated,
        ),
        InstallStep::new(
            "Install TTS from source (without dependencies)",
            pip_install(runtime, ["--no-deps".to_string(), plan.source_package.clone()]),
            Phase::Primary,
        ),
    ];

    for dep in &plan.auxiliary {
        steps.push(InstallStep::new(
            format!("Install {}", dep),
            pip_install(runtime, [dep.to_string()]),
            Phase::Auxiliary,
        ));
    }

    for dep in &plan.pinned {
        steps.push(InstallStep::new(
            format!("Install {}", dep),
            pip_install(runtime, [dep.to_string()]),
            Phase::Pinned,
        ));
    }

    steps.push(InstallStep::new(
        format!("Install {} (without dependencies)", plan.tokenizer),
        pip_install(runtime, ["--no-deps".to_string(), plan.tokenizer.to_string()]),
        Phase::Tokenizer,
    ));

    steps.push(InstallStep::new(
        format!("Install {}", plan.interchange),
        pip_install(runtime, [plan.interchange.to_string()]),
        Phase::Interchange,
    ));

    let library = plan.interchange.base_name();
    for step in &mut steps {
        let installs_library = step
            .command
            .args
            .iter()
            .skip(3)
            .filter_map(|arg| arg.parse::<DependencySpec>().ok())
            .any(|dep| dep.base_name().eq_ignore_ascii_case(library));
        if installs_library {
            step.constraint = Some(interchange_constraint(&plan.interchange, plan));
        }
    }

    steps
}
