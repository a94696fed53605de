//! Isolation states and the user choices that move between them.

use std::fmt;
use std::str::FromStr;

use crate::context::ExecutionContext;
use crate::runtime::RuntimeVersion;

/// Where the run stands with respect to an isolated environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationState {
    /// No virtual or conda environment is active.
    NotIsolated,
    /// An environment is active but its runtime is too new.
    IsolatedIncompatible,
    /// An environment with a compatible runtime is active.
    IsolatedCompatible,
    /// An environment must be created (`clear` rebuilds an existing one).
    NeedsCreation { clear: bool },
    /// Proceed without isolation.
    UnisolatedContinue,
    /// Proceed inside the incompatible environment.
    IncompatibleContinue,
    /// The user stopped the run.
    Aborted,
}

impl IsolationState {
    /// Whether the installation sequence may start from this state.
    pub fn proceeds(&self) -> bool {
        matches!(
            self,
            Self::IsolatedCompatible | Self::UnisolatedContinue | Self::IncompatibleContinue
        )
    }
}

/// A decision at one of the isolation menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChoice {
    Create,
    Skip,
    Recreate,
    ContinueAnyway,
    Abort,
}

impl SessionChoice {
    /// Menu value for this choice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Skip => "skip",
            Self::Recreate => "recreate",
            Self::ContinueAnyway => "continue",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for SessionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "skip" => Ok(Self::Skip),
            "recreate" => Ok(Self::Recreate),
            "continue" => Ok(Self::ContinueAnyway),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown choice: {}", other)),
        }
    }
}

/// Classify the starting state from the context and the active runtime.
///
/// An active runtime whose version could not be read counts as compatible.
pub fn classify(ctx: &ExecutionContext, active_version: Option<RuntimeVersion>) -> IsolationState {
    if !ctx.is_isolated() {
        return IsolationState::NotIsolated;
    }
    match active_version {
        Some(v) if v.is_too_new() => IsolationState::IsolatedIncompatible,
        _ => IsolationState::IsolatedCompatible,
    }
}

/// Apply a menu choice to a state.
///
/// Choices that do not belong to the state's menu leave it unchanged.
pub fn transition(state: IsolationState, choice: SessionChoice) -> IsolationState {
    use IsolationState as S;
    use SessionChoice as C;

    match (state, choice) {
        (S::NotIsolated, C::Create) => S::NeedsCreation { clear: false },
        (S::NotIsolated, C::Skip) => S::UnisolatedContinue,
        (S::IsolatedIncompatible, C::Recreate) => S::NeedsCreation { clear: true },
        (S::IsolatedIncompatible, C::ContinueAnyway) => S::IncompatibleContinue,
        (S::NotIsolated | S::IsolatedIncompatible, C::Abort) => S::Aborted,
        (state, _) => state,
    }
}
