//! Runtime version parsing and the compatibility window.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Required major version.
pub const REQUIRED_MAJOR: u32 = 3;

/// Lowest supported minor version (inclusive).
pub const MIN_MINOR: u32 = 9;

/// Highest supported minor version (inclusive).
pub const MAX_MINOR: u32 = 12;

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

/// A `major.minor.patch` runtime version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    /// Create a version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first `major.minor.patch` triple from arbitrary text,
    /// such as the output of `python3 --version`.
    ///
    /// Returns `None` when no complete triple is present.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = VERSION_REGEX.captures(text)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = caps.get(3)?.as_str().parse().ok()?;
        Some(Self::new(major, minor, patch))
    }

    /// Whether this version falls in the supported window.
    pub fn is_compatible(&self) -> bool {
        self.major == REQUIRED_MAJOR && (MIN_MINOR..=MAX_MINOR).contains(&self.minor)
    }

    /// Whether this version is at or past the first unsupported release.
    pub fn is_too_new(&self) -> bool {
        (self.major, self.minor) > (REQUIRED_MAJOR, MAX_MINOR)
    }

    /// `major.minor` for display.
    pub fn short(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether a version string names a compatible runtime.
///
/// Malformed strings are incompatible rather than errors.
pub fn is_compatible(text: &str) -> bool {
    RuntimeVersion::parse(text).is_some_and(|v| v.is_compatible())
}

/// Human-readable description of the supported window.
pub fn supported_range() -> String {
    format!(
        "{}.{} to {}.{}",
        REQUIRED_MAJOR, MIN_MINOR, REQUIRED_MAJOR, MAX_MINOR
    )
}
