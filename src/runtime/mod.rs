//! Runtime resolver.
//!
//! Finds a Python in the supported window ([`version`]), probing
//! well-known locations before generic names ([`candidates`]), and falls
//! back to installing the preferred version with Homebrew ([`resolver`]).

pub mod candidates;
pub mod resolver;
pub mod version;

pub use candidates::{candidate_list, first_compatible, probe_candidate, RuntimeCandidate};
pub use resolver::find_compatible_runtime;
pub use version::{is_compatible, supported_range, RuntimeVersion};
