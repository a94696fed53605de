//! Environment prober.
//!
//! Answers the host questions asked before anything is installed:
//!
//! - [`os`] - is this macOS, and which release/architecture
//! - [`package_manager`] - is Homebrew available (and installing it)
//! - [`acceleration`] - can this release run the MPS backend

pub mod acceleration;
pub mod os;
pub mod package_manager;

pub use acceleration::{
    check_hardware_acceleration_support, confirm_hardware_acceleration, parse_os_version,
    MIN_ACCELERATED_OS,
};
pub use os::{detect_os, OsInfo, TARGET_OS_PREFIX};
pub use package_manager::{detect_package_manager, ensure_package_manager, PACKAGE_MANAGER};
