//! Host OS detection.

use std::fmt;

use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::shell::{host_arch, CommandLine};
use crate::system::SystemInterrogator;

/// OS-type marker prefix of the supported OS family.
pub const TARGET_OS_PREFIX: &str = "darwin";

/// Architecture with a native Metal-backed accelerator.
pub const ACCELERATED_ARCH: &str = "aarch64";

/// Facts about the host OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    /// The OS-type marker (e.g. `darwin23`).
    pub marker: String,
    /// Product version reported by `sw_vers` (empty if unknown).
    pub product_version: String,
    /// CPU architecture of the running binary.
    pub arch: String,
}

impl OsInfo {
    /// Whether the host runs on Apple Silicon.
    pub fn is_apple_silicon(&self) -> bool {
        self.arch == ACCELERATED_ARCH
    }
}

impl fmt::Display for OsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.product_version.is_empty() {
            write!(f, "macOS (unknown version, {})", self.arch)
        } else {
            write!(f, "macOS {} ({})", self.product_version, self.arch)
        }
    }
}

/// Detect the host OS, failing unless it is macOS.
///
/// The marker is checked before anything is executed, so an unsupported
/// host never reaches a command spawn.
pub fn detect_os(system: &mut dyn SystemInterrogator, ctx: &ExecutionContext) -> Result<OsInfo> {
    let marker = ctx.os_marker().to_string();
    if !marker.starts_with(TARGET_OS_PREFIX) {
        tracing::debug!("Rejecting OS marker '{}'", marker);
        return Err(ProvisionError::UnsupportedHost { marker });
    }

    let product_version = query_product_version(system, ctx).unwrap_or_default();
    let info = OsInfo {
        marker,
        product_version,
        arch: host_arch().to_string(),
    };
    tracing::info!("Host: {}", info);
    Ok(info)
}

/// Read the macOS product version via `sw_vers -productVersion`.
fn query_product_version(
    system: &mut dyn SystemInterrogator,
    ctx: &ExecutionContext,
) -> Option<String> {
    let command = CommandLine::new("sw_vers", ["-productVersion"]);
    match system.run_capture(&command, ctx) {
        Ok(result) if result.success => {
            let version = result.stdout.trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        Ok(result) => {
            tracing::warn!("sw_vers exited with {:?}", result.exit_code);
            None
        }
        Err(e) => {
            tracing::warn!("Could not run sw_vers: {}", e);
            None
        }
    }
}
