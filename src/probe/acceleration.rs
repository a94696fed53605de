//! Hardware-acceleration (MPS) feasibility check.

use crate::error::{ProvisionError, Result};
use crate::ui::{confirm, UserInterface};

use super::OsInfo;

/// First macOS release with the MPS backend, as (major, minor).
pub const MIN_ACCELERATED_OS: (u32, u32) = (12, 3);

/// Parse a dotted OS version into (major, minor).
///
/// A missing minor reads as 0; an unparseable major yields (0, 0).
pub fn parse_os_version(version: &str) -> (u32, u32) {
    let mut parts = version.trim().split('.');
    let major = parts.next().and_then(|p| p.parse().ok());
    let Some(major) = major else {
        return (0, 0);
    };
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor)
}

/// Whether the OS version supports hardware acceleration.
pub fn check_hardware_acceleration_support(os_version: &str) -> bool {
    let (major, minor) = parse_os_version(os_version);
    let (min_major, min_minor) = MIN_ACCELERATED_OS;
    major > min_major || (major == min_major && minor >= min_minor)
}

/// Check acceleration prerequisites, asking whether to continue if they fail.
///
/// Returns `Ok(true)` when acceleration is expected to work, `Ok(false)`
/// when the user chose to continue without it.
pub fn confirm_hardware_acceleration(ui: &mut dyn UserInterface, os: &OsInfo) -> Result<bool> {
    if !os.is_apple_silicon() {
        ui.warning(&format!(
            "This machine reports architecture '{}'. MPS acceleration targets Apple Silicon; expect CPU-only inference.",
            os.arch
        ));
    }

    if check_hardware_acceleration_support(&os.product_version) {
        ui.success(&format!("{} supports MPS acceleration", os));
        return Ok(true);
    }

    let (min_major, min_minor) = MIN_ACCELERATED_OS;
    ui.warning(&format!(
        "MPS acceleration requires macOS {}.{} or newer; this host reports {}.",
        min_major,
        min_minor,
        if os.product_version.is_empty() {
            "an unknown version"
        } else {
            os.product_version.as_str()
        }
    ));

    if confirm(
        ui,
        "continue_without_mps",
        "Continue without hardware acceleration?",
        false,
    )? {
        tracing::info!("Continuing without MPS acceleration");
        Ok(false)
    } else {
        Err(ProvisionError::PreconditionDeclined {
            message: format!(
                "macOS {}.{}+ is required for MPS acceleration. Update macOS and re-run.",
                min_major, min_minor
            ),
        })
    }
}
