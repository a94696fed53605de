//! Homebrew detection and installation.

use std::path::Path;

use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::shell::CommandLine;
use crate::system::SystemInterrogator;
use crate::ui::{confirm, UserInterface};

/// Package manager executable name.
pub const PACKAGE_MANAGER: &str = "brew";

/// Install prefixes Homebrew uses (Apple Silicon first).
pub const HOMEBREW_PREFIXES: &[&str] = &["/opt/homebrew", "/usr/local"];

/// Official Homebrew install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// The command that installs Homebrew.
///
/// The outer shell performs the command substitution so the inner one
/// receives the whole script as a single argument, as the official
/// one-liner does.
pub fn install_command() -> CommandLine {
    CommandLine::new(
        "/bin/bash",
        [
            "-c".to_string(),
            format!("/bin/bash -c \"$(curl -fsSL {})\"", HOMEBREW_INSTALL_URL),
        ],
    )
}

/// Manual Homebrew install instructions.
pub fn manual_instructions() -> String {
    format!(
        "Install Homebrew manually, then re-run:\n  /bin/bash -c \"$(curl -fsSL {})\"\nSee https://brew.sh for details.",
        HOMEBREW_INSTALL_URL
    )
}

/// Whether Homebrew is available.
///
/// Looks on the search path first, then at the well-known prefixes. A
/// prefix hit that is not yet on the search path is added to it, the
/// same effect as `eval "$(brew shellenv)"`.
pub fn detect_package_manager(
    system: &mut dyn SystemInterrogator,
    ctx: &mut ExecutionContext,
) -> bool {
    if system.command_exists(PACKAGE_MANAGER, ctx) {
        tracing::debug!("Found {} on PATH", PACKAGE_MANAGER);
        return true;
    }

    for prefix in HOMEBREW_PREFIXES {
        let bin = Path::new(prefix).join("bin");
        let brew = bin.join(PACKAGE_MANAGER);
        if system.command_exists(&brew.to_string_lossy(), ctx) {
            tracing::debug!("Found {} at {}", PACKAGE_MANAGER, brew.display());
            if !ctx.has_path(&bin) {
                ctx.prepend_path(bin);
            }
            return true;
        }
    }

    tracing::debug!("{} not found", PACKAGE_MANAGER);
    false
}

/// Make sure Homebrew is available, offering to install it.
///
/// Declining the offer or a failed install is fatal.
pub fn ensure_package_manager(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &mut ExecutionContext,
) -> Result<()> {
    if detect_package_manager(system, ctx) {
        return Ok(());
    }

    ui.warning("Homebrew is not installed.");
    if !confirm(ui, "install_homebrew", "Install Homebrew now?", false)? {
        ui.show_hint(&manual_instructions());
        return Err(ProvisionError::PackageManagerMissing {
            message: "installation declined".to_string(),
        });
    }

    let command = install_command();
    ui.message(&format!("Running: {}", command));
    // The installer asks for sudo and confirmation, so it needs the terminal.
    let result = system.run_install_command(&command, ctx, true)?;
    if !result.success {
        ui.show_error_block(
            &command.to_string(),
            &result.output_tail(20),
            Some(&manual_instructions()),
        );
        return Err(ProvisionError::PackageManagerMissing {
            message: format!("installer exited with {:?}", result.exit_code),
        });
    }

    if !detect_package_manager(system, ctx) {
        ui.show_hint(&manual_instructions());
        return Err(ProvisionError::PackageManagerMissing {
            message: "installer finished but brew was not found".to_string(),
        });
    }

    ui.success("Homebrew installed");
    Ok(())
}
