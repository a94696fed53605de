//! Compatible runtime resolution with Homebrew remediation.

use crate::config::PlanConfig;
use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::probe::{detect_package_manager, ensure_package_manager, PACKAGE_MANAGER};
use crate::shell::CommandLine;
use crate::system::SystemInterrogator;
use crate::ui::{confirm, UserInterface};

use super::candidates::{candidate_list, first_compatible, preferred_paths, RuntimeCandidate};
use super::version::supported_range;

/// Manual runtime install instructions.
pub fn manual_instructions(plan: &PlanConfig) -> String {
    format!(
        "Install Python {} and re-run:\n  brew install {}\nor download an installer from https://www.python.org/downloads/macos/",
        plan.preferred_short(),
        plan.preferred_formula()
    )
}

/// Find a compatible runtime, offering to install the preferred version.
///
/// The returned candidate is always inside the supported window. Its
/// identifier becomes the context's runtime.
pub fn find_compatible_runtime(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &mut ExecutionContext,
    plan: &PlanConfig,
) -> Result<RuntimeCandidate> {
    if let Some(found) = first_compatible(system, ctx, &candidate_list(plan)) {
        ui.success(&format!("Found {}", found));
        ctx.set_runtime(&found.identifier);
        return Ok(found);
    }

    ui.warning(&format!(
        "No Python {} found. Python 3.13+ is not supported by the pinned packages.",
        supported_range()
    ));

    let question = format!("Install Python {} via Homebrew?", plan.preferred_short());
    if !confirm(ui, "install_runtime", &question, false)? {
        ui.show_hint(&manual_instructions(plan));
        return Err(ProvisionError::RuntimeUnresolved {
            message: "automatic installation declined".to_string(),
        });
    }

    if !detect_package_manager(system, ctx) {
        ensure_package_manager(system, ui, ctx)?;
    }

    let command = CommandLine::new(PACKAGE_MANAGER, ["install".to_string(), plan.preferred_formula()]);
    let mut spinner = ui.start_spinner(&format!("Installing {}", plan.preferred_formula()));
    let stream = ui.output_mode().streams_installer_output();
    let result = match system.run_install_command(&command, ctx, stream) {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_error(&format!("{} could not be started", command));
            return Err(ProvisionError::RuntimeUnresolved {
                message: e.to_string(),
            });
        }
    };
    if !result.success {
        spinner.finish_error(&format!("{} failed", command));
        ui.show_error_block(
            &command.to_string(),
            &result.output_tail(20),
            Some(&manual_instructions(plan)),
        );
        return Err(ProvisionError::RuntimeUnresolved {
            message: format!("`{}` exited with {:?}", command, result.exit_code),
        });
    }
    spinner.finish_success(&format!("Installed {}", plan.preferred_formula()));

    match first_compatible(system, ctx, &preferred_paths(plan)) {
        Some(found) => {
            ui.success(&format!("Using {}", found));
            ctx.set_runtime(&found.identifier);
            Ok(found)
        }
        None => {
            ui.show_hint(&manual_instructions(plan));
            Err(ProvisionError::RuntimeUnresolved {
                message: format!(
                    "{} installed but python{} was not found at the expected locations",
                    plan.preferred_formula(),
                    plan.preferred_short()
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::version::RuntimeVersion;
    use crate::system::FakeSystem;
    use crate::ui::MockUI;
    use std::path::Path;

    const BREW_PYTHON: &str = "/opt/homebrew/bin/python3.11";

    #[test]
    fn existing_runtime_needs_no_prompt() {
        let mut system = FakeSystem::new();
        system.add_executable("python3", "Python 3.10.12");
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::default();

        let found =
            find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
                .unwrap();

        assert_eq!(found.version, RuntimeVersion::new(3, 10, 12));
        assert_eq!(ctx.runtime(), Some(Path::new("python3")));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn never_returns_incompatible_runtime() {
        let mut system = FakeSystem::new();
        system.add_executable("python3", "Python 3.13.1");
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::default();

        let err = find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
            .unwrap_err();

        assert!(matches!(err, ProvisionError::RuntimeUnresolved { .. }));
        assert!(ui.has_hint("brew install python@3.11"));
        assert!(ctx.runtime().is_none());
    }

    #[test]
    fn installs_preferred_runtime_with_existing_brew() {
        let mut system = FakeSystem::new();
        system.add_executable("brew", "Homebrew 4.2.0");
        system.on_install("install python@3.11", BREW_PYTHON, "Python 3.11.9");
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "yes");
        let mut ctx = ExecutionContext::default();

        let found =
            find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
                .unwrap();

        assert_eq!(found.identifier, BREW_PYTHON);
        assert_eq!(system.installs(), vec!["brew install python@3.11"]);
        assert!(!ui.was_prompted("install_homebrew"));
    }

    #[test]
    fn installs_brew_then_runtime() {
        let mut system = FakeSystem::new();
        system.on_install("Homebrew/install", "/opt/homebrew/bin/brew", "Homebrew 4.2.0");
        system.on_install("install python@3.11", BREW_PYTHON, "Python 3.11.9");
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "yes");
        ui.set_prompt_response("install_homebrew", "yes");
        let mut ctx = ExecutionContext::default();

        find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default()).unwrap();

        let installs = system.installs();
        assert_eq!(installs.len(), 2);
        assert!(installs[0].contains("Homebrew/install"));
        assert_eq!(installs[1], "brew install python@3.11");
        assert!(ctx.has_path(Path::new("/opt/homebrew/bin")));
    }

    #[test]
    fn declining_brew_is_package_manager_missing() {
        let mut system = FakeSystem::new();
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "yes");
        let mut ctx = ExecutionContext::default();

        let err = find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
            .unwrap_err();

        assert!(matches!(err, ProvisionError::PackageManagerMissing { .. }));
        assert!(system.installs().is_empty());
    }

    #[test]
    fn failed_runtime_install_is_unresolved() {
        let mut system = FakeSystem::new();
        system.add_executable("brew", "Homebrew 4.2.0");
        system.fail_when("python@3.11", 1);
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "yes");
        let mut ctx = ExecutionContext::default();

        let err = find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
            .unwrap_err();

        assert!(matches!(err, ProvisionError::RuntimeUnresolved { .. }));
        assert_eq!(ui.error_blocks().len(), 1);
    }

    #[test]
    fn reprobe_only_checks_preferred_paths() {
        let mut system = FakeSystem::new();
        system.add_executable("brew", "Homebrew 4.2.0");
        // The install "succeeds" but only a generic name appears.
        system.on_install("install python@3.11", "python3", "Python 3.11.9");
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_runtime", "yes");
        let mut ctx = ExecutionContext::default();

        let err = find_compatible_runtime(&mut system, &mut ui, &mut ctx, &PlanConfig::default())
            .unwrap_err();

        assert!(matches!(err, ProvisionError::RuntimeUnresolved { .. }));
    }
}
