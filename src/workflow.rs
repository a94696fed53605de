//! End-to-end provisioning flow.
//!
//! Stages run strictly in order: host check, Homebrew detection, runtime
//! resolution, isolation, MPS check, install sequence, smoke test. The
//! OS gate runs before anything else touches the host.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::config::PlanConfig;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::install::{build_steps, run_sequence};
use crate::isolation::{manage_isolation, IsolationState};
use crate::probe::{confirm_hardware_acceleration, detect_os, detect_package_manager};
use crate::runtime::find_compatible_runtime;
use crate::system::SystemInterrogator;
use crate::ui::{RunSummary, StageStatus, UserInterface};
use crate::verify::{run_verifier, VerifyOutcome};

/// Run the full provisioning flow.
///
/// `cwd` is where the virtual environment is created. The summary is
/// shown and returned on success; any fatal stage returns its error
/// immediately.
pub fn provision(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &mut ExecutionContext,
    plan: &PlanConfig,
    cwd: &Path,
) -> Result<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    ui.show_header("TTS environment setup for macOS");

    let os = detect_os(system, ctx)?;
    summary.record("Host", StageStatus::Done, Some(os.to_string()));

    if detect_package_manager(system, ctx) {
        summary.record("Homebrew", StageStatus::Done, None);
    } else {
        ui.message("Homebrew not found; it is only needed if Python has to be installed.");
        summary.record("Homebrew", StageStatus::Skipped, Some("not installed".into()));
    }

    let runtime = find_compatible_runtime(system, ui, ctx, plan)?;
    info!("Resolved {}", runtime);
    summary.record("Python", StageStatus::Done, Some(runtime.to_string()));

    let env_dir = cwd.join(&plan.environment_name);
    let isolation = manage_isolation(system, ui, ctx, &runtime, &env_dir)?;
    let (status, detail) = match isolation.state {
        IsolationState::UnisolatedContinue => (StageStatus::Skipped, "not used".to_string()),
        IsolationState::IncompatibleContinue => (
            StageStatus::Warned,
            "active environment uses an unsupported Python".to_string(),
        ),
        _ => (
            StageStatus::Done,
            ctx.env_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "active".to_string()),
        ),
    };
    summary.record("Virtual environment", status, Some(detail));

    if confirm_hardware_acceleration(ui, &os)? {
        summary.record("MPS", StageStatus::Done, None);
    } else {
        summary.record("MPS", StageStatus::Warned, Some("macOS too old".into()));
    }

    let steps = build_steps(plan, &ctx.runtime_program());
    ui.show_header("Installing packages");
    let completed = run_sequence(system, ui, ctx, &steps)?;
    summary.record(
        "Packages",
        StageStatus::Done,
        Some(format!("{} steps", completed)),
    );

    match run_verifier(system, ui, ctx) {
        VerifyOutcome::Skipped => summary.record("Smoke test", StageStatus::Skipped, None),
        VerifyOutcome::Passed => summary.record("Smoke test", StageStatus::Done, None),
        VerifyOutcome::Failed(reason) => {
            summary.record("Smoke test", StageStatus::Warned, Some(reason))
        }
    }

    summary.total_duration = start.elapsed();
    ui.show_summary(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::isolation::NOT_ISOLATED_MENU;
    use crate::system::FakeSystem;
    use crate::ui::MockUI;

    const CWD: &str = "/work";
    const ENV_PYTHON: &str = "/work/venv/bin/python";

    fn provisioned_host() -> FakeSystem {
        let mut system = FakeSystem::new();
        system.set_capture_output("sw_vers", "14.4.1\n");
        system.add_executable("brew", "Homebrew 4.2.0");
        system.add_executable("python3", "Python 3.11.9");
        system.on_install("-m venv", ENV_PYTHON, "Python 3.11.9");
        system
    }

    fn mac_ctx() -> ExecutionContext {
        ExecutionContext::from_pairs([("OSTYPE", "darwin23"), ("PATH", "/usr/bin")])
    }

    fn run(system: &mut FakeSystem, ui: &mut MockUI, ctx: &mut ExecutionContext) -> Result<RunSummary> {
        provision(system, ui, ctx, &PlanConfig::default(), Path::new(CWD))
    }

    #[test]
    fn full_flow_installs_into_new_environment() {
        let mut system = provisioned_host();
        let mut ui = MockUI::new();
        let mut ctx = mac_ctx();

        let summary = run(&mut system, &mut ui, &mut ctx).unwrap();

        assert_eq!(summary.status_of("Packages"), Some(StageStatus::Done));
        let installs = system.installs();
        assert_eq!(installs[0], "python3 -m venv /work/venv");
        assert!(installs[1..]
            .iter()
            .all(|c| c.starts_with("/work/venv/bin/python -m pip install")));
        assert!(installs.last().unwrap().ends_with("onnx==1.16.2"));
        assert_eq!(ui.summaries().len(), 1);
    }

    #[test]
    fn second_run_in_provisioned_environment_succeeds() {
        let mut system = provisioned_host();
        let mut ui = MockUI::new();
        run(&mut system, &mut ui, &mut mac_ctx()).unwrap();

        let mut ctx = ExecutionContext::from_pairs([
            ("OSTYPE", "darwin23"),
            ("PATH", "/work/venv/bin:/usr/bin"),
            ("VIRTUAL_ENV", "/work/venv"),
        ]);
        system.clear_calls();
        let summary = run(&mut system, &mut ui, &mut ctx).unwrap();

        assert_eq!(summary.status_of("Virtual environment"), Some(StageStatus::Done));
        assert!(!system.installed("-m venv"));
        assert!(system.installed("onnx==1.16.2"));
    }

    #[test]
    fn non_darwin_host_fails_before_probing() {
        let mut system = provisioned_host();
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::from_pairs([("OSTYPE", "linux-gnu")]);

        let err = run(&mut system, &mut ui, &mut ctx).unwrap_err();

        assert!(matches!(err, ProvisionError::UnsupportedHost { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(system.calls().is_empty());
    }

    #[test]
    fn skip_goes_straight_to_acceleration_check() {
        let mut system = provisioned_host();
        system.set_capture_output("sw_vers", "11.6\n");
        let mut ui = MockUI::new();
        ui.set_prompt_response(NOT_ISOLATED_MENU, "skip");
        ui.set_prompt_response("continue_without_mps", "yes");
        let mut ctx = mac_ctx();

        let summary = run(&mut system, &mut ui, &mut ctx).unwrap();

        assert_eq!(
            ui.prompts_shown(),
            &[NOT_ISOLATED_MENU, "continue_without_mps", "smoke_test"]
        );
        assert!(ui.has_warning("this host reports 11.6"));
        assert_eq!(summary.status_of("MPS"), Some(StageStatus::Warned));
        assert!(!system.installed("-m venv"));
        assert!(system.installs()[0].starts_with("python3 -m pip install"));
    }

    #[test]
    fn declined_acceleration_stops_before_installing() {
        let mut system = provisioned_host();
        system.set_capture_output("sw_vers", "12.2\n");
        let mut ui = MockUI::new();
        ui.set_prompt_response(NOT_ISOLATED_MENU, "skip");
        let mut ctx = mac_ctx();

        let err = run(&mut system, &mut ui, &mut ctx).unwrap_err();

        assert!(matches!(err, ProvisionError::PreconditionDeclined { .. }));
        assert!(ui.was_prompted("continue_without_mps"));
        assert!(!system.installed("pip install"));
    }

    #[test]
    fn failing_step_halts_flow() {
        let mut system = provisioned_host();
        system.fail_when("TTS.git", 1);
        let mut ui = MockUI::new();
        let mut ctx = mac_ctx();

        let err = run(&mut system, &mut ui, &mut ctx).unwrap_err();

        assert!(matches!(err, ProvisionError::StepFailed { .. }));
        // venv, pip upgrade, torch, then the failing source install
        assert_eq!(system.installs().len(), 4);
        assert!(!ui.was_prompted("smoke_test"));
        assert!(ui.summaries().is_empty());
    }

    #[test]
    fn abort_at_menu_is_graceful() {
        let mut system = provisioned_host();
        let mut ui = MockUI::new();
        ui.set_prompt_response(NOT_ISOLATED_MENU, "abort");
        let mut ctx = mac_ctx();

        let err = run(&mut system, &mut ui, &mut ctx).unwrap_err();

        assert!(err.is_abort());
        assert!(system.installs().is_empty());
    }
}
