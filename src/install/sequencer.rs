//! Sequential execution of install steps.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::system::SystemInterrogator;
use crate::ui::{format_duration, UserInterface};

use super::hints::hint_for;
use super::plan::InstallStep;

/// Lines of captured output shown for a failed step.
const OUTPUT_TAIL_LINES: usize = 25;

/// Run a single install step.
///
/// A non-zero exit or a spawn failure shows the command, the tail of its
/// output and a hint, then returns [`ProvisionError::StepFailed`].
pub fn run_step(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &ExecutionContext,
    step: &InstallStep,
) -> Result<()> {
    let stream = ui.output_mode().streams_installer_output();
    let rendered = step.command.to_string();
    debug!("Running `{}`", rendered);

    let mut spinner = ui.start_spinner(&step.description);
    let start = Instant::now();
    let outcome = system.run_install_command(&step.command, ctx, stream);
    let elapsed = format_duration(start.elapsed());

    let (output, message) = match outcome {
        Ok(result) if result.success => {
            spinner.finish_success(&format!("{} ({})", step.description, elapsed));
            return Ok(());
        }
        Ok(result) => {
            let message = match result.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            };
            (result.output_tail(OUTPUT_TAIL_LINES), message)
        }
        Err(e) => (e.to_string(), "could not be started".to_string()),
    };

    spinner.finish_error(&format!("{} failed ({})", step.description, elapsed));
    warn!("Step '{}' {}", step.description, message);

    let hint = hint_for(step, &output);
    let shown_output = if stream && output.is_empty() {
        "(output shown above)".to_string()
    } else {
        output
    };
    ui.show_error_block(&rendered, &shown_output, Some(&hint));

    Err(ProvisionError::StepFailed {
        step: step.description.clone(),
        message: format!("`{}` {}", rendered, message),
    })
}

/// Run every step in order, stopping at the first failure.
///
/// Returns the number of steps completed.
pub fn run_sequence(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &ExecutionContext,
    steps: &[InstallStep],
) -> Result<usize> {
    let total = steps.len();
    info!("Running {} install steps with {}", total, ctx.runtime_program());

    for (index, step) in steps.iter().enumerate() {
        ui.show_progress(index + 1, total);
        run_step(system, ui, ctx, step)?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::install::plan::{build_steps, DependencySpec};
    use crate::system::FakeSystem;
    use crate::ui::{MockUI, OutputMode};

    fn steps() -> Vec<InstallStep> {
        build_steps(&PlanConfig::default(), "venv/bin/python")
    }

    #[test]
    fn runs_every_step_in_order() {
        let mut system = FakeSystem::new();
        let mut ui = MockUI::new();
        let ctx = ExecutionContext::default();
        let steps = steps();

        let done = run_sequence(&mut system, &mut ui, &ctx, &steps).unwrap();

        assert_eq!(done, steps.len());
        assert!(ui.step_results().iter().all(|(ok, _)| *ok));
        let rendered: Vec<String> = steps.iter().map(|s| s.command.to_string()).collect();
        assert_eq!(system.installs(), rendered);
        assert_eq!(ui.progress().last(), Some(&(steps.len(), steps.len())));
    }

    #[test]
    fn halts_after_failing_step() {
        let mut system = FakeSystem::new();
        system.fail_when("TTS.git", 1);
        let mut ui = MockUI::new();
        let ctx = ExecutionContext::default();
        let steps = steps();

        let err = run_sequence(&mut system, &mut ui, &ctx, &steps).unwrap_err();

        assert!(matches!(err, ProvisionError::StepFailed { .. }));
        assert_eq!(err.exit_code(), 1);
        // upgrade pip, torch, then the failing source install; nothing after it
        assert_eq!(system.installs().len(), 3);
        assert!(!system.installed("flask"));
        assert!(!system.installed("onnx"));
    }

    #[test]
    fn failure_shows_command_output_and_hint() {
        let mut system = FakeSystem::new();
        system.fail_when("onnx", 1);
        let mut ui = MockUI::new();
        let ctx = ExecutionContext::default();
        let steps = steps();

        run_sequence(&mut system, &mut ui, &ctx, &steps).unwrap_err();

        let blocks = ui.error_blocks();
        assert!(blocks[0].command.contains("onnx==1.16.2"));
        assert!(blocks[0].output.contains("simulated failure"));
        assert!(blocks[0]
            .hint
            .as_deref()
            .unwrap_or_default()
            .contains("onnx==1.16.2 requires Python >=3.9,<3.13"));
        let (succeeded, line) = ui.step_results().pop().unwrap();
        assert!(!succeeded);
        assert!(line.starts_with("Install onnx==1.16.2 failed"));
    }

    #[test]
    fn hint_follows_planned_interchange_version() {
        let mut plan = PlanConfig::default();
        plan.interchange = DependencySpec::pinned("onnx", "1.17.0");
        let steps = build_steps(&plan, "python3");
        let mut system = FakeSystem::new();
        system.fail_when("onnx", 1);
        let mut ui = MockUI::new();

        run_sequence(&mut system, &mut ui, &ExecutionContext::default(), &steps).unwrap_err();

        let blocks = ui.error_blocks();
        assert_eq!(blocks[0].command, "python3 -m pip install onnx==1.17.0");
        let hint = blocks[0].hint.clone().unwrap_or_default();
        assert!(hint.starts_with("onnx==1.17.0 requires Python >=3.9,<3.13"));
        assert!(!hint.contains("1.16.2"));
    }

    #[test]
    fn spawn_failure_is_step_failure() {
        let mut system = FakeSystem::new();
        system.unspawnable_when("--upgrade pip");
        let mut ui = MockUI::new();
        let ctx = ExecutionContext::default();

        let err = run_sequence(&mut system, &mut ui, &ctx, &steps()).unwrap_err();

        match err {
            ProvisionError::StepFailed { step, message } => {
                assert_eq!(step, "Upgrade pip");
                assert!(message.contains("could not be started"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(system.installs().len(), 1);
    }

    #[test]
    fn repeated_runs_both_succeed() {
        let mut system = FakeSystem::new();
        let mut ui = MockUI::new();
        let ctx = ExecutionContext::default();
        let steps = steps();

        run_sequence(&mut system, &mut ui, &ctx, &steps).unwrap();
        run_sequence(&mut system, &mut ui, &ctx, &steps).unwrap();

        assert_eq!(system.installs().len(), steps.len() * 2);
    }

    #[test]
    fn verbose_failure_without_capture_notes_streamed_output() {
        struct Silent;
        impl SystemInterrogator for Silent {
            fn command_exists(&mut self, _: &str, _: &ExecutionContext) -> bool {
                true
            }
            fn run_and_capture_version(&mut self, _: &str, _: &ExecutionContext) -> Option<String> {
                None
            }
            fn run_install_command(
                &mut self,
                _: &crate::shell::CommandLine,
                _: &ExecutionContext,
                stream: bool,
            ) -> Result<crate::shell::CommandResult> {
                assert!(stream);
                Ok(crate::shell::CommandResult::failure(
                    Some(2),
                    String::new(),
                    String::new(),
                    std::time::Duration::ZERO,
                ))
            }
            fn run_capture(
                &mut self,
                _: &crate::shell::CommandLine,
                _: &ExecutionContext,
            ) -> Result<crate::shell::CommandResult> {
                unreachable!()
            }
        }

        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        let ctx = ExecutionContext::default();
        let steps = steps();

        run_step(&mut Silent, &mut ui, &ctx, &steps[0]).unwrap_err();

        assert_eq!(ui.error_blocks()[0].output, "(output shown above)");
    }
}
