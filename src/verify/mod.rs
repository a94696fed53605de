//! Post-install smoke test.
//!
//! Runs a short script in the provisioned runtime that reports the
//! Python/torch versions, exercises the MPS backend and imports the
//! installed packages. Failures are reported, never fatal.

use crate::context::ExecutionContext;
use crate::shell::CommandLine;
use crate::system::SystemInterrogator;
use crate::ui::{confirm, UserInterface};

/// Prompt key for the smoke test.
pub const SMOKE_TEST_PROMPT: &str = "smoke_test";

/// Inline verification script passed to `python -c`.
pub const SMOKE_TEST_SCRIPT: &str = r#"import sys
print("Python", sys.version.split()[0])
try:
    import torch
    print("torch", torch.__version__)
    print("MPS available:", torch.backends.mps.is_available())
    print("MPS built:", torch.backends.mps.is_built())
    if torch.backends.mps.is_available():
        x = torch.ones(3, device="mps")
        print("MPS tensor round-trip:", (x * 2).cpu().tolist())
except Exception as e:
    print("torch check failed:", e)
try:
    import onnx
    print("onnx", onnx.__version__)
except Exception as e:
    print("onnx import failed:", e)
try:
    from TTS.api import TTS
    print("TTS import OK")
except Exception as e:
    print("TTS import failed:", e)
"#;

/// How the smoke test ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The user declined.
    Skipped,
    /// The script ran to completion.
    Passed,
    /// The script could not run or exited non-zero.
    Failed(String),
}

/// The smoke-test command for the context's runtime.
pub fn smoke_test_command(ctx: &ExecutionContext) -> CommandLine {
    CommandLine::new(ctx.runtime_program(), ["-c", SMOKE_TEST_SCRIPT])
}

/// Offer and run the smoke test.
///
/// Never fails the run: an unanswerable prompt skips the test and a
/// failing script is a warning.
pub fn run_verifier(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &ExecutionContext,
) -> VerifyOutcome {
    match confirm(ui, SMOKE_TEST_PROMPT, "Run a smoke test?", false) {
        Ok(true) => {}
        Ok(false) => return VerifyOutcome::Skipped,
        Err(e) => {
            tracing::warn!("Smoke test prompt failed: {}", e);
            ui.warning(&format!("Skipping the smoke test ({}).", e));
            return VerifyOutcome::Skipped;
        }
    }

    let command = smoke_test_command(ctx);
    let mut spinner = ui.start_spinner("Running smoke test");
    let outcome = match system.run_capture(&command, ctx) {
        Ok(result) => {
            let output = result.combined_output();
            if result.success {
                spinner.finish_success("Smoke test finished");
            } else {
                spinner.finish_error("Smoke test failed");
            }
            for line in output.lines() {
                ui.message(&format!("  {}", line));
            }
            if result.success {
                VerifyOutcome::Passed
            } else {
                VerifyOutcome::Failed(format!("exited with {:?}", result.exit_code))
            }
        }
        Err(e) => {
            spinner.finish_error("Smoke test could not start");
            VerifyOutcome::Failed(e.to_string())
        }
    };

    if let VerifyOutcome::Failed(reason) = &outcome {
        tracing::warn!("Smoke test failed: {}", reason);
        ui.warning(&format!("Smoke test failed ({}); the installation itself completed.", reason));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::FakeSystem;
    use crate::ui::MockUI;

    fn ctx() -> ExecutionContext {
        let mut ctx = ExecutionContext::default();
        ctx.set_runtime("/work/venv/bin/python");
        ctx
    }

    #[test]
    fn declined_by_default() {
        let mut system = FakeSystem::new();
        let mut ui = MockUI::new();

        let outcome = run_verifier(&mut system, &mut ui, &ctx());

        assert_eq!(outcome, VerifyOutcome::Skipped);
        assert!(system.calls().is_empty());
    }

    #[test]
    fn relays_script_output() {
        let mut system = FakeSystem::new();
        system.set_capture_output("-c", "Python 3.11.9\nMPS available: True\n");
        let mut ui = MockUI::new();
        ui.set_prompt_response(SMOKE_TEST_PROMPT, "yes");

        let outcome = run_verifier(&mut system, &mut ui, &ctx());

        assert_eq!(outcome, VerifyOutcome::Passed);
        assert!(ui.has_message("MPS available: True"));
    }

    #[test]
    fn failure_is_a_warning() {
        let mut system = FakeSystem::new();
        system.fail_when("-c", 1);
        let mut ui = MockUI::new();
        ui.set_prompt_response(SMOKE_TEST_PROMPT, "yes");

        let outcome = run_verifier(&mut system, &mut ui, &ctx());

        assert!(matches!(outcome, VerifyOutcome::Failed(_)));
        assert!(ui.has_warning("Smoke test failed"));
    }

    #[test]
    fn spawn_failure_is_a_warning() {
        let mut system = FakeSystem::new();
        system.unspawnable_when("-c");
        let mut ui = MockUI::new();
        ui.set_prompt_response(SMOKE_TEST_PROMPT, "yes");

        let outcome = run_verifier(&mut system, &mut ui, &ctx());
        assert!(matches!(outcome, VerifyOutcome::Failed(_)));
    }

    #[test]
    fn prompt_error_skips_without_failing() {
        let mut system = FakeSystem::new();
        let mut ui = MockUI::new();
        ui.fail_prompt(SMOKE_TEST_PROMPT);

        let outcome = run_verifier(&mut system, &mut ui, &ctx());

        assert_eq!(outcome, VerifyOutcome::Skipped);
        assert!(ui.has_warning("Skipping the smoke test"));
        assert!(system.calls().is_empty());
    }

    #[test]
    fn script_checks_backend_and_imports() {
        let cmd = smoke_test_command(&ctx());
        assert_eq!(cmd.program, "/work/venv/bin/python");
        assert_eq!(cmd.args[0], "-c");
        for needle in ["torch.backends.mps.is_available()", "is_built()", "device=\"mps\"", "import onnx", "from TTS.api import TTS"] {
            assert!(SMOKE_TEST_SCRIPT.contains(needle), "{needle}");
        }
    }
}
