//! Virtual environment creation and the isolation menus.

use std::path::{Path, PathBuf};

use crate::context::ExecutionContext;
use crate::error::{ProvisionError, Result};
use crate::runtime::{RuntimeCandidate, RuntimeVersion};
use crate::shell::CommandLine;
use crate::system::SystemInterrogator;
use crate::ui::{select, PromptOption, UserInterface};

use super::state::{classify, transition, IsolationState, SessionChoice};

/// Menu shown when no environment is active.
pub const NOT_ISOLATED_MENU: &str = "venv_menu";

/// Menu shown when the active environment's runtime is too new.
pub const INCOMPATIBLE_MENU: &str = "incompatible_venv_menu";

/// Result of the isolation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationOutcome {
    /// Final state; always one that proceeds.
    pub state: IsolationState,
    /// Version of the runtime later stages will use, when known.
    pub version: Option<RuntimeVersion>,
}

/// Whether a virtual or conda environment is active.
pub fn is_isolated(ctx: &ExecutionContext) -> bool {
    ctx.markers_present()
}

/// The runtime inside the active environment.
///
/// `$VIRTUAL_ENV/bin/python` when it exists, otherwise `python3` from the
/// search path.
pub fn active_runtime(system: &mut dyn SystemInterrogator, ctx: &ExecutionContext) -> String {
    if let Some(dir) = ctx.env_dir() {
        let python = dir.join("bin").join("python");
        let python = python.to_string_lossy().into_owned();
        if system.command_exists(&python, ctx) {
            return python;
        }
    }
    "python3".to_string()
}

fn query_version(
    system: &mut dyn SystemInterrogator,
    ctx: &ExecutionContext,
    program: &str,
) -> Option<RuntimeVersion> {
    system
        .run_and_capture_version(program, ctx)
        .and_then(|out| RuntimeVersion::parse(&out))
}

/// Create a virtual environment at `env_dir` with `runtime` and activate it.
///
/// `clear` rebuilds an existing environment in place. Returns the version
/// reported by the new environment's runtime, if it could be read.
pub fn create_isolated_environment(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &mut ExecutionContext,
    runtime: &str,
    env_dir: &Path,
    clear: bool,
) -> Result<Option<RuntimeVersion>> {
    let mut args = vec!["-m".to_string(), "venv".to_string()];
    if clear {
        args.push("--clear".to_string());
    }
    args.push(env_dir.to_string_lossy().into_owned());
    let command = CommandLine::new(runtime, args);

    let name = env_dir.display().to_string();
    let mut spinner = ui.start_spinner(&format!("Creating virtual environment {}", name));
    let result = system
        .run_install_command(&command, ctx, false)
        .map_err(|e| ProvisionError::EnvironmentCreation {
            name: name.clone(),
            message: e.to_string(),
        });
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_error("Failed to create virtual environment");
            return Err(e);
        }
    };
    if !result.success {
        spinner.finish_error("Failed to create virtual environment");
        ui.show_error_block(
            &command.to_string(),
            &result.output_tail(20),
            Some("Check that the directory is writable and the Python install includes venv."),
        );
        return Err(ProvisionError::EnvironmentCreation {
            name,
            message: format!("`{}` exited with {:?}", command, result.exit_code),
        });
    }
    spinner.finish_success(&format!("Created virtual environment {}", name));

    ctx.activate(env_dir);
    let python = ctx.runtime_program();
    let version = query_version(system, ctx, &python);
    match version {
        Some(v) => ui.success(&format!("Active Python {} ({})", v, python)),
        None => ui.warning(&format!("Could not read the version of {}", python)),
    }
    Ok(version)
}

fn not_isolated_choice(ui: &mut dyn UserInterface, env_name: &str) -> Result<SessionChoice> {
    let options = vec![
        PromptOption::new(&format!("Create ./{} and use it", env_name), "create"),
        PromptOption::new("Continue without a virtual environment", "skip"),
        PromptOption::new("Abort", "abort"),
    ];
    let answer = select(
        ui,
        NOT_ISOLATED_MENU,
        "No virtual environment is active. What would you like to do?",
        options,
        SessionChoice::Create.as_str(),
    )?;
    Ok(answer.parse().unwrap_or(SessionChoice::Create))
}

fn incompatible_choice(ui: &mut dyn UserInterface, version: RuntimeVersion) -> Result<SessionChoice> {
    let options = vec![
        PromptOption::new("Recreate it with a supported Python", "recreate"),
        PromptOption::new("Continue anyway (later steps will likely fail)", "continue"),
        PromptOption::new("Abort", "abort"),
    ];
    let question = format!(
        "The active environment uses Python {}, which the pinned packages do not support. What would you like to do?",
        version.short()
    );
    let answer = select(
        ui,
        INCOMPATIBLE_MENU,
        &question,
        options,
        SessionChoice::Abort.as_str(),
    )?;
    Ok(answer.parse().unwrap_or(SessionChoice::Abort))
}

/// Run the isolation stage.
///
/// Leaves `ctx` pointing at the runtime the install sequence should use.
/// Aborting at either menu returns [`ProvisionError::Aborted`].
pub fn manage_isolation(
    system: &mut dyn SystemInterrogator,
    ui: &mut dyn UserInterface,
    ctx: &mut ExecutionContext,
    resolved: &RuntimeCandidate,
    env_dir: &Path,
) -> Result<IsolationOutcome> {
    let (mut state, mut version) = if is_isolated(ctx) {
        let active = active_runtime(system, ctx);
        let version = query_version(system, ctx, &active);
        if version.is_none() {
            ui.warning(&format!(
                "Could not read the version of {}; assuming it is compatible",
                active
            ));
        }
        ctx.set_runtime(&active);
        (classify(ctx, version), version)
    } else {
        (IsolationState::NotIsolated, Some(resolved.version))
    };
    tracing::debug!("Isolation state: {:?}", state);

    let env_name = env_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| env_dir.display().to_string());

    while !state.proceeds() {
        state = match state {
            IsolationState::NotIsolated => {
                let choice = not_isolated_choice(ui, &env_name)?;
                transition(state, choice)
            }
            IsolationState::IsolatedIncompatible => {
                let active = version.unwrap_or(RuntimeVersion::new(3, 13, 0));
                let choice = incompatible_choice(ui, active)?;
                transition(state, choice)
            }
            IsolationState::NeedsCreation { clear } => {
                let target: PathBuf = if clear {
                    ctx.env_dir()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| env_dir.to_path_buf())
                } else {
                    env_dir.to_path_buf()
                };
                if clear {
                    ctx.deactivate();
                }
                version = create_isolated_environment(
                    system,
                    ui,
                    ctx,
                    &resolved.identifier,
                    &target,
                    clear,
                )?
                .or(Some(resolved.version));
                IsolationState::IsolatedCompatible
            }
            IsolationState::Aborted => return Err(ProvisionError::Aborted),
            other => other,
        };
        tracing::debug!("Isolation state: {:?}", state);
    }

    match state {
        IsolationState::UnisolatedContinue => {
            ctx.set_runtime(&resolved.identifier);
            ui.warning("Continuing without a virtual environment; packages go into the selected Python's site-packages.");
        }
        IsolationState::IncompatibleContinue => {
            ui.warning("Continuing with an unsupported Python; onnx and other pinned packages are expected to fail.");
        }
        _ => {}
    }

    Ok(IsolationOutcome { state, version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{FakeSystem, SystemCall};
    use crate::ui::MockUI;

    const ENV_DIR: &str = "/work/venv";
    const ENV_PYTHON: &str = "/work/venv/bin/python";

    fn resolved() -> RuntimeCandidate {
        RuntimeCandidate {
            identifier: "/opt/homebrew/bin/python3.11".to_string(),
            version: RuntimeVersion::new(3, 11, 9),
        }
    }

    fn plain_ctx() -> ExecutionContext {
        ExecutionContext::from_pairs([("PATH", "/usr/bin")])
    }

    fn venv_system() -> FakeSystem {
        let mut system = FakeSystem::new();
        system.on_install("-m venv", ENV_PYTHON, "Python 3.11.9");
        system
    }

    #[test]
    fn create_activates_environment() {
        let mut system = venv_system();
        let mut ui = MockUI::new();
        let mut ctx = plain_ctx();

        let outcome =
            manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
                .unwrap();

        assert_eq!(outcome.state, IsolationState::IsolatedCompatible);
        assert_eq!(outcome.version, Some(RuntimeVersion::new(3, 11, 9)));
        assert_eq!(
            system.installs(),
            vec!["/opt/homebrew/bin/python3.11 -m venv /work/venv"]
        );
        assert_eq!(ctx.runtime(), Some(Path::new(ENV_PYTHON)));
        assert_eq!(ctx.var("VIRTUAL_ENV"), Some(ENV_DIR));
        assert_eq!(ctx.search_path()[0], PathBuf::from("/work/venv/bin"));
        assert!(ui.was_prompted(NOT_ISOLATED_MENU));
    }

    #[test]
    fn skip_never_creates_environment() {
        let mut system = venv_system();
        let mut ui = MockUI::new();
        ui.set_prompt_response(NOT_ISOLATED_MENU, "skip");
        let mut ctx = plain_ctx();

        let outcome =
            manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
                .unwrap();

        assert_eq!(outcome.state, IsolationState::UnisolatedContinue);
        assert!(system.installs().is_empty());
        assert!(!ctx.is_isolated());
        assert_eq!(ctx.runtime_program(), "/opt/homebrew/bin/python3.11");
        assert!(ui.has_warning("without a virtual environment"));
    }

    #[test]
    fn abort_is_graceful() {
        let mut system = venv_system();
        let mut ui = MockUI::new();
        ui.set_prompt_response(NOT_ISOLATED_MENU, "abort");
        let mut ctx = plain_ctx();

        let err = manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
            .unwrap_err();

        assert!(err.is_abort());
        assert_eq!(err.exit_code(), 0);
        assert!(system.installs().is_empty());
    }

    #[test]
    fn compatible_environment_is_used_without_prompt() {
        let mut system = FakeSystem::new();
        system.add_executable("/home/me/.venv/bin/python", "Python 3.12.2");
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::from_pairs([("VIRTUAL_ENV", "/home/me/.venv")]);

        let outcome =
            manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
                .unwrap();

        assert_eq!(outcome.state, IsolationState::IsolatedCompatible);
        assert_eq!(ctx.runtime_program(), "/home/me/.venv/bin/python");
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn conda_environment_uses_python3() {
        let mut system = FakeSystem::new();
        system.add_executable("python3", "Python 3.10.13");
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::from_pairs([("CONDA_DEFAULT_ENV", "tts")]);

        manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR)).unwrap();

        assert_eq!(ctx.runtime_program(), "python3");
        assert_eq!(system.version_queries(), vec!["python3"]);
    }

    #[test]
    fn incompatible_environment_recreated_with_clear() {
        let mut system = FakeSystem::new();
        system.add_executable("/home/me/.venv/bin/python", "Python 3.13.0");
        system.on_install("-m venv --clear", "/home/me/.venv/bin/python", "Python 3.11.9");
        let mut ui = MockUI::new();
        ui.set_prompt_response(INCOMPATIBLE_MENU, "recreate");
        let mut ctx = ExecutionContext::from_pairs([("VIRTUAL_ENV", "/home/me/.venv")]);

        let outcome =
            manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
                .unwrap();

        assert_eq!(
            system.installs(),
            vec!["/opt/homebrew/bin/python3.11 -m venv --clear /home/me/.venv"]
        );
        assert_eq!(outcome.version, Some(RuntimeVersion::new(3, 11, 9)));
        assert_eq!(ctx.runtime_program(), "/home/me/.venv/bin/python");
    }

    #[test]
    fn incompatible_environment_defaults_to_abort() {
        let mut system = FakeSystem::new();
        system.add_executable("/home/me/.venv/bin/python", "Python 3.13.0");
        let mut ui = MockUI::new();
        let mut ctx = ExecutionContext::from_pairs([("VIRTUAL_ENV", "/home/me/.venv")]);

        let err = manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
            .unwrap_err();

        assert!(err.is_abort());
    }

    #[test]
    fn incompatible_continue_keeps_active_runtime() {
        let mut system = FakeSystem::new();
        system.add_executable("/home/me/.venv/bin/python", "Python 3.13.0");
        let mut ui = MockUI::new();
        ui.set_prompt_response(INCOMPATIBLE_MENU, "continue");
        let mut ctx = ExecutionContext::from_pairs([("VIRTUAL_ENV", "/home/me/.venv")]);

        let outcome =
            manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
                .unwrap();

        assert_eq!(outcome.state, IsolationState::IncompatibleContinue);
        assert_eq!(ctx.runtime_program(), "/home/me/.venv/bin/python");
        assert!(ui.has_warning("expected to fail"));
    }

    #[test]
    fn failed_creation_is_fatal() {
        let mut system = FakeSystem::new();
        system.fail_when("-m venv", 1);
        let mut ui = MockUI::new();
        let mut ctx = plain_ctx();

        let err = manage_isolation(&mut system, &mut ui, &mut ctx, &resolved(), Path::new(ENV_DIR))
            .unwrap_err();

        assert!(matches!(err, ProvisionError::EnvironmentCreation { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(!ctx.is_isolated());
    }

    #[test]
    fn creation_requeries_new_runtime() {
        let mut system = venv_system();
        let mut ui = MockUI::new();
        let mut ctx = plain_ctx();

        create_isolated_environment(
            &mut system,
            &mut ui,
            &mut ctx,
            "python3.11",
            Path::new(ENV_DIR),
            false,
        )
        .unwrap();

        assert_eq!(
            system.calls().last(),
            Some(&SystemCall::Version(ENV_PYTHON.to_string()))
        );
        assert!(ui.has_success("Active Python 3.11.9"));
    }
}
