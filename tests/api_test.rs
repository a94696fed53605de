//! Integration tests for the library's public API.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use ttsprov::config::load_plan;
use ttsprov::context::ExecutionContext;
use ttsprov::install::{build_steps, Phase};
use ttsprov::isolation::NOT_ISOLATED_MENU;
use ttsprov::system::FakeSystem;
use ttsprov::ui::MockUI;
use ttsprov::workflow::provision;
use ttsprov::ProvisionError;

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> ttsprov::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn plan_file_drives_install_steps() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("ttsprov.yml"),
        r#"
environment_name: tts-env
auxiliary: [flask]
pinned:
  - numpy==1.26.4
tokenizer: spacy-pkuseg
"#,
    )
    .unwrap();

    let plan = load_plan(None, temp.path()).unwrap();
    let steps = build_steps(&plan, "tts-env/bin/python");

    let rendered: Vec<String> = steps.iter().map(|s| s.command.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "tts-env/bin/python -m pip install --upgrade pip",
            "tts-env/bin/python -m pip install torch torchaudio",
            "tts-env/bin/python -m pip install --no-deps git+https://github.com/coqui-ai/TTS.git",
            "tts-env/bin/python -m pip install flask",
            "tts-env/bin/python -m pip install numpy==1.26.4",
            "tts-env/bin/python -m pip install --no-deps spacy-pkuseg",
            "tts-env/bin/python -m pip install onnx==1.16.2",
        ]
    );
    assert_eq!(steps.last().map(|s| s.phase), Some(Phase::Interchange));
}

#[test]
fn flow_against_fake_host() {
    let mut system = FakeSystem::new();
    system.set_capture_output("sw_vers", "15.1\n");
    system.add_executable("/opt/homebrew/bin/brew", "Homebrew 4.4.0");
    system.add_executable("/opt/homebrew/bin/python3.11", "Python 3.11.10");
    let mut ui = MockUI::new();
    ui.set_prompt_response(NOT_ISOLATED_MENU, "skip");
    let mut ctx = ExecutionContext::from_pairs([("OSTYPE", "darwin24"), ("PATH", "/usr/bin")]);

    let plan = load_plan(None, Path::new("/nonexistent-dir-for-tests")).unwrap();
    let summary = provision(&mut system, &mut ui, &mut ctx, &plan, Path::new("/work")).unwrap();

    assert_eq!(summary.stages.len(), 7);
    assert!(system
        .installs()
        .iter()
        .all(|c| c.starts_with("/opt/homebrew/bin/python3.11 -m pip install")));
    assert!(ctx.has_path(Path::new("/opt/homebrew/bin")));
}

#[test]
fn unsupported_host_error_is_public() {
    let mut system = FakeSystem::new();
    let mut ui = MockUI::new();
    let mut ctx = ExecutionContext::from_pairs([("OSTYPE", "msys")]);

    let err = provision(
        &mut system,
        &mut ui,
        &mut ctx,
        &Default::default(),
        Path::new("/work"),
    )
    .unwrap_err();

    assert!(matches!(err, ProvisionError::UnsupportedHost { ref marker } if marker == "msys"));
}
