//! Plan file schema and the resolved plan.

use serde::Deserialize;

use crate::install::DependencySpec;

/// Default virtual environment directory name.
pub const DEFAULT_ENVIRONMENT_NAME: &str = "venv";

/// Default preferred Python `major.minor`.
pub const DEFAULT_PREFERRED_RUNTIME: &str = "3.11";

/// Source of the TTS package.
pub const DEFAULT_SOURCE_PACKAGE: &str = "git+https://github.com/coqui-ai/TTS.git";

/// Interchange-format library; no wheels exist for Python 3.13+.
pub const DEFAULT_INTERCHANGE: &str = "onnx==1.16.2";

const DEFAULT_ACCELERATED: &[&str] = &["torch", "torchaudio"];

const DEFAULT_AUXILIARY: &[&str] = &["flask", "flask-cors", "soundfile", "pydub", "librosa"];

const DEFAULT_PINNED: &[&str] = &[
    "numpy==1.26.4",
    "scipy==1.11.4",
    "numba==0.59.1",
    "inflect==7.0.0",
    "tqdm==4.66.2",
    "anyascii==0.3.2",
    "pyyaml==6.0.1",
    "fsspec==2024.2.0",
    "packaging==23.2",
    "coqpit==0.0.17",
    "trainer==0.0.36",
    "pysbd==0.3.4",
    "einops==0.7.0",
    "transformers==4.36.2",
    "encodec==0.1.1",
    "unidecode==1.3.8",
    "num2words==0.5.13",
    "gruut[de,es,fr]==2.2.3",
    "jamo==0.4.1",
    "nltk==3.8.1",
    "pypinyin==0.50.0",
    "jieba==0.42.1",
];

const DEFAULT_TOKENIZER: &str = "spacy-pkuseg";

/// Plan file as written on disk. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    /// Virtual environment directory name.
    pub environment_name: Option<String>,
    /// Preferred Python `major.minor`.
    pub preferred_runtime: Option<String>,
    /// Packages forming the accelerated ML runtime.
    pub accelerated: Option<Vec<String>>,
    /// pip requirement for the primary package (installed with `--no-deps`).
    pub source_package: Option<String>,
    /// Unpinned web/audio helpers.
    pub auxiliary: Option<Vec<String>>,
    /// Exact pins required by the primary package.
    pub pinned: Option<Vec<String>>,
    /// Tokenizer (installed with `--no-deps`).
    pub tokenizer: Option<String>,
    /// Interchange-format library.
    pub interchange: Option<String>,
}

/// Resolved, validated provisioning plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    pub environment_name: String,
    /// Preferred runtime as (major, minor).
    pub preferred_runtime: (u32, u32),
    pub accelerated: Vec<String>,
    pub source_package: String,
    pub auxiliary: Vec<DependencySpec>,
    pub pinned: Vec<DependencySpec>,
    pub tokenizer: DependencySpec,
    pub interchange: DependencySpec,
}

impl PlanConfig {
    /// Preferred runtime as `major.minor`.
    pub fn preferred_short(&self) -> String {
        format!("{}.{}", self.preferred_runtime.0, self.preferred_runtime.1)
    }

    /// Homebrew formula providing the preferred runtime.
    pub fn preferred_formula(&self) -> String {
        format!("python@{}", self.preferred_short())
    }

    /// Executable name of the preferred runtime.
    pub fn preferred_executable(&self) -> String {
        format!("python{}", self.preferred_short())
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        let specs = |items: &[&str]| -> Vec<DependencySpec> {
            items
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect()
        };
        Self {
            environment_name: DEFAULT_ENVIRONMENT_NAME.to_string(),
            preferred_runtime: (3, 11),
            accelerated: DEFAULT_ACCELERATED.iter().map(|s| s.to_string()).collect(),
            source_package: DEFAULT_SOURCE_PACKAGE.to_string(),
            auxiliary: specs(DEFAULT_AUXILIARY),
            pinned: specs(DEFAULT_PINNED),
            tokenizer: DependencySpec::unpinned(DEFAULT_TOKENIZER),
            interchange: DependencySpec::pinned("onnx", "1.16.2"),
        }
    }
}
