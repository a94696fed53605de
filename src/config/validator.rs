//! Plan validation and resolution.
//!
//! Turns a [`PlanFile`] into a [`PlanConfig`], filling unset fields from
//! the defaults. Every problem is collected so they can be fixed at once.

use std::fmt;

use crate::config::schema::{PlanConfig, PlanFile};
use crate::install::DependencySpec;
use crate::runtime::version::{MAX_MINOR, MIN_MINOR, REQUIRED_MAJOR};

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field the problem was found in.
    pub field: String,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Resolve a plan file against the defaults.
pub fn resolve(file: PlanFile) -> std::result::Result<PlanConfig, Vec<ValidationError>> {
    let mut plan = PlanConfig::default();
    let mut errors = Vec::new();

    if let Some(name) = file.environment_name {
        match validate_environment_name(&name) {
            Ok(()) => plan.environment_name = name,
            Err(e) => errors.push(e),
        }
    }

    if let Some(version) = file.preferred_runtime {
        match parse_preferred_runtime(&version) {
            Ok(v) => plan.preferred_runtime = v,
            Err(e) => errors.push(e),
        }
    }

    if let Some(accelerated) = file.accelerated {
        if accelerated.iter().all(|p| p.trim().is_empty()) {
            errors.push(ValidationError::new(
                "accelerated",
                "must name at least one package",
            ));
        } else {
            plan.accelerated = accelerated
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
    }

    if let Some(source) = file.source_package {
        if source.trim().is_empty() {
            errors.push(ValidationError::new("source_package", "must not be empty"));
        } else {
            plan.source_package = source.trim().to_string();
        }
    }

    if let Some(auxiliary) = file.auxiliary {
        plan.auxiliary = parse_list("auxiliary", &auxiliary, false, &mut errors);
    }

    if let Some(pinned) = file.pinned {
        plan.pinned = parse_list("pinned", &pinned, true, &mut errors);
    }

    if let Some(tokenizer) = file.tokenizer {
        match parse_spec("tokenizer", &tokenizer, false) {
            Ok(spec) => plan.tokenizer = spec,
            Err(e) => errors.push(e),
        }
    }

    if let Some(interchange) = file.interchange {
        match parse_spec("interchange", &interchange, true) {
            Ok(spec) => plan.interchange = spec,
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(plan)
    } else {
        Err(errors)
    }
}

fn validate_environment_name(name: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("environment_name", "must not be empty"));
    }
    if trimmed != name || trimmed.contains('/') || trimmed == "." || trimmed == ".." {
        return Err(ValidationError::new(
            "environment_name",
            format!("'{}' must be a plain directory name", name),
        ));
    }
    Ok(())
}

fn parse_preferred_runtime(text: &str) -> std::result::Result<(u32, u32), ValidationError> {
    let invalid = || {
        ValidationError::new(
            "preferred_runtime",
            format!(
                "'{}' must be {}.{} to {}.{} in major.minor form",
                text, REQUIRED_MAJOR, MIN_MINOR, REQUIRED_MAJOR, MAX_MINOR
            ),
        )
    };
    let (major, minor) = text.trim().split_once('.').ok_or_else(invalid)?;
    let major: u32 = major.parse().map_err(|_| invalid())?;
    let minor: u32 = minor.parse().map_err(|_| invalid())?;
    if major != REQUIRED_MAJOR || !(MIN_MINOR..=MAX_MINOR).contains(&minor) {
        return Err(invalid());
    }
    Ok((major, minor))
}

fn parse_spec(
    field: &str,
    text: &str,
    require_pin: bool,
) -> std::result::Result<DependencySpec, ValidationError> {
    let spec: DependencySpec = text
        .parse()
        .map_err(|e: String| ValidationError::new(field, e))?;
    if require_pin && !spec.is_pinned() {
        return Err(ValidationError::new(
            field,
            format!("'{}' must be pinned as name==version", text),
        ));
    }
    Ok(spec)
}

fn parse_list(
    field: &str,
    items: &[String],
    require_pin: bool,
    errors: &mut Vec<ValidationError>,
) -> Vec<DependencySpec> {
    items
        .iter()
        .filter_map(|item| match parse_spec(field, item, require_pin) {
            Ok(spec) => Some(spec),
            Err(e) => {
                errors.push(e);
                None
            }
        })
        .collect()
}
