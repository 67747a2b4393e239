//! nf-input: scenario parameters, default filling and validation.
//!
//! An animal type that does not resolve to a known category is a hard error
//! when building an [`InputRecord`]. Every other rule violation is collected
//! into the [`BuildOutcome`].

pub mod defaults;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use defaults::fill_defaults;
pub use schema::{ApplicationShares, InputRecord, InventoryParams};
pub use validate::{ValidationIssue, validate};

use nf_tables::ConfigStore;

pub type InputResult<T> = Result<T, InputError>;

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("Invalid animal type '{animal_type}': {reason}")]
    InvalidAnimalType { animal_type: String, reason: String },

    #[error("Invalid input record for '{animal_type}':\n{report}")]
    Invalid { animal_type: String, report: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A built record together with every validation issue found.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub record: InputRecord,
    pub issues: Vec<ValidationIssue>,
}

impl BuildOutcome {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues as a human-readable list, one per line.
    pub fn report(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("- {issue}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_valid(self) -> InputResult<InputRecord> {
        if self.is_valid() {
            Ok(self.record)
        } else {
            Err(InputError::Invalid {
                animal_type: self.record.animal_type.clone(),
                report: self.report(),
            })
        }
    }
}

/// Resolve the category, fill defaults and validate.
pub fn build(params: &InventoryParams, store: &dyn ConfigStore) -> InputResult<BuildOutcome> {
    let animal_type = params.animal_type.trim();
    if animal_type.is_empty() {
        return Err(InputError::InvalidAnimalType {
            animal_type: params.animal_type.clone(),
            reason: "animal_type must be a non-empty string".to_string(),
        });
    }

    let category = nf_tables::resolve_strict(animal_type, store).map_err(|e| {
        InputError::InvalidAnimalType {
            animal_type: animal_type.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut trimmed = params.clone();
    trimmed.animal_type = animal_type.to_string();
    let filled = fill_defaults(&trimmed, &category, store);
    let record = InputRecord::from_params(filled, category);
    let issues = validate(&record);

    if issues.is_empty() {
        tracing::debug!(
            animal_type = %record.animal_type,
            category = %record.category,
            "input record built"
        );
    } else {
        tracing::debug!(
            animal_type = %record.animal_type,
            issues = issues.len(),
            "input record failed validation"
        );
    }

    Ok(BuildOutcome { record, issues })
}

pub fn params_from_yaml_str(src: &str) -> InputResult<InventoryParams> {
    Ok(serde_yaml::from_str(src)?)
}

pub fn load_params_yaml(path: &Path) -> InputResult<InventoryParams> {
    let content = std::fs::read_to_string(path)?;
    params_from_yaml_str(&content)
}
