//! Error types for the nf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// behind one interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Reference table error: {0}")]
    Tables(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file: {path}")]
    OutputFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Emission factor error: {0}")]
    Factors(String),

    #[error("Inventory error: {0}")]
    Engine(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for nf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<nf_tables::TableError> for AppError {
    fn from(err: nf_tables::TableError) -> Self {
        AppError::Tables(err.to_string())
    }
}

impl From<nf_input::InputError> for AppError {
    fn from(err: nf_input::InputError) -> Self {
        AppError::Input(err.to_string())
    }
}

impl From<nf_factors::FactorError> for AppError {
    fn from(err: nf_factors::FactorError) -> Self {
        AppError::Factors(err.to_string())
    }
}

impl From<nf_engine::EngineError> for AppError {
    fn from(err: nf_engine::EngineError) -> Self {
        AppError::Engine(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialize(err.to_string())
    }
}
