//! Error types for inventory runs.

use nf_core::{NfError, Real};
use nf_factors::FactorError;
use thiserror::Error;

use crate::engine::InventoryStage;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Input record for '{animal_type}' is not valid:\n{report}")]
    InvalidRecord { animal_type: String, report: String },

    #[error(
        "Factors compiled for '{factors_animal}' (crust: {factors_crust}) \
         cannot be used for '{record_animal}' (crust: {record_crust})"
    )]
    FactorMismatch {
        record_animal: String,
        record_crust: bool,
        factors_animal: String,
        factors_crust: bool,
    },

    #[error("Input value {field} is not set")]
    MissingInput { field: &'static str },

    #[error("Emission factor error: {0}")]
    Factor(#[from] FactorError),

    #[error("{what} sum to {sum}, which exceeds 1")]
    FractionSum { what: &'static str, sum: Real },

    #[error("Mass balance violated at {stage}: {flow} = {value}")]
    MassBalanceViolation {
        stage: InventoryStage,
        flow: String,
        value: Real,
    },

    #[error("Invalid global parameter: {0}")]
    InvalidParameter(#[from] NfError),
}

pub type EngineResult<T> = Result<T, EngineError>;
