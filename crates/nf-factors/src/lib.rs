//! nf-factors: emission factor resolution.
//!
//! The reference tables keep each gas in a different shape (NH3 by manure
//! type then stage, N2O by animal type then crust variant, NO/N2 globally by
//! manure type, digestate NH3 as a single scalar). [`compile`] normalises
//! all of them into one [`CompiledFactors`] table keyed by stage, gas and
//! manure type, built once per animal type and crust flag.

pub mod cache;
pub mod compiled;
pub mod resolver;

pub use cache::FactorCache;
pub use compiled::{CompiledFactors, FactorEntry, FactorKey, MethodEntry, compile};
pub use resolver::{
    FactorLookup, resolve_application_method, resolve_digestate, resolve_n2o, resolve_nh3,
    resolve_other, resolve_slot,
};

use nf_core::{ApplicationMethod, Gas, ManureType, Stage};

pub type FactorResult<T> = Result<T, FactorError>;

fn manure_label(manure: &Option<ManureType>) -> &'static str {
    manure.map_or("-", ManureType::key)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error(
        "Emission factor not found: animal type '{animal_type}', stage {stage}, gas {gas}, manure type {}",
        manure_label(.manure_type)
    )]
    NotFound {
        animal_type: String,
        stage: Stage,
        gas: Gas,
        manure_type: Option<ManureType>,
    },

    #[error(
        "Application method factor not found: animal type '{animal_type}', manure type {manure_type}, method {method}"
    )]
    MethodNotFound {
        animal_type: String,
        manure_type: ManureType,
        method: ApplicationMethod,
    },

    #[error("Invalid emission factor in {table} at {path}: {value} (expected [0, 1])")]
    InvalidValue {
        table: &'static str,
        path: String,
        value: f64,
    },

    #[error("No emission factor tables loaded")]
    NoFactorTables,
}

impl FactorError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FactorError::NotFound { .. } | FactorError::MethodNotFound { .. }
        )
    }
}
