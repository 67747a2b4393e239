//! Scenario parameter definitions.

use std::collections::BTreeMap;

use nf_core::{ApplicationMethod, ManureType, Real};
use serde::{Deserialize, Serialize};

/// Parameters for one farm/herd scenario as supplied by the caller.
///
/// Every numeric field except `animal_number` may be omitted and is then
/// defaulted from the reference tables where possible.
///
/// ```yaml
/// animal_type: dairy_cattle_tied
/// animal_number: 100
/// fraction_storage_slurry: 0.8
/// fraction_biogas_slurry: 0.2
/// slurry_crust: true
/// application:
///   slurry: { trailing_hose: 0.6, broadcast: 0.4 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InventoryParams {
    pub animal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_number: Option<u64>,
    /// kg N per head per year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excretion_coefficient: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_grazing: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_yards: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_housing: Option<Real>,
    #[serde(
        rename = "fraction_TAN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fraction_tan: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_manure_slurry: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_manure_solid: Option<Real>,
    /// kg bedding per head per year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedding_amount: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_storage_slurry: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_biogas_slurry: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_storage_solid: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_biogas_solid: Option<Real>,
    #[serde(default)]
    pub slurry_crust: bool,
    #[serde(default)]
    pub application: ApplicationShares,
}

impl InventoryParams {
    pub fn new(animal_type: impl Into<String>, animal_number: u64) -> Self {
        Self {
            animal_type: animal_type.into(),
            animal_number: Some(animal_number),
            ..Self::default()
        }
    }
}

/// Share of applied manure spread with each method, per manure type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ApplicationShares {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slurry: BTreeMap<ApplicationMethod, Real>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub solid: BTreeMap<ApplicationMethod, Real>,
}

impl ApplicationShares {
    pub fn for_manure(&self, manure: ManureType) -> &BTreeMap<ApplicationMethod, Real> {
        match manure {
            ManureType::Slurry => &self.slurry,
            ManureType::Solid => &self.solid,
        }
    }

    pub fn total(&self, manure: ManureType) -> Real {
        self.for_manure(manure).values().sum()
    }
}

/// A defaulted scenario, immutable once built.
///
/// Values still `None` were absent from both the caller's parameters and the
/// reference tables.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InputRecord {
    pub animal_type: String,
    /// Canonical category from the conversion table.
    pub category: String,
    pub animal_number: Option<u64>,
    pub excretion_coefficient: Option<Real>,
    pub fraction_grazing: Option<Real>,
    pub fraction_yards: Option<Real>,
    pub fraction_housing: Option<Real>,
    #[serde(rename = "fraction_TAN")]
    pub fraction_tan: Option<Real>,
    pub fraction_manure_slurry: Option<Real>,
    pub fraction_manure_solid: Option<Real>,
    pub bedding_amount: Option<Real>,
    pub fraction_storage_slurry: Option<Real>,
    pub fraction_biogas_slurry: Option<Real>,
    pub fraction_storage_solid: Option<Real>,
    pub fraction_biogas_solid: Option<Real>,
    pub slurry_crust: bool,
    pub application: ApplicationShares,
}

impl InputRecord {
    pub(crate) fn from_params(params: InventoryParams, category: String) -> Self {
        Self {
            animal_type: params.animal_type,
            category,
            animal_number: params.animal_number,
            excretion_coefficient: params.excretion_coefficient,
            fraction_grazing: params.fraction_grazing,
            fraction_yards: params.fraction_yards,
            fraction_housing: params.fraction_housing,
            fraction_tan: params.fraction_tan,
            fraction_manure_slurry: params.fraction_manure_slurry,
            fraction_manure_solid: params.fraction_manure_solid,
            bedding_amount: params.bedding_amount,
            fraction_storage_slurry: params.fraction_storage_slurry,
            fraction_biogas_slurry: params.fraction_biogas_slurry,
            fraction_storage_solid: params.fraction_storage_solid,
            fraction_biogas_solid: params.fraction_biogas_solid,
            slurry_crust: params.slurry_crust,
            application: params.application,
        }
    }

    pub fn fraction_manure(&self, manure: ManureType) -> Option<Real> {
        match manure {
            ManureType::Slurry => self.fraction_manure_slurry,
            ManureType::Solid => self.fraction_manure_solid,
        }
    }

    pub fn fraction_storage(&self, manure: ManureType) -> Option<Real> {
        match manure {
            ManureType::Slurry => self.fraction_storage_slurry,
            ManureType::Solid => self.fraction_storage_solid,
        }
    }

    pub fn fraction_biogas(&self, manure: ManureType) -> Option<Real> {
        match manure {
            ManureType::Slurry => self.fraction_biogas_slurry,
            ManureType::Solid => self.fraction_biogas_solid,
        }
    }
}
