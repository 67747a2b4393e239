//! Per-gas emission factor lookups.
//!
//! Animal-keyed tables are searched with the exact animal type first, then
//! its canonical category, then the table's fallback key.

use nf_core::{ApplicationMethod, Gas, ManureType, Real, Stage, is_fraction};
use nf_tables::{ConfigStore, Table, lookup_keys};

use crate::{FactorError, FactorResult};

/// Fallback animal key in `ef_nh3`.
pub const NH3_FALLBACK_KEY: &str = "other";
/// Fallback animal key in `ef_n2o`.
pub const N2O_FALLBACK_KEY: &str = "default";

/// Animal types whose slurry N2O factor depends on a surface crust.
pub const CRUST_SENSITIVE_TYPES: [&str; 3] = ["cattle", "dairy_cattle", "pigs"];

const SLURRY_WITH_CRUST: &str = "slurry_with_crust";
const SLURRY_WITHOUT_CRUST: &str = "slurry_without_crust";
const SOLID_HEAPS: &str = "solid_heaps";

/// Animal type plus its resolved category, bound to a store.
#[derive(Clone, Copy)]
pub struct FactorLookup<'a> {
    pub store: &'a dyn ConfigStore,
    pub animal_type: &'a str,
    pub category: &'a str,
}

impl<'a> FactorLookup<'a> {
    pub fn new(store: &'a dyn ConfigStore, animal_type: &'a str, category: &'a str) -> Self {
        Self {
            store,
            animal_type,
            category,
        }
    }

    fn animal_keys(&self, fallback: &str) -> Vec<String> {
        let mut keys = lookup_keys(self.animal_type);
        for key in lookup_keys(self.category) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys.push(fallback.to_string());
        keys
    }

    fn is_crust_sensitive(&self) -> bool {
        lookup_keys(self.animal_type)
            .iter()
            .chain(lookup_keys(self.category).iter())
            .any(|k| CRUST_SENSITIVE_TYPES.contains(&k.as_str()))
    }

    fn not_found(&self, stage: Stage, gas: Gas, manure: Option<ManureType>) -> FactorError {
        FactorError::NotFound {
            animal_type: self.animal_type.to_string(),
            stage,
            gas,
            manure_type: manure,
        }
    }
}

fn checked(table: Table, path: &[&str], value: Real) -> FactorResult<Real> {
    if is_fraction(value) {
        Ok(value)
    } else {
        Err(FactorError::InvalidValue {
            table: table.name(),
            path: path.join("."),
            value,
        })
    }
}

/// First animal key with a value under `prefix`.
fn first_keyed(
    store: &dyn ConfigStore,
    table: Table,
    prefix: &[&str],
    keys: &[String],
) -> FactorResult<Option<Real>> {
    for key in keys {
        let mut path = prefix.to_vec();
        path.push(key.as_str());
        if let Some(value) = store.get_f64(table, &path) {
            return checked(table, &path, value).map(Some);
        }
    }
    Ok(None)
}

/// NH3 at a stage. Housing, storage and application are split by manure
/// type; grazing and yards carry a single factor each.
pub fn resolve_nh3(
    lookup: &FactorLookup<'_>,
    stage: Stage,
    manure: Option<ManureType>,
) -> FactorResult<Real> {
    let prefix: Vec<&str> = match (stage, manure) {
        (Stage::Grazing | Stage::Yards, _) => vec![stage.key()],
        (Stage::Housing | Stage::Storage | Stage::Application, Some(m)) => {
            vec![m.key(), stage.key()]
        }
        (Stage::Digestate, _) => return resolve_digestate(lookup),
        _ => return Err(lookup.not_found(stage, Gas::Nh3, manure)),
    };
    let manure = if stage.is_manure_specific() {
        manure
    } else {
        None
    };
    first_keyed(
        lookup.store,
        Table::EfNh3,
        &prefix,
        &lookup.animal_keys(NH3_FALLBACK_KEY),
    )?
    .ok_or_else(|| lookup.not_found(stage, Gas::Nh3, manure))
}

/// Storage N2O.
///
/// Solid manure uses the heaps factor. Slurry from cattle, dairy cattle and
/// pigs uses the with-crust variant when `crust` is set and that variant
/// exists, otherwise the without-crust variant; every other type uses the
/// without-crust variant regardless of the flag.
pub fn resolve_n2o(
    lookup: &FactorLookup<'_>,
    manure: ManureType,
    crust: bool,
) -> FactorResult<Real> {
    let variants: &[&str] = match manure {
        ManureType::Solid => &[SOLID_HEAPS],
        ManureType::Slurry if crust && lookup.is_crust_sensitive() => {
            &[SLURRY_WITH_CRUST, SLURRY_WITHOUT_CRUST]
        }
        ManureType::Slurry => &[SLURRY_WITHOUT_CRUST],
    };

    for key in lookup.animal_keys(N2O_FALLBACK_KEY) {
        for variant in variants {
            let path = [key.as_str(), *variant];
            if let Some(value) = lookup.store.get_f64(Table::EfN2o, &path) {
                return checked(Table::EfN2o, &path, value);
            }
        }
    }
    Err(lookup.not_found(Stage::Storage, Gas::N2o, Some(manure)))
}

/// NO and N2 during storage, global per manure type.
pub fn resolve_other(
    lookup: &FactorLookup<'_>,
    gas: Gas,
    manure: ManureType,
) -> FactorResult<Real> {
    if matches!(gas, Gas::No | Gas::N2) {
        let path = [manure.key(), gas.key()];
        if let Some(value) = lookup.store.get_f64(Table::EfOther, &path) {
            return checked(Table::EfOther, &path, value);
        }
    }
    Err(lookup.not_found(Stage::Storage, gas, Some(manure)))
}

/// Digestate NH3: a scalar, or a `slurry` entry under the gas key.
pub fn resolve_digestate(lookup: &FactorLookup<'_>) -> FactorResult<Real> {
    let gas = Gas::Nh3.key();
    for path in [vec![gas], vec![gas, ManureType::Slurry.key()]] {
        if let Some(value) = lookup.store.get_f64(Table::EfDigestate, &path) {
            return checked(Table::EfDigestate, &path, value);
        }
    }
    Err(lookup.not_found(Stage::Digestate, Gas::Nh3, None))
}

pub fn resolve_application_method(
    lookup: &FactorLookup<'_>,
    manure: ManureType,
    method: ApplicationMethod,
) -> FactorResult<Real> {
    first_keyed(
        lookup.store,
        Table::EfNh3,
        &["application_methods", manure.key(), method.key()],
        &lookup.animal_keys(NH3_FALLBACK_KEY),
    )?
    .ok_or_else(|| FactorError::MethodNotFound {
        animal_type: lookup.animal_type.to_string(),
        manure_type: manure,
        method,
    })
}

/// Dispatch one (stage, gas, manure) slot to the resolver for its gas.
pub fn resolve_slot(
    lookup: &FactorLookup<'_>,
    crust: bool,
    stage: Stage,
    gas: Gas,
    manure: Option<ManureType>,
) -> FactorResult<Real> {
    match (gas, stage, manure) {
        (Gas::Nh3, _, _) => resolve_nh3(lookup, stage, manure),
        (Gas::N2o, Stage::Storage, Some(m)) => resolve_n2o(lookup, m, crust),
        (Gas::No | Gas::N2, Stage::Storage, Some(m)) => resolve_other(lookup, gas, m),
        _ => Err(lookup.not_found(stage, gas, manure)),
    }
}
