//! Normalised per-animal factor table.

use std::collections::BTreeMap;

use nf_core::{ApplicationMethod, Gas, ManureType, Real, Stage};
use nf_tables::{ConfigStore, Table};
use serde::Serialize;

use crate::resolver::{FactorLookup, resolve_application_method, resolve_slot};
use crate::{FactorError, FactorResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FactorKey {
    pub stage: Stage,
    pub gas: Gas,
    pub manure_type: Option<ManureType>,
}

impl FactorKey {
    pub fn new(stage: Stage, gas: Gas, manure_type: Option<ManureType>) -> Self {
        Self {
            stage,
            gas,
            manure_type,
        }
    }
}

/// Flat view of one compiled factor, for listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FactorEntry {
    #[serde(flatten)]
    pub key: FactorKey,
    pub value: Real,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodEntry {
    pub manure_type: ManureType,
    pub method: ApplicationMethod,
    pub value: Real,
}

/// Every (stage, gas, manure) slot the inventory engine reads.
pub fn required_slots() -> Vec<FactorKey> {
    let mut slots = vec![
        FactorKey::new(Stage::Grazing, Gas::Nh3, None),
        FactorKey::new(Stage::Yards, Gas::Nh3, None),
    ];
    for manure in ManureType::ALL {
        for stage in [Stage::Housing, Stage::Storage, Stage::Application] {
            slots.push(FactorKey::new(stage, Gas::Nh3, Some(manure)));
        }
        for gas in [Gas::N2o, Gas::No, Gas::N2] {
            slots.push(FactorKey::new(Stage::Storage, gas, Some(manure)));
        }
    }
    slots.push(FactorKey::new(Stage::Digestate, Gas::Nh3, None));
    slots
}

/// Emission factors for one animal type and crust flag.
///
/// Slots with no table entry are left out; reading one through [`get`]
/// reports which combination is missing.
///
/// [`get`]: CompiledFactors::get
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFactors {
    animal_type: String,
    category: String,
    slurry_crust: bool,
    factors: BTreeMap<FactorKey, Real>,
    methods: BTreeMap<(ManureType, ApplicationMethod), Real>,
}

impl CompiledFactors {
    pub fn animal_type(&self) -> &str {
        &self.animal_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn slurry_crust(&self) -> bool {
        self.slurry_crust
    }

    /// Whether this table was compiled for the given animal type and crust flag.
    pub fn is_for(&self, animal_type: &str, slurry_crust: bool) -> bool {
        self.animal_type == animal_type && self.slurry_crust == slurry_crust
    }

    pub fn get(&self, stage: Stage, gas: Gas, manure: Option<ManureType>) -> FactorResult<Real> {
        let manure = if stage.is_manure_specific() {
            manure
        } else {
            None
        };
        self.factors
            .get(&FactorKey::new(stage, gas, manure))
            .copied()
            .ok_or_else(|| FactorError::NotFound {
                animal_type: self.animal_type.clone(),
                stage,
                gas,
                manure_type: manure,
            })
    }

    pub fn method(&self, manure: ManureType, method: ApplicationMethod) -> FactorResult<Real> {
        self.methods
            .get(&(manure, method))
            .copied()
            .ok_or_else(|| FactorError::MethodNotFound {
                animal_type: self.animal_type.clone(),
                manure_type: manure,
                method,
            })
    }

    pub fn entries(&self) -> Vec<FactorEntry> {
        self.factors
            .iter()
            .map(|(key, value)| FactorEntry {
                key: *key,
                value: *value,
            })
            .collect()
    }

    pub fn method_entries(&self) -> Vec<MethodEntry> {
        self.methods
            .iter()
            .map(|((manure_type, method), value)| MethodEntry {
                manure_type: *manure_type,
                method: *method,
                value: *value,
            })
            .collect()
    }

    /// Required slots with no factor.
    pub fn missing(&self) -> Vec<FactorKey> {
        required_slots()
            .into_iter()
            .filter(|k| !self.factors.contains_key(k))
            .collect()
    }
}

fn keep_or_skip(result: FactorResult<Real>) -> FactorResult<Option<Real>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => {
            tracing::debug!(error = %e, "factor slot left empty");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve every factor the engine uses for `animal_type` with the given crust flag.
pub fn compile(
    animal_type: &str,
    slurry_crust: bool,
    store: &dyn ConfigStore,
) -> FactorResult<CompiledFactors> {
    if !Table::ALL
        .iter()
        .any(|t| t.is_emission_factor() && store.has_table(*t))
    {
        return Err(FactorError::NoFactorTables);
    }

    let category = nf_tables::resolve(animal_type, store).category;
    let lookup = FactorLookup::new(store, animal_type, &category);

    let mut factors = BTreeMap::new();
    for key in required_slots() {
        let resolved = resolve_slot(&lookup, slurry_crust, key.stage, key.gas, key.manure_type);
        if let Some(value) = keep_or_skip(resolved)? {
            factors.insert(key, value);
        }
    }

    let mut methods = BTreeMap::new();
    for manure in ManureType::ALL {
        for method in ApplicationMethod::ALL {
            let resolved = resolve_application_method(&lookup, manure, method);
            if let Some(value) = keep_or_skip(resolved)? {
                methods.insert((manure, method), value);
            }
        }
    }

    tracing::debug!(
        animal_type,
        category = %category,
        slurry_crust,
        factors = factors.len(),
        methods = methods.len(),
        "emission factors compiled"
    );

    Ok(CompiledFactors {
        animal_type: animal_type.to_string(),
        category,
        slurry_crust,
        factors,
        methods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_tables::YamlStore;

    fn store() -> YamlStore {
        YamlStore::from_tables([
            (Table::AnimalConversion, "dairy_cattle: [dairy_cattle_tied]\n"),
            (
                Table::EfNh3,
                "\
slurry: { housing: { dairy_cattle: 0.24 }, storage: { dairy_cattle: 0.25 }, application: { dairy_cattle: 0.55 } }
solid: { housing: { dairy_cattle: 0.08 }, storage: { dairy_cattle: 0.32 }, application: { dairy_cattle: 0.79 } }
grazing: { dairy_cattle: 0.10 }
yards: { dairy_cattle: 0.75 }
application_methods:
  slurry:
    injection: { dairy_cattle: 0.165 }
",
            ),
            (
                Table::EfN2o,
                "dairy_cattle: { slurry_with_crust: 0.005, slurry_without_crust: 0.0, solid_heaps: 0.005 }\n",
            ),
            (Table::EfOther, "slurry: { NO: 0.0001, N2: 0.003 }\nsolid: { NO: 0.01, N2: 0.3 }\n"),
            (Table::EfDigestate, "NH3: 0.02\n"),
        ])
        .unwrap()
    }

    #[test]
    fn compiles_all_slots() {
        let f = compile("dairy_cattle_tied", true, &store()).unwrap();
        assert_eq!(f.category(), "dairy_cattle");
        assert!(f.missing().is_empty(), "{:?}", f.missing());
        assert_eq!(
            f.get(Stage::Storage, Gas::N2o, Some(ManureType::Slurry))
                .unwrap(),
            0.005
        );
        assert_eq!(f.get(Stage::Yards, Gas::Nh3, None).unwrap(), 0.75);
        assert_eq!(
            f.method(ManureType::Slurry, ApplicationMethod::Injection)
                .unwrap(),
            0.165
        );
        assert_eq!(f.method_entries().len(), 1);
    }

    #[test]
    fn grazing_lookup_ignores_manure_argument() {
        let f = compile("dairy_cattle", false, &store()).unwrap();
        assert_eq!(
            f.get(Stage::Grazing, Gas::Nh3, Some(ManureType::Slurry))
                .unwrap(),
            0.10
        );
    }

    #[test]
    fn crust_flag_changes_slurry_n2o_only() {
        let s = store();
        let with = compile("dairy_cattle", true, &s).unwrap();
        let without = compile("dairy_cattle", false, &s).unwrap();
        assert_ne!(
            with.get(Stage::Storage, Gas::N2o, Some(ManureType::Slurry))
                .unwrap(),
            without
                .get(Stage::Storage, Gas::N2o, Some(ManureType::Slurry))
                .unwrap()
        );
        assert_eq!(
            with.get(Stage::Storage, Gas::N2o, Some(ManureType::Solid))
                .unwrap(),
            without
                .get(Stage::Storage, Gas::N2o, Some(ManureType::Solid))
                .unwrap()
        );
        assert!(with.is_for("dairy_cattle", true));
        assert!(!with.is_for("dairy_cattle", false));
    }

    #[test]
    fn unknown_animal_compiles_with_missing_slots() {
        let f = compile("alpacas", false, &store()).unwrap();
        assert_eq!(f.category(), "alpacas");
        // Global NO/N2 and digestate factors still resolve.
        assert_eq!(
            f.get(Stage::Storage, Gas::N2, Some(ManureType::Solid))
                .unwrap(),
            0.3
        );
        let err = f
            .get(Stage::Housing, Gas::Nh3, Some(ManureType::Slurry))
            .unwrap_err();
        assert!(matches!(err, FactorError::NotFound { .. }));
        assert!(f.missing().contains(&FactorKey::new(
            Stage::Housing,
            Gas::Nh3,
            Some(ManureType::Slurry)
        )));
    }

    #[test]
    fn no_tables_is_an_error() {
        assert_eq!(
            compile("dairy_cattle", false, &YamlStore::new()).unwrap_err(),
            FactorError::NoFactorTables
        );
    }
}
