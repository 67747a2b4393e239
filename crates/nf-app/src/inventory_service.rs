//! Running inventories against one set of reference tables.

use std::sync::Arc;

use nf_engine::{GlobalParams, InventoryEngine, InventoryResult, Totals};
use nf_factors::{CompiledFactors, FactorCache};
use nf_input::{BuildOutcome, InventoryParams};
use nf_tables::{Resolution, YamlStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::scenario::ScenarioFile;

/// Results of every herd in a scenario plus their summed emissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub scenario: String,
    pub herds: Vec<InventoryResult>,
    pub totals: Totals,
}

/// Reference tables, global parameters and the compiled factor cache.
///
/// Shared by reference across threads; [`run_batch`] relies on it.
///
/// [`run_batch`]: InventoryService::run_batch
#[derive(Debug)]
pub struct InventoryService {
    store: YamlStore,
    params: GlobalParams,
    cache: FactorCache,
    consistency_check: bool,
}

impl InventoryService {
    pub fn new(store: YamlStore) -> AppResult<Self> {
        let params = GlobalParams::from_store(&store)?;
        Ok(Self {
            store,
            params,
            cache: FactorCache::new(),
            consistency_check: false,
        })
    }

    /// Service configured by a scenario's parameter overrides and check flag.
    pub fn for_scenario(store: YamlStore, scenario: &ScenarioFile) -> AppResult<Self> {
        let mut service = Self::new(store)?;
        if let Some(overrides) = &scenario.parameters {
            let params = service.params.with_overrides(overrides);
            params.validate()?;
            service.params = params;
        }
        service.consistency_check = scenario.consistency_check;
        Ok(service)
    }

    pub fn with_consistency_check(mut self, enabled: bool) -> Self {
        self.consistency_check = enabled;
        self
    }

    pub fn store(&self) -> &YamlStore {
        &self.store
    }

    pub fn params(&self) -> &GlobalParams {
        &self.params
    }

    pub fn resolve(&self, animal_type: &str, strict: bool) -> AppResult<Resolution> {
        if strict {
            let category = nf_tables::resolve_strict(animal_type, &self.store)?;
            Ok(Resolution {
                category,
                warning: None,
            })
        } else {
            Ok(nf_tables::resolve(animal_type, &self.store))
        }
    }

    pub fn validate(&self, params: &InventoryParams) -> AppResult<BuildOutcome> {
        Ok(nf_input::build(params, &self.store)?)
    }

    pub fn factors(&self, animal_type: &str, slurry_crust: bool) -> AppResult<Arc<CompiledFactors>> {
        Ok(self
            .cache
            .get_or_compile(animal_type, slurry_crust, &self.store)?)
    }

    pub fn run(&self, params: &InventoryParams) -> AppResult<InventoryResult> {
        let outcome = self.validate(params)?;
        let factors = self.factors(&outcome.record.animal_type, outcome.record.slurry_crust)?;
        let engine = InventoryEngine::new(self.params).with_consistency_check(self.consistency_check);
        Ok(engine.run(&outcome, &factors)?)
    }

    /// Run independent herds in parallel; results keep the input order.
    pub fn run_batch(&self, herds: &[InventoryParams]) -> Vec<AppResult<InventoryResult>> {
        herds.par_iter().map(|params| self.run(params)).collect()
    }

    /// Run every herd of a scenario; the first failing herd fails the run.
    pub fn run_scenario(&self, scenario: &ScenarioFile) -> AppResult<ScenarioRun> {
        let herds = self
            .run_batch(&scenario.herds)
            .into_iter()
            .collect::<AppResult<Vec<_>>>()?;
        let totals: Totals = herds.iter().map(|r| r.totals).sum();
        tracing::info!(
            scenario = %scenario.name,
            herds = herds.len(),
            "scenario inventory complete"
        );
        Ok(ScenarioRun {
            scenario: scenario.name.clone(),
            herds,
            totals,
        })
    }
}
