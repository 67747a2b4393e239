//! Stage-by-stage inventory run.

use std::fmt;

use nf_core::{
    FLOW_NEGATIVE_TOL, FRACTION_SUM_TOL, Gas, ManureType, Real, Stage, Tolerances, nearly_equal,
};
use nf_factors::CompiledFactors;
use nf_input::{BuildOutcome, InputRecord, ValidationIssue};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::params::GlobalParams;
use crate::result::*;
use crate::stages;

/// Run stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStage {
    Excretion,
    Allocation,
    HousingDeposit,
    HousingEmission,
    BeddingAdjustment,
    Storage,
    StorageMineralization,
    StorageEmission,
    Split,
    Digestate,
    FieldApplication,
    NetToSoil,
    Totals,
}

impl InventoryStage {
    pub const ALL: [InventoryStage; 13] = [
        InventoryStage::Excretion,
        InventoryStage::Allocation,
        InventoryStage::HousingDeposit,
        InventoryStage::HousingEmission,
        InventoryStage::BeddingAdjustment,
        InventoryStage::Storage,
        InventoryStage::StorageMineralization,
        InventoryStage::StorageEmission,
        InventoryStage::Split,
        InventoryStage::Digestate,
        InventoryStage::FieldApplication,
        InventoryStage::NetToSoil,
        InventoryStage::Totals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InventoryStage::Excretion => "excretion",
            InventoryStage::Allocation => "allocation",
            InventoryStage::HousingDeposit => "housing_deposit",
            InventoryStage::HousingEmission => "housing_emission",
            InventoryStage::BeddingAdjustment => "bedding_adjustment",
            InventoryStage::Storage => "storage",
            InventoryStage::StorageMineralization => "storage_mineralization",
            InventoryStage::StorageEmission => "storage_emission",
            InventoryStage::Split => "split",
            InventoryStage::Digestate => "digestate",
            InventoryStage::FieldApplication => "field_application",
            InventoryStage::NetToSoil => "net_to_soil",
            InventoryStage::Totals => "totals",
        }
    }
}

impl fmt::Display for InventoryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record values every stage needs, all present.
struct Inputs {
    animal_number: u64,
    excretion_coefficient: Real,
    fraction_grazing: Real,
    fraction_yards: Real,
    fraction_housing: Real,
    fraction_tan: Real,
    fraction_manure: ByManure<Real>,
    fraction_storage: ByManure<Real>,
    fraction_biogas: ByManure<Real>,
    bedding_amount: Real,
}

fn require(value: Option<Real>, field: &'static str) -> EngineResult<Real> {
    value.ok_or(EngineError::MissingInput { field })
}

/// Storage and biogas shares are only read for manure that is produced;
/// unset shares of absent manure route nothing.
fn routing(
    fraction_manure: Real,
    value: Option<Real>,
    field: &'static str,
) -> EngineResult<Real> {
    if fraction_manure > 0.0 {
        require(value, field)
    } else {
        Ok(value.unwrap_or(0.0))
    }
}

impl Inputs {
    fn from_record(record: &InputRecord) -> EngineResult<Self> {
        let animal_number = record
            .animal_number
            .ok_or(EngineError::MissingInput {
                field: "animal_number",
            })?;
        let fraction_slurry = require(record.fraction_manure_slurry, "fraction_manure_slurry")?;
        let fraction_solid = require(record.fraction_manure_solid, "fraction_manure_solid")?;
        let bedding_amount = if fraction_solid > 0.0 {
            require(record.bedding_amount, "bedding_amount")?
        } else {
            record.bedding_amount.unwrap_or(0.0)
        };

        Ok(Self {
            animal_number,
            excretion_coefficient: require(
                record.excretion_coefficient,
                "excretion_coefficient",
            )?,
            fraction_grazing: require(record.fraction_grazing, "fraction_grazing")?,
            fraction_yards: require(record.fraction_yards, "fraction_yards")?,
            fraction_housing: require(record.fraction_housing, "fraction_housing")?,
            fraction_tan: require(record.fraction_tan, "fraction_TAN")?,
            fraction_manure: ByManure {
                slurry: fraction_slurry,
                solid: fraction_solid,
            },
            fraction_storage: ByManure {
                slurry: routing(
                    fraction_slurry,
                    record.fraction_storage_slurry,
                    "fraction_storage_slurry",
                )?,
                solid: routing(
                    fraction_solid,
                    record.fraction_storage_solid,
                    "fraction_storage_solid",
                )?,
            },
            fraction_biogas: ByManure {
                slurry: routing(
                    fraction_slurry,
                    record.fraction_biogas_slurry,
                    "fraction_biogas_slurry",
                )?,
                solid: routing(
                    fraction_solid,
                    record.fraction_biogas_solid,
                    "fraction_biogas_solid",
                )?,
            },
            bedding_amount,
        })
    }
}

fn invalid_record(animal_type: &str, issues: &[ValidationIssue]) -> EngineError {
    EngineError::InvalidRecord {
        animal_type: animal_type.to_string(),
        report: issues
            .iter()
            .map(|issue| format!("- {issue}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Flow allocated from total excretion, with TAN taken from its own N.
fn allocated(total_n: Real, fraction: Real, fraction_tan: Real) -> NitrogenFlow {
    let n = stages::allocate(total_n, fraction);
    NitrogenFlow::new(n, stages::tan(n, fraction_tan))
}

/// Runs the manure nitrogen flow for one input record.
///
/// The engine holds no state between runs: the same record and factors
/// always give the same [`InventoryResult`].
#[derive(Clone, Debug, Default)]
pub struct InventoryEngine {
    params: GlobalParams,
    consistency_check: bool,
}

impl InventoryEngine {
    pub fn new(params: GlobalParams) -> Self {
        Self {
            params,
            consistency_check: false,
        }
    }

    /// Verify non-negative flows and the excretion allocation after the run.
    pub fn with_consistency_check(mut self, enabled: bool) -> Self {
        self.consistency_check = enabled;
        self
    }

    pub fn params(&self) -> &GlobalParams {
        &self.params
    }

    pub fn consistency_check(&self) -> bool {
        self.consistency_check
    }

    pub fn run(
        &self,
        outcome: &BuildOutcome,
        factors: &CompiledFactors,
    ) -> EngineResult<InventoryResult> {
        if !outcome.is_valid() {
            return Err(invalid_record(&outcome.record.animal_type, &outcome.issues));
        }
        self.run_record(&outcome.record, factors)
    }

    /// Run on a bare record; it is validated again first.
    pub fn run_record(
        &self,
        record: &InputRecord,
        factors: &CompiledFactors,
    ) -> EngineResult<InventoryResult> {
        let issues = nf_input::validate(record);
        if !issues.is_empty() {
            return Err(invalid_record(&record.animal_type, &issues));
        }
        if !factors.is_for(&record.animal_type, record.slurry_crust) {
            return Err(EngineError::FactorMismatch {
                record_animal: record.animal_type.clone(),
                record_crust: record.slurry_crust,
                factors_animal: factors.animal_type().to_string(),
                factors_crust: factors.slurry_crust(),
            });
        }
        self.params.validate()?;
        let input = Inputs::from_record(record)?;
        let p = &self.params;

        enter(InventoryStage::Excretion);
        let total_n = stages::excretion_total(input.animal_number, input.excretion_coefficient);
        let animals = input.animal_number as Real;

        enter(InventoryStage::Allocation);
        let excretion = ExcretionResult {
            total: NitrogenFlow::new(total_n, stages::tan(total_n, input.fraction_tan)),
            grazing: allocated(total_n, input.fraction_grazing, input.fraction_tan),
            yards: allocated(total_n, input.fraction_yards, input.fraction_tan),
            housing: allocated(total_n, input.fraction_housing, input.fraction_tan),
        };
        let grazing = pathway(
            excretion.grazing,
            factors.get(Stage::Grazing, Gas::Nh3, None)?,
        );
        let yards = pathway(excretion.yards, factors.get(Stage::Yards, Gas::Nh3, None)?);

        enter(InventoryStage::HousingDeposit);
        let deposit = ByManure {
            slurry: excretion.housing.scaled(input.fraction_manure.slurry),
            solid: excretion.housing.scaled(input.fraction_manure.solid),
        };

        enter(InventoryStage::HousingEmission);
        let housing_nh3 = ByManure {
            slurry: stages::emission(
                deposit.slurry.tan,
                factors.get(Stage::Housing, Gas::Nh3, Some(ManureType::Slurry))?,
            ),
            solid: stages::emission(
                deposit.solid.tan,
                factors.get(Stage::Housing, Gas::Nh3, Some(ManureType::Solid))?,
            ),
        };

        enter(InventoryStage::BeddingAdjustment);
        let solid_out = NitrogenFlow::new(
            stages::ex_housing_solid_n(
                deposit.solid.n,
                housing_nh3.solid,
                animals,
                input.fraction_manure.solid,
                input.bedding_amount,
                p.f_bedding_n,
            ),
            stages::ex_housing_solid_tan(
                deposit.solid.tan,
                housing_nh3.solid,
                animals,
                input.fraction_manure.solid,
                input.bedding_amount,
                p.f_imm,
            ),
        );
        let housing = HousingResult {
            slurry: HousingManure {
                deposit: deposit.slurry,
                nh3: housing_nh3.slurry,
                outflow: deposit.slurry.less(housing_nh3.slurry),
            },
            solid: HousingManure {
                deposit: deposit.solid,
                nh3: housing_nh3.solid,
                outflow: solid_out,
            },
            nh3: housing_nh3.slurry + housing_nh3.solid,
        };

        enter(InventoryStage::Storage);
        let base = ByManure {
            slurry: housing.slurry.outflow + yards.remaining,
            solid: housing.solid.outflow,
        };
        let storage_in = ByManure {
            slurry: base.slurry.scaled(input.fraction_storage.slurry),
            solid: base.solid.scaled(input.fraction_storage.solid),
        };
        let biogas_in = ByManure {
            slurry: base.slurry.scaled(input.fraction_biogas.slurry),
            solid: base.solid.scaled(input.fraction_biogas.solid),
        };

        enter(InventoryStage::StorageMineralization);
        let pool = ByManure {
            slurry: NitrogenFlow::new(
                storage_in.slurry.n,
                stages::mineralize(storage_in.slurry.tan, storage_in.slurry.n, p.f_min),
            ),
            solid: storage_in.solid,
        };

        enter(InventoryStage::StorageEmission);
        let slurry_store = stored(ManureType::Slurry, storage_in.slurry, pool.slurry, factors)?;
        let solid_store = stored(ManureType::Solid, storage_in.solid, pool.solid, factors)?;
        let storage = StorageResult {
            base,
            emissions: slurry_store.emissions + solid_store.emissions,
            slurry: slurry_store,
            solid: solid_store,
        };

        enter(InventoryStage::Split);
        let direct_application = ByManure {
            slurry: direct(
                storage_in.slurry + biogas_in.slurry,
                input.fraction_storage.slurry,
                input.fraction_biogas.slurry,
            )?,
            solid: direct(
                storage_in.solid + biogas_in.solid,
                input.fraction_storage.solid,
                input.fraction_biogas.solid,
            )?,
        };
        let biogas = BiogasResult {
            slurry: biogas_in.slurry,
            solid: biogas_in.solid,
            total: biogas_in.slurry + biogas_in.solid,
        };

        enter(InventoryStage::Digestate);
        let ef_digestate = factors.get(Stage::Digestate, Gas::Nh3, None)?;
        let digestate = DigestateResult {
            input: biogas.total,
            nh3: stages::digestate_nh3(biogas.total.n, ef_digestate),
            output: stages::digestate(biogas.total, p.f_min_digester, ef_digestate),
        };

        enter(InventoryStage::FieldApplication);
        let slurry_applied =
            direct_application.slurry + storage.slurry.outflow + digestate.output;
        let solid_applied = direct_application.solid + storage.solid.outflow;
        let slurry_app = applied(ManureType::Slurry, slurry_applied, record, factors)?;
        let solid_app = applied(ManureType::Solid, solid_applied, record, factors)?;
        let application = ApplicationResult {
            nh3: slurry_app.nh3 + solid_app.nh3,
            slurry: slurry_app,
            solid: solid_app,
        };

        enter(InventoryStage::NetToSoil);
        let net_to_soil = NetToSoil {
            grazing: grazing.remaining,
            slurry: application.slurry.after,
            solid: application.solid.after,
            total: grazing.remaining + application.slurry.after + application.solid.after,
        };

        enter(InventoryStage::Totals);
        let nh3 = grazing.nh3
            + yards.nh3
            + housing.nh3
            + storage.emissions.nh3
            + application.nh3
            + digestate.nh3;
        let totals = Totals {
            nh3,
            n2o: storage.emissions.n2o,
            no: storage.emissions.no,
            n2: storage.emissions.n2,
            gaseous: nh3 + storage.emissions.n2o + storage.emissions.no + storage.emissions.n2,
        };

        let result = InventoryResult {
            animal_type: record.animal_type.clone(),
            category: record.category.clone(),
            animal_number: input.animal_number,
            excretion,
            grazing,
            yards,
            housing,
            storage,
            biogas,
            digestate,
            direct_application,
            application,
            net_to_soil,
            totals,
        };

        if self.consistency_check {
            check_consistency(&result)?;
        }

        tracing::debug!(
            animal_type = %result.animal_type,
            nh3 = result.totals.nh3,
            gaseous = result.totals.gaseous,
            "inventory run complete"
        );
        Ok(result)
    }
}

fn enter(stage: InventoryStage) {
    tracing::debug!(stage = %stage, "inventory stage");
}

fn pathway(excreted: NitrogenFlow, ef: Real) -> PathwayResult {
    let nh3 = stages::emission(excreted.tan, ef);
    PathwayResult {
        excreted,
        nh3,
        remaining: excreted.less(nh3),
    }
}

fn stored(
    manure: ManureType,
    inflow: NitrogenFlow,
    pool: NitrogenFlow,
    factors: &CompiledFactors,
) -> EngineResult<StorageManure> {
    let ef = |gas| factors.get(Stage::Storage, gas, Some(manure));
    let emissions = stages::storage_emissions(
        pool.tan,
        ef(Gas::Nh3)?,
        ef(Gas::N2o)?,
        ef(Gas::No)?,
        ef(Gas::N2)?,
    );
    Ok(StorageManure {
        inflow,
        pool,
        emissions,
        outflow: pool.less(emissions.total),
    })
}

fn direct(diverted: NitrogenFlow, storage: Real, biogas: Real) -> EngineResult<NitrogenFlow> {
    Ok(NitrogenFlow::new(
        stages::direct_application(diverted.n, storage, biogas)?,
        stages::direct_application(diverted.tan, storage, biogas)?,
    ))
}

fn applied(
    manure: ManureType,
    applied: NitrogenFlow,
    record: &InputRecord,
    factors: &CompiledFactors,
) -> EngineResult<ApplicationManure> {
    let methods = stages::field_application(
        applied.tan,
        record.application.for_manure(manure),
        |method| Ok(factors.method(manure, method)?),
        || Ok(factors.get(Stage::Application, Gas::Nh3, Some(manure))?),
    )?;
    let nh3: Real = methods.iter().map(|m| m.nh3).sum();
    let tan_after: Real = methods.iter().map(|m| m.tan_after).sum();
    Ok(ApplicationManure {
        applied,
        methods,
        nh3,
        after: NitrogenFlow::new(applied.n - nh3, tan_after),
    })
}

fn check_consistency(result: &InventoryResult) -> EngineResult<()> {
    let allocated = result.excretion.grazing.n + result.excretion.yards.n + result.excretion.housing.n;
    let tol = Tolerances {
        rel: FRACTION_SUM_TOL,
        ..Tolerances::default()
    };
    if !nearly_equal(allocated, result.excretion.total.n, tol) {
        return Err(EngineError::MassBalanceViolation {
            stage: InventoryStage::Allocation,
            flow: "excretion_allocation".to_string(),
            value: allocated - result.excretion.total.n,
        });
    }

    for (stage, name, flow) in result.flows() {
        for (part, value) in [("n", flow.n), ("tan", flow.tan)] {
            if !value.is_finite() || value < -FLOW_NEGATIVE_TOL {
                return Err(EngineError::MassBalanceViolation {
                    stage,
                    flow: format!("{name}.{part}"),
                    value,
                });
            }
        }
    }
    Ok(())
}
