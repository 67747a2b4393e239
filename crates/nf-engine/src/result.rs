//! Result tree of one inventory run.
//!
//! Every quantity is in kg N per year. Flows carry both total N and its
//! TAN share; emissions are plain scalars.

use std::ops::{Add, Sub};

use nf_core::{ApplicationMethod, Gas, ManureType, Real};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NitrogenFlow {
    pub n: Real,
    pub tan: Real,
}

impl NitrogenFlow {
    pub fn new(n: Real, tan: Real) -> Self {
        Self { n, tan }
    }

    pub fn scaled(self, fraction: Real) -> Self {
        Self::new(self.n * fraction, self.tan * fraction)
    }

    /// Remove an emitted amount from both N and TAN.
    pub fn less(self, emitted: Real) -> Self {
        Self::new(self.n - emitted, self.tan - emitted)
    }
}

impl Add for NitrogenFlow {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.n + rhs.n, self.tan + rhs.tan)
    }
}

impl Sub for NitrogenFlow {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.n - rhs.n, self.tan - rhs.tan)
    }
}

/// Slurry and solid values side by side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ByManure<T> {
    pub slurry: T,
    pub solid: T,
}

impl<T> ByManure<T> {
    pub fn get(&self, manure: ManureType) -> &T {
        match manure {
            ManureType::Slurry => &self.slurry,
            ManureType::Solid => &self.solid,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GasEmissions {
    pub nh3: Real,
    pub n2o: Real,
    pub no: Real,
    pub n2: Real,
    pub total: Real,
}

impl GasEmissions {
    pub fn new(nh3: Real, n2o: Real, no: Real, n2: Real) -> Self {
        Self {
            nh3,
            n2o,
            no,
            n2,
            total: nh3 + n2o + no + n2,
        }
    }

    pub fn get(&self, gas: Gas) -> Real {
        match gas {
            Gas::Nh3 => self.nh3,
            Gas::N2o => self.n2o,
            Gas::No => self.no,
            Gas::N2 => self.n2,
        }
    }
}

impl Add for GasEmissions {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.nh3 + rhs.nh3,
            self.n2o + rhs.n2o,
            self.no + rhs.no,
            self.n2 + rhs.n2,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExcretionResult {
    pub total: NitrogenFlow,
    pub grazing: NitrogenFlow,
    pub yards: NitrogenFlow,
    pub housing: NitrogenFlow,
}

/// Grazing or yards: a single emission off an allocated flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathwayResult {
    pub excreted: NitrogenFlow,
    pub nh3: Real,
    pub remaining: NitrogenFlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HousingManure {
    pub deposit: NitrogenFlow,
    pub nh3: Real,
    /// Flow leaving the house; for solid manure this includes bedding.
    pub outflow: NitrogenFlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HousingResult {
    pub slurry: HousingManure,
    pub solid: HousingManure,
    pub nh3: Real,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageManure {
    pub inflow: NitrogenFlow,
    /// Pool the storage factors act on (after mineralisation for slurry).
    pub pool: NitrogenFlow,
    pub emissions: GasEmissions,
    pub outflow: NitrogenFlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageResult {
    /// Manure leaving housing (slurry also carries the yards outflow).
    pub base: ByManure<NitrogenFlow>,
    pub slurry: StorageManure,
    pub solid: StorageManure,
    pub emissions: GasEmissions,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiogasResult {
    pub slurry: NitrogenFlow,
    pub solid: NitrogenFlow,
    pub total: NitrogenFlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DigestateResult {
    pub input: NitrogenFlow,
    pub nh3: Real,
    pub output: NitrogenFlow,
}

/// Emission of one application method, or of the unassigned share
/// when `method` is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodEmission {
    pub method: Option<ApplicationMethod>,
    pub share: Real,
    pub ef: Real,
    pub nh3: Real,
    pub tan_after: Real,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationManure {
    pub applied: NitrogenFlow,
    pub methods: Vec<MethodEmission>,
    pub nh3: Real,
    pub after: NitrogenFlow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub slurry: ApplicationManure,
    pub solid: ApplicationManure,
    pub nh3: Real,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetToSoil {
    pub grazing: NitrogenFlow,
    pub slurry: NitrogenFlow,
    pub solid: NitrogenFlow,
    pub total: NitrogenFlow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub nh3: Real,
    pub n2o: Real,
    pub no: Real,
    pub n2: Real,
    pub gaseous: Real,
}

impl Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            nh3: self.nh3 + rhs.nh3,
            n2o: self.n2o + rhs.n2o,
            no: self.no + rhs.no,
            n2: self.n2 + rhs.n2,
            gaseous: self.gaseous + rhs.gaseous,
        }
    }
}

impl std::iter::Sum for Totals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryResult {
    pub animal_type: String,
    pub category: String,
    pub animal_number: u64,
    pub excretion: ExcretionResult,
    pub grazing: PathwayResult,
    pub yards: PathwayResult,
    pub housing: HousingResult,
    pub storage: StorageResult,
    pub biogas: BiogasResult,
    pub digestate: DigestateResult,
    pub direct_application: ByManure<NitrogenFlow>,
    pub application: ApplicationResult,
    pub net_to_soil: NetToSoil,
    pub totals: Totals,
}

impl InventoryResult {
    /// Every named flow with the stage that produced it, in run order.
    pub fn flows(&self) -> Vec<(crate::InventoryStage, String, NitrogenFlow)> {
        use crate::InventoryStage as S;

        let mut out = vec![
            (S::Excretion, "excretion.total".to_string(), self.excretion.total),
            (S::Allocation, "excretion.grazing".into(), self.excretion.grazing),
            (S::Allocation, "excretion.yards".into(), self.excretion.yards),
            (S::Allocation, "excretion.housing".into(), self.excretion.housing),
            (S::Allocation, "grazing.remaining".into(), self.grazing.remaining),
            (S::Allocation, "yards.remaining".into(), self.yards.remaining),
        ];
        for manure in ManureType::ALL {
            let housing = match manure {
                ManureType::Slurry => &self.housing.slurry,
                ManureType::Solid => &self.housing.solid,
            };
            let storage = match manure {
                ManureType::Slurry => &self.storage.slurry,
                ManureType::Solid => &self.storage.solid,
            };
            let application = match manure {
                ManureType::Slurry => &self.application.slurry,
                ManureType::Solid => &self.application.solid,
            };
            out.push((S::HousingDeposit, format!("housing.{manure}.deposit"), housing.deposit));
            out.push((S::BeddingAdjustment, format!("housing.{manure}.outflow"), housing.outflow));
            out.push((S::Storage, format!("storage.{manure}.inflow"), storage.inflow));
            out.push((S::StorageMineralization, format!("storage.{manure}.pool"), storage.pool));
            out.push((S::StorageEmission, format!("storage.{manure}.outflow"), storage.outflow));
            out.push((S::Split, format!("biogas.{manure}"), *self.biogas_flow(manure)));
            out.push((
                S::Split,
                format!("direct_application.{manure}"),
                *self.direct_application.get(manure),
            ));
            out.push((S::FieldApplication, format!("application.{manure}.applied"), application.applied));
            out.push((S::FieldApplication, format!("application.{manure}.after"), application.after));
        }
        out.push((S::Digestate, "digestate.output".into(), self.digestate.output));
        out.push((S::NetToSoil, "net_to_soil.total".into(), self.net_to_soil.total));
        out
    }

    fn biogas_flow(&self, manure: ManureType) -> &NitrogenFlow {
        match manure {
            ManureType::Slurry => &self.biogas.slurry,
            ManureType::Solid => &self.biogas.solid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_arithmetic() {
        let a = NitrogenFlow::new(100.0, 60.0);
        let b = NitrogenFlow::new(10.0, 5.0);
        assert_eq!(a + b, NitrogenFlow::new(110.0, 65.0));
        assert_eq!(a - b, NitrogenFlow::new(90.0, 55.0));
        assert_eq!(a.scaled(0.5), NitrogenFlow::new(50.0, 30.0));
        assert_eq!(a.less(6.0), NitrogenFlow::new(94.0, 54.0));
    }

    #[test]
    fn gas_total_is_sum_of_gases() {
        let e = GasEmissions::new(1.0, 0.5, 0.25, 2.0);
        assert_eq!(e.total, 3.75);
        assert_eq!(e.get(Gas::N2), 2.0);
        let sum = e + e;
        assert_eq!(sum.total, 7.5);
    }
}
