//! nf-engine: the manure nitrogen flow and its emissions.
//!
//! Nitrogen excreted by a herd is followed through grazing, yards,
//! housing, storage, anaerobic digestion and field application. Each stage
//! derives new flows from upstream ones and removes its gaseous losses,
//! using factors compiled by `nf-factors`.

pub mod engine;
pub mod error;
pub mod params;
pub mod result;
pub mod stages;

pub use engine::{InventoryEngine, InventoryStage};
pub use error::{EngineError, EngineResult};
pub use params::{
    DEFAULT_F_BEDDING_N, DEFAULT_F_IMM, DEFAULT_F_MIN, DEFAULT_F_MIN_DIGESTER, GlobalParams,
    GlobalParamsDef,
};
pub use result::{
    ApplicationManure, ApplicationResult, BiogasResult, ByManure, DigestateResult,
    ExcretionResult, GasEmissions, HousingManure, HousingResult, InventoryResult, MethodEmission,
    NetToSoil, NitrogenFlow, PathwayResult, StorageManure, StorageResult, Totals,
};
