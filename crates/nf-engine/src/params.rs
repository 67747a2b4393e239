//! Global model parameters.

use nf_core::{Real, ensure_fraction};
use nf_tables::{ConfigStore, Table};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Fraction of bedding TAN immobilised, per kg of bedding.
pub const DEFAULT_F_IMM: Real = 0.0067;
/// Share of organic N mineralised in slurry storage.
pub const DEFAULT_F_MIN: Real = 0.1;
/// Share of organic N mineralised in the digester.
pub const DEFAULT_F_MIN_DIGESTER: Real = 0.2;
/// kg N per kg of bedding material.
pub const DEFAULT_F_BEDDING_N: Real = 0.004;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalParams {
    pub f_imm: Real,
    pub f_min: Real,
    pub f_min_digester: Real,
    pub f_bedding_n: Real,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            f_imm: DEFAULT_F_IMM,
            f_min: DEFAULT_F_MIN,
            f_min_digester: DEFAULT_F_MIN_DIGESTER,
            f_bedding_n: DEFAULT_F_BEDDING_N,
        }
    }
}

/// Partial override of [`GlobalParams`], as written in scenario files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalParamsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_imm: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_min: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_min_digester: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_bedding_n: Option<Real>,
}

impl GlobalParams {
    /// Defaults overridden by whatever the `global_parameters` table sets.
    pub fn from_store(store: &dyn ConfigStore) -> EngineResult<Self> {
        let get = |name: &str| store.get_f64(Table::GlobalParameters, &[name]);
        let params = Self::default().with_overrides(&GlobalParamsDef {
            f_imm: get("f_imm"),
            f_min: get("f_min"),
            f_min_digester: get("f_min_digester"),
            f_bedding_n: get("f_bedding_n"),
        });
        params.validate()?;
        Ok(params)
    }

    pub fn with_overrides(mut self, def: &GlobalParamsDef) -> Self {
        if let Some(v) = def.f_imm {
            self.f_imm = v;
        }
        if let Some(v) = def.f_min {
            self.f_min = v;
        }
        if let Some(v) = def.f_min_digester {
            self.f_min_digester = v;
        }
        if let Some(v) = def.f_bedding_n {
            self.f_bedding_n = v;
        }
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        ensure_fraction(self.f_imm, "f_imm")?;
        ensure_fraction(self.f_min, "f_min")?;
        ensure_fraction(self.f_min_digester, "f_min_digester")?;
        ensure_fraction(self.f_bedding_n, "f_bedding_n")?;
        Ok(())
    }
}
