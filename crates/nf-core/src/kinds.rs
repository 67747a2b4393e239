//! Domain vocabulary shared by the tables, factor resolver and engine.

use core::fmt;

/// Nitrogen-bearing gases tracked by the inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gas {
    #[cfg_attr(feature = "serde", serde(rename = "NH3"))]
    Nh3,
    #[cfg_attr(feature = "serde", serde(rename = "N2O"))]
    N2o,
    #[cfg_attr(feature = "serde", serde(rename = "NO"))]
    No,
    N2,
}

impl Gas {
    pub const ALL: [Gas; 4] = [Gas::Nh3, Gas::N2o, Gas::No, Gas::N2];

    /// Key used by the emission factor tables.
    pub fn key(self) -> &'static str {
        match self {
            Gas::Nh3 => "NH3",
            Gas::N2o => "N2O",
            Gas::No => "NO",
            Gas::N2 => "N2",
        }
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ManureType {
    Slurry,
    Solid,
}

impl ManureType {
    pub const ALL: [ManureType; 2] = [ManureType::Slurry, ManureType::Solid];

    pub fn key(self) -> &'static str {
        match self {
            ManureType::Slurry => "slurry",
            ManureType::Solid => "solid",
        }
    }
}

impl fmt::Display for ManureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Points of the manure pathway that carry their own emission factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Stage {
    Grazing,
    Yards,
    Housing,
    Storage,
    Application,
    Digestate,
}

impl Stage {
    pub fn key(self) -> &'static str {
        match self {
            Stage::Grazing => "grazing",
            Stage::Yards => "yards",
            Stage::Housing => "housing",
            Stage::Storage => "storage",
            Stage::Application => "application",
            Stage::Digestate => "digestate",
        }
    }

    /// Stages whose factors are split by manure type.
    pub fn is_manure_specific(self) -> bool {
        matches!(self, Stage::Housing | Stage::Storage | Stage::Application)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Field application techniques with their own NH3 factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ApplicationMethod {
    Broadcast,
    TrailingHose,
    TrailingShoe,
    Injection,
    Incorporation,
}

impl ApplicationMethod {
    pub const ALL: [ApplicationMethod; 5] = [
        ApplicationMethod::Broadcast,
        ApplicationMethod::TrailingHose,
        ApplicationMethod::TrailingShoe,
        ApplicationMethod::Injection,
        ApplicationMethod::Incorporation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ApplicationMethod::Broadcast => "broadcast",
            ApplicationMethod::TrailingHose => "trailing_hose",
            ApplicationMethod::TrailingShoe => "trailing_shoe",
            ApplicationMethod::Injection => "injection",
            ApplicationMethod::Incorporation => "incorporation",
        }
    }
}

impl fmt::Display for ApplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_keys_match_table_spelling() {
        let keys: Vec<_> = Gas::ALL.iter().map(|g| g.key()).collect();
        assert_eq!(keys, ["NH3", "N2O", "NO", "N2"]);
    }

    #[test]
    fn only_housing_storage_application_are_manure_specific() {
        assert!(Stage::Housing.is_manure_specific());
        assert!(Stage::Application.is_manure_specific());
        assert!(!Stage::Grazing.is_manure_specific());
        assert!(!Stage::Digestate.is_manure_specific());
    }
}
