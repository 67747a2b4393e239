//! Animal type -> canonical category resolution.
//!
//! Reference tables are keyed by broad categories ("dairy_cattle", "birds")
//! while scenarios name specific subtypes ("dairy_cattle_tied",
//! "laying_hens"). The `animal_conversion` table maps each category to its
//! subtypes.

use core::fmt;

use crate::store::ConfigStore;
use crate::table::Table;
use crate::{TableError, TableResult};

/// Non-fatal: the animal type was not found in the conversion table and is
/// used unchanged for table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionWarning {
    pub animal_type: String,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "animal type '{}' has no category in {}; using it unchanged",
            self.animal_type,
            Table::AnimalConversion
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub category: String,
    pub warning: Option<ResolutionWarning>,
}

/// Keys to try for an animal type: itself, then its plural/singular alternate
/// ("sheep" <-> "sheeps").
pub fn lookup_keys(animal_type: &str) -> Vec<String> {
    let alternate = match animal_type.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{animal_type}s"),
    };
    vec![animal_type.to_string(), alternate]
}

fn find_category(animal_type: &str, store: &dyn ConfigStore) -> Option<String> {
    let candidates = lookup_keys(animal_type);
    let categories = store.keys(Table::AnimalConversion, &[]);

    for candidate in &candidates {
        if categories.iter().any(|c| *c == candidate.as_str()) {
            return Some(candidate.clone());
        }
    }

    for category in &categories {
        let Some(subtypes) = store.get_str_list(Table::AnimalConversion, &[*category]) else {
            continue;
        };
        if subtypes
            .iter()
            .any(|s| candidates.iter().any(|c| c.as_str() == *s))
        {
            return Some((*category).to_string());
        }
    }
    None
}

/// Best-effort category for table lookups. Unknown types come back unchanged
/// with a warning.
pub fn resolve(animal_type: &str, store: &dyn ConfigStore) -> Resolution {
    match find_category(animal_type, store) {
        Some(category) => Resolution {
            category,
            warning: None,
        },
        None => {
            let warning = ResolutionWarning {
                animal_type: animal_type.to_string(),
            };
            tracing::warn!(animal_type, "{warning}");
            Resolution {
                category: animal_type.to_string(),
                warning: Some(warning),
            }
        }
    }
}

/// Category that must exist in the conversion table.
pub fn resolve_strict(animal_type: &str, store: &dyn ConfigStore) -> TableResult<String> {
    find_category(animal_type, store).ok_or_else(|| TableError::InvalidAnimalType {
        animal_type: animal_type.to_string(),
        table: Table::AnimalConversion.name(),
    })
}
