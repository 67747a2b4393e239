//! Compiled factor cache shared across runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use nf_tables::ConfigStore;

use crate::FactorResult;
use crate::compiled::{CompiledFactors, compile};

type CacheKey = (String, bool);

/// Compiled factors keyed by animal type and crust flag.
///
/// Lookups take the read lock; a miss compiles outside any lock and then
/// inserts under the write lock. Two threads racing on the same key both
/// compile, and the first insert wins.
#[derive(Debug, Default)]
pub struct FactorCache {
    entries: RwLock<HashMap<CacheKey, Arc<CompiledFactors>>>,
}

impl FactorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &self,
        animal_type: &str,
        slurry_crust: bool,
        store: &dyn ConfigStore,
    ) -> FactorResult<Arc<CompiledFactors>> {
        let key = (animal_type.to_string(), slurry_crust);
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = entries.get(&key) {
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = Arc::new(compile(animal_type, slurry_crust, store)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(compiled)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, e.g. after the reference tables were reloaded.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_tables::{Table, YamlStore};

    fn store() -> YamlStore {
        YamlStore::from_tables([
            (Table::EfNh3, "grazing: { pigs: 0.3 }\n"),
            (
                Table::EfN2o,
                "pigs: { slurry_with_crust: 0.005, slurry_without_crust: 0.0 }\n",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn same_key_returns_same_entry() {
        let cache = FactorCache::new();
        let s = store();
        let a = cache.get_or_compile("pigs", true, &s).unwrap();
        let b = cache.get_or_compile("pigs", true, &s).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn crust_flag_is_part_of_the_key() {
        let cache = FactorCache::new();
        let s = store();
        let a = cache.get_or_compile("pigs", true, &s).unwrap();
        let b = cache.get_or_compile("pigs", false, &s).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(b.is_for("pigs", false));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_lookups_share_the_cache() {
        let cache = FactorCache::new();
        let s = store();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    cache.get_or_compile("pigs", false, &s).unwrap();
                });
            }
        });
        assert_eq!(cache.len(), 1);
    }
}
