//! Config store: `get(table, key_path) -> value | absent`.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value;

use crate::table::Table;
use crate::{TableError, TableResult};

/// Read-only access to parsed reference tables.
///
/// Implementations are shared across threads once populated, so they must
/// not rely on interior mutability for lookups.
pub trait ConfigStore: Send + Sync {
    /// Root value of a table, if the table was loaded.
    fn table(&self, table: Table) -> Option<&Value>;

    fn has_table(&self, table: Table) -> bool {
        self.table(table).is_some()
    }

    /// Walk mapping keys along `path`. Any missing or non-mapping step is absent.
    fn get(&self, table: Table, path: &[&str]) -> Option<&Value> {
        let mut node = self.table(table)?;
        for key in path {
            node = node.as_mapping()?.get(*key)?;
        }
        Some(node)
    }

    fn get_f64(&self, table: Table, path: &[&str]) -> Option<f64> {
        self.get(table, path).and_then(Value::as_f64)
    }

    /// Sequence of strings at `path`. Non-string entries are skipped.
    fn get_str_list(&self, table: Table, path: &[&str]) -> Option<Vec<&str>> {
        let seq = self.get(table, path)?.as_sequence()?;
        Some(seq.iter().filter_map(Value::as_str).collect())
    }

    /// String keys of the mapping at `path` (empty path = top level).
    fn keys(&self, table: Table, path: &[&str]) -> Vec<&str> {
        self.get(table, path)
            .and_then(Value::as_mapping)
            .map(|m| m.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Tables parsed from YAML documents.
#[derive(Debug, Clone, Default)]
pub struct YamlStore {
    tables: HashMap<Table, Value>,
}

impl YamlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<table>.yaml` present in `dir`. Absent files leave the table unset.
    pub fn load_dir(dir: &Path) -> TableResult<Self> {
        let mut store = Self::new();
        for table in Table::ALL {
            let path = dir.join(table.file_name());
            if !path.exists() {
                tracing::debug!(table = table.name(), path = %path.display(), "table file absent");
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|source| TableError::Read {
                path: path.clone(),
                source,
            })?;
            store.insert_yaml(table, &content)?;
        }
        tracing::debug!(
            dir = %dir.display(),
            loaded = store.tables.len(),
            "reference tables loaded"
        );
        Ok(store)
    }

    pub fn from_tables<'a>(tables: impl IntoIterator<Item = (Table, &'a str)>) -> TableResult<Self> {
        let mut store = Self::new();
        for (table, src) in tables {
            store.insert_yaml(table, src)?;
        }
        Ok(store)
    }

    pub fn insert_yaml(&mut self, table: Table, src: &str) -> TableResult<()> {
        let value: Value = serde_yaml::from_str(src).map_err(|source| TableError::Parse {
            table: table.name(),
            source,
        })?;
        self.insert_value(table, value)
    }

    pub fn insert_value(&mut self, table: Table, value: Value) -> TableResult<()> {
        if !value.is_mapping() {
            return Err(TableError::NotAMapping {
                table: table.name(),
            });
        }
        self.tables.insert(table, value);
        Ok(())
    }

    pub fn loaded_tables(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = self.tables.keys().copied().collect();
        tables.sort();
        tables
    }
}

impl ConfigStore for YamlStore {
    fn table(&self, table: Table) -> Option<&Value> {
        self.tables.get(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> YamlStore {
        YamlStore::from_tables([
            (
                Table::EfNh3,
                "slurry:\n  housing:\n    dairy_cattle: 0.24\n    pigs: 0.27\ngrazing:\n  dairy_cattle: 0.1\n",
            ),
            (
                Table::AnimalConversion,
                "birds: [laying_hens, broilers]\ngoats: []\n",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn get_walks_nested_keys() {
        let s = store();
        assert_eq!(
            s.get_f64(Table::EfNh3, &["slurry", "housing", "pigs"]),
            Some(0.27)
        );
        assert_eq!(s.get_f64(Table::EfNh3, &["grazing", "dairy_cattle"]), Some(0.1));
    }

    #[test]
    fn missing_steps_are_absent() {
        let s = store();
        assert!(s.get(Table::EfNh3, &["solid", "housing", "pigs"]).is_none());
        assert!(s.get(Table::EfNh3, &["grazing", "dairy_cattle", "x"]).is_none());
        assert!(s.get(Table::EfN2o, &["dairy_cattle"]).is_none());
    }

    #[test]
    fn str_lists_and_keys() {
        let s = store();
        assert_eq!(
            s.get_str_list(Table::AnimalConversion, &["birds"]),
            Some(vec!["laying_hens", "broilers"])
        );
        let mut keys = s.keys(Table::AnimalConversion, &[]);
        keys.sort();
        assert_eq!(keys, ["birds", "goats"]);
    }

    #[test]
    fn integer_values_read_as_f64() {
        let s = YamlStore::from_tables([(
            Table::LivestockExcretion,
            "dairy_cattle:\n  excretion_coefficient: 105\n",
        )])
        .unwrap();
        assert_eq!(
            s.get_f64(
                Table::LivestockExcretion,
                &["dairy_cattle", "excretion_coefficient"]
            ),
            Some(105.0)
        );
    }

    #[test]
    fn non_mapping_table_is_rejected() {
        let err = YamlStore::from_tables([(Table::Bedding, "- 1\n- 2\n")]).unwrap_err();
        assert!(matches!(err, TableError::NotAMapping { table: "bedding" }));
    }
}
