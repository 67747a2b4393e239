//! nf-tables: read-only reference tables and animal type resolution.
//!
//! The inventory core never parses files itself. It talks to a
//! [`ConfigStore`], which answers `get(table, key_path)` lookups over
//! already-parsed YAML trees. [`YamlStore`] is the file-backed store used by
//! the service layer and the tests.

pub mod resolve;
pub mod store;
pub mod table;

pub use resolve::{Resolution, ResolutionWarning, lookup_keys, resolve, resolve_strict};
pub use store::{ConfigStore, YamlStore};
pub use table::Table;

pub type TableResult<T> = Result<T, TableError>;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("Invalid animal type '{animal_type}': not listed in the {table} table")]
    InvalidAnimalType {
        animal_type: String,
        table: &'static str,
    },

    #[error("Failed to read table file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse table {table}: {source}")]
    Parse {
        table: &'static str,
        source: serde_yaml::Error,
    },

    #[error("Table {table} must be a mapping at the top level")]
    NotAMapping { table: &'static str },
}
