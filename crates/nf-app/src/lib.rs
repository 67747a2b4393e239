//! Service layer for nitroflow.
//!
//! Loads reference tables and scenario files and runs inventories for the
//! CLI frontend.

pub mod error;
pub mod inventory_service;
pub mod scenario;

use std::path::Path;

pub use error::{AppError, AppResult};
pub use inventory_service::{InventoryService, ScenarioRun};
pub use scenario::{ScenarioFile, load_scenario, scenario_from_yaml_str};

use nf_tables::YamlStore;

/// Load every reference table found in `dir`.
pub fn load_tables(dir: &Path) -> AppResult<YamlStore> {
    if !dir.is_dir() {
        return Err(AppError::Tables(format!(
            "Table directory not found: {}",
            dir.display()
        )));
    }
    let store = YamlStore::load_dir(dir)?;
    tracing::debug!(
        dir = %dir.display(),
        tables = store.loaded_tables().len(),
        "reference tables loaded"
    );
    Ok(store)
}
