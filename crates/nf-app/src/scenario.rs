//! Scenario files: a set of herds run against the same reference tables.

use std::path::Path;

use nf_engine::GlobalParamsDef;
use nf_input::InventoryParams;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub name: String,
    /// Overrides of the global parameters table for this scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<GlobalParamsDef>,
    #[serde(default)]
    pub consistency_check: bool,
    pub herds: Vec<InventoryParams>,
}

pub fn scenario_from_yaml_str(src: &str) -> AppResult<ScenarioFile> {
    let scenario: ScenarioFile = serde_yaml::from_str(src)
        .map_err(|e| AppError::Scenario(format!("Failed to parse scenario YAML: {}", e)))?;
    if scenario.herds.is_empty() {
        return Err(AppError::Scenario(format!(
            "Scenario '{}' must have at least one herd",
            scenario.name
        )));
    }
    Ok(scenario)
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> AppResult<ScenarioFile> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    scenario_from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides_and_herds() {
        let s = scenario_from_yaml_str(
            "\
name: test
parameters:
  f_min: 0.2
herds:
  - animal_type: pigs
    animal_number: 10
",
        )
        .unwrap();
        assert_eq!(s.name, "test");
        assert_eq!(s.parameters.unwrap().f_min, Some(0.2));
        assert!(!s.consistency_check);
        assert_eq!(s.herds[0].animal_number, Some(10));
    }

    #[test]
    fn empty_herd_list_rejected() {
        assert!(matches!(
            scenario_from_yaml_str("name: empty\nherds: []\n"),
            Err(AppError::Scenario(_))
        ));
    }

    #[test]
    fn unknown_parameter_rejected() {
        let err = scenario_from_yaml_str(
            "name: t\nparameters: { f_unknown: 1 }\nherds: [{ animal_type: pigs }]\n",
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Scenario(_)));
    }
}
