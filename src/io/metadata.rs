//! Model-description metadata with per-population neuron counts.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AnalysisError;

/// The slice of the upstream model-description JSON this crate consumes:
/// neuron counts keyed by area and population.
#[derive(Debug, Deserialize)]
pub struct ModelDescription {
    neuron_numbers: HashMap<String, HashMap<String, f64>>,
}

impl ModelDescription {
    /// Load a model description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::open(path)
            .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Look up the neuron count of one population.
    pub fn population_size(&self, area: &str, population: &str) -> Result<usize, AnalysisError> {
        self.neuron_numbers
            .get(area)
            .and_then(|pops| pops.get(population))
            .map(|&n| n as usize)
            .ok_or_else(|| {
                AnalysisError::InvalidParameter(format!(
                    "no neuron count for population {}/{} in the model description",
                    area, population
                ))
            })
    }

    /// Returns the area names carrying neuron counts, sorted.
    pub fn areas(&self) -> Vec<&str> {
        let mut areas: Vec<&str> = self.neuron_numbers.keys().map(String::as_str).collect();
        areas.sort_unstable();
        areas
    }
}

/// Find the model-description file (`custom_Data_Model_*.json`) in a data
/// directory.
pub fn find_model_description(data_path: &Path) -> Result<PathBuf, AnalysisError> {
    let entries = std::fs::read_dir(data_path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", data_path.display(), e)))?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("custom_Data_Model_") && n.ends_with(".json"))
                .unwrap_or(false)
        })
        .collect();
    matches.sort();

    matches.into_iter().next().ok_or_else(|| {
        AnalysisError::IOError(format!(
            "no custom_Data_Model_*.json in {}",
            data_path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom_Data_Model_abc.json");
        fs::write(
            &path,
            r#"{"neuron_numbers": {"V1": {"4E": 21494.0, "4I": 5479}, "V2": {"4E": 18618}},
                "other_key": [1, 2, 3]}"#,
        )
        .unwrap();

        let found = find_model_description(dir.path()).unwrap();
        assert_eq!(found, path);

        let model = ModelDescription::load(&found).unwrap();
        assert_eq!(model.population_size("V1", "4E").unwrap(), 21494);
        assert_eq!(model.population_size("V1", "4I").unwrap(), 5479);
        assert_eq!(model.areas(), vec!["V1", "V2"]);
        assert!(model.population_size("V1", "5E").is_err());
    }

    #[test]
    fn test_missing_description() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_model_description(dir.path()).is_err());
    }
}
