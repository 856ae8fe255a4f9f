//! Summary statistics exported by the reference simulator.
//!
//! The reference pipeline writes one JSON file per metric (`pop_rates.json`,
//! `corrcoeff.json`, `pop_LvR.json`), keyed by area and population, with a
//! `Parameters.areas` list naming the simulated areas. Values are either a
//! scalar or a list whose first entry is the population summary.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::AnalysisError;

/// Per-population summary values of one metric, one entry per (area,
/// population) pair.
#[derive(Debug, PartialEq, Clone)]
pub struct ReferenceStats {
    /// Areas the values were taken from, in file order.
    pub areas: Vec<String>,
    /// Population labels, repeated across areas.
    pub populations: Vec<String>,
    /// Summary value per (area, population) pair.
    pub values: Vec<f64>,
}

impl ReferenceStats {
    /// Returns (population, value) pairs, the shape the comparison figures
    /// consume.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.populations
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Load one reference-simulator metric file.
///
/// When `areas` is `None`, the area list is taken from the file's
/// `Parameters.areas` entry; pass a list to force the same area subset across
/// several metric files.
pub fn load_reference_stats(
    path: &Path,
    areas: Option<&[String]>,
) -> Result<ReferenceStats, AnalysisError> {
    let file = File::open(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);
    let data: Value = serde_json::from_reader(reader)
        .map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))?;

    let area_names: Vec<String> = match areas {
        Some(areas) => areas.to_vec(),
        None => data
            .pointer("/Parameters/areas")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AnalysisError::ParseError(format!(
                    "{}: no Parameters.areas list",
                    path.display()
                ))
            })?
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
    };

    let mut populations = Vec::new();
    let mut values = Vec::new();
    for area in &area_names {
        let pops = data.get(area).and_then(Value::as_object).ok_or_else(|| {
            AnalysisError::ParseError(format!("{}: no data for area {}", path.display(), area))
        })?;
        for (pop, value) in pops {
            if pop == "total" {
                continue;
            }
            // Scalars are taken as-is, lists contribute their first entry
            let value = match value {
                Value::Array(items) => items.first().and_then(Value::as_f64),
                other => other.as_f64(),
            }
            .ok_or_else(|| {
                AnalysisError::ParseError(format!(
                    "{}: non-numeric value for {}/{}",
                    path.display(),
                    area,
                    pop
                ))
            })?;
            populations.push(pop.clone());
            values.push(value);
        }
    }

    Ok(ReferenceStats {
        areas: area_names,
        populations,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_reference_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop_rates.json");
        fs::write(
            &path,
            r#"{"Parameters": {"areas": ["V1", "V2"]},
                "V1": {"4E": 3.25, "4I": [4.5, 0.1], "total": 99.0},
                "V2": {"4E": 2.75}}"#,
        )
        .unwrap();

        let stats = load_reference_stats(&path, None).unwrap();
        assert_eq!(stats.areas, vec!["V1", "V2"]);
        assert_eq!(stats.populations, vec!["4E", "4I", "4E"]);
        assert_eq!(stats.values, vec![3.25, 4.5, 2.75]);

        // Forcing an area subset restricts the pairs
        let v1_only = vec!["V1".to_string()];
        let stats = load_reference_stats(&path, Some(&v1_only)).unwrap();
        assert_eq!(stats.pairs(), vec![("4E".to_string(), 3.25), ("4I".to_string(), 4.5)]);
    }

    #[test]
    fn test_missing_area_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop_rates.json");
        fs::write(&path, r#"{"Parameters": {"areas": ["FEF"]}}"#).unwrap();
        assert!(load_reference_stats(&path, None).is_err());
    }
}
