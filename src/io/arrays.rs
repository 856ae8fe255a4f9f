//! Derived statistic arrays persisted as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::AnalysisError;

/// Save a flat statistic array to a JSON file.
pub fn save_array(path: &Path, values: &[f64]) -> Result<(), AnalysisError> {
    let file = File::create(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, values)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))
}

/// Load a flat statistic array from a JSON file.
pub fn load_array(path: &Path) -> Result<Vec<f64>, AnalysisError> {
    let file = File::open(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))
}

/// File name of a persisted statistic array: `<sim>_<metric>_<pop>.json`.
pub fn stats_file_name(simulator: &str, metric: &str, population: &str) -> String {
    format!("{}_{}_{}.json", simulator, metric, population)
}
