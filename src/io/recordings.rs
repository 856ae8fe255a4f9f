//! Recording directories and their filename conventions.
//!
//! The GPU simulator writes one `<area>_<pop>.csv` log per recorded
//! population; the reference simulator writes
//! `<run>_spikes-<area>-<pop>-<rank>-<thread>.gdf` shards.

use std::path::{Path, PathBuf};

use crate::error::AnalysisError;

/// The on-disk spike-log format of a recording directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFormat {
    /// Comma-delimited `<area>_<pop>.csv` logs with a header.
    Csv,
    /// Tab-delimited `...-<pop>-....gdf` shards without a header.
    Gdf,
}

impl RecordingFormat {
    fn matches(&self, name: &str, population: &str) -> bool {
        match self {
            RecordingFormat::Csv => {
                name.ends_with(".csv") && name[..name.len() - 4].ends_with(&format!("_{}", population))
            }
            RecordingFormat::Gdf => {
                name.ends_with(".gdf") && name.contains(&format!("-{}-", population))
            }
        }
    }

    /// Extract the area name from a recording file name.
    pub fn area_name(&self, path: &Path) -> Result<String, AnalysisError> {
        let stem = file_stem(path)?;
        let area = match self {
            RecordingFormat::Csv => stem.split('_').next(),
            RecordingFormat::Gdf => stem.split('-').nth(1),
        };
        area.map(String::from).ok_or_else(|| {
            AnalysisError::ParseError(format!(
                "cannot extract an area name from {}",
                path.display()
            ))
        })
    }
}

/// List the recording files of one population, sorted by name.
pub fn population_files(
    dir: &Path,
    population: &str,
    format: RecordingFormat,
) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = list_files(dir, |name| format.matches(name, population))?;
    files.sort();
    Ok(files)
}

/// List the per-population recording files of one area, sorted descending so
/// that inhibitory populations precede their excitatory partners.
pub fn area_files(dir: &Path, area: &str) -> Result<Vec<PathBuf>, AnalysisError> {
    let prefix = format!("{}_", area);
    let mut files = list_files(dir, |name| name.ends_with(".csv") && name.starts_with(&prefix))?;
    files.sort();
    files.reverse();
    Ok(files)
}

/// Split a `<area>_<pop>` recording file stem into its components.
pub fn parse_population_name(path: &Path) -> Result<(String, String), AnalysisError> {
    let stem = file_stem(path)?;
    let mut components = stem.split('_');
    match (components.next(), components.next()) {
        (Some(area), Some(pop)) if !area.is_empty() && !pop.is_empty() => {
            Ok((area.to_string(), pop.to_string()))
        }
        _ => Err(AnalysisError::ParseError(format!(
            "recording name {} is not of the form <area>_<pop>",
            path.display()
        ))),
    }
}

fn file_stem(path: &Path) -> Result<&str, AnalysisError> {
    path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        AnalysisError::ParseError(format!("unreadable file name {}", path.display()))
    })
}

fn list_files<F: Fn(&str) -> bool>(dir: &Path, keep: F) -> Result<Vec<PathBuf>, AnalysisError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", dir.display(), e)))?;

    Ok(entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| keep(n))
                .unwrap_or(false)
        })
        .collect())
}
