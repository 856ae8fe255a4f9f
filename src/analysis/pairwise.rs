//! Pairwise histogram artifacts comparing two runs of the same model.
//!
//! A ground-truth folder and a comparison folder each hold the same set of
//! per-population statistic arrays. For every array present in both, the
//! ground truth dictates Freedman-Diaconis bin edges, both arrays are binned
//! over them, and the combined artifact is written for later divergence
//! summaries.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::io::arrays::load_array;
use crate::stats::histogram::{freedman_diaconis_edges, kl_divergence, Histogram};

/// A ground-truth histogram and a comparison histogram over shared edges.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HistogramPair {
    pub edges: Vec<f64>,
    pub ground_truth: Vec<u64>,
    pub comparison: Vec<u64>,
}

impl HistogramPair {
    /// Bin two arrays over Freedman-Diaconis edges derived from the ground
    /// truth.
    pub fn build(truth: &[f64], comparison: &[f64]) -> Result<Self, AnalysisError> {
        let edges = freedman_diaconis_edges(truth)?;
        let truth_hist = Histogram::new(truth, edges.clone())?;
        let comp_hist = Histogram::new(comparison, edges.clone())?;
        Ok(HistogramPair {
            edges,
            ground_truth: truth_hist.counts().to_vec(),
            comparison: comp_hist.counts().to_vec(),
        })
    }

    /// Kullback-Leibler divergence of the comparison from the ground truth.
    pub fn kl_divergence(&self) -> Result<f64, AnalysisError> {
        kl_divergence(&self.edges, &self.ground_truth, &self.comparison)
    }

    /// Save the artifact to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let file = File::create(path)
            .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))
    }

    /// Load an artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::open(path)
            .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))
    }
}

/// Build histogram artifacts for every statistic array present in both the
/// ground-truth and the comparison folder under `data_path`. Arrays without a
/// comparison partner are skipped with a warning. Returns the number of
/// artifacts written to `out_dir`, each named
/// `<ground_truth>_<comparison>_<array>.json`.
pub fn run(
    data_path: &Path,
    ground_truth_folder: &str,
    comparison_folder: &str,
    out_dir: &Path,
) -> Result<usize, AnalysisError> {
    let truth_dir = data_path.join(ground_truth_folder);
    let entries = std::fs::read_dir(&truth_dir)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", truth_dir.display(), e)))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json"))
        .collect();
    names.sort();

    let mut written = 0;
    for name in names {
        let comparison_path = data_path.join(comparison_folder).join(&name);
        if !comparison_path.exists() {
            log::warn!("unable to find a file to compare {} against", name);
            continue;
        }

        let truth = load_array(&truth_dir.join(&name))?;
        let comparison = load_array(&comparison_path)?;

        let pair = HistogramPair::build(&truth, &comparison)?;
        pair.save(&out_dir.join(format!(
            "{}_{}_{}",
            ground_truth_folder, comparison_folder, name
        )))?;
        written += 1;
    }

    Ok(written)
}

/// Load the histogram artifacts of one metric across permutation prefixes and
/// populations, and summarize each as a KL divergence. Returns one row per
/// prefix with one value per population.
pub fn kl_summary(
    artifact_dir: &Path,
    prefixes: &[String],
    metric: &str,
    populations: &[String],
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    prefixes
        .iter()
        .map(|prefix| {
            populations
                .iter()
                .map(|population| {
                    let path = artifact_dir
                        .join(format!("{}_{}_{}.json", prefix, metric, population));
                    HistogramPair::load(&path)?.kl_divergence()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::arrays::save_array;
    use std::fs;

    fn spread(n: usize, offset: f64) -> Vec<f64> {
        (0..n).map(|i| offset + (i % 29) as f64 / 3.0).collect()
    }

    #[test]
    fn test_histogram_pair_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pair = HistogramPair::build(&spread(500, 0.0), &spread(500, 1.0)).unwrap();

        let path = dir.path().join("pair.json");
        pair.save(&path).unwrap();
        assert_eq!(HistogramPair::load(&path).unwrap(), pair);
    }

    #[test]
    fn test_identical_arrays_have_zero_divergence() {
        let data = spread(500, 0.0);
        let pair = HistogramPair::build(&data, &data).unwrap();
        assert_eq!(pair.kl_divergence().unwrap(), 0.0);
    }

    #[test]
    fn test_run_skips_missing_comparison() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("seed_1")).unwrap();
        fs::create_dir(dir.path().join("seed_2")).unwrap();

        save_array(&dir.path().join("seed_1/rates_4E.json"), &spread(400, 0.0)).unwrap();
        save_array(&dir.path().join("seed_2/rates_4E.json"), &spread(400, 0.5)).unwrap();
        // rates_4I has no partner in seed_2
        save_array(&dir.path().join("seed_1/rates_4I.json"), &spread(400, 0.0)).unwrap();

        let written = run(dir.path(), "seed_1", "seed_2", dir.path()).unwrap();
        assert_eq!(written, 1);
        assert!(dir.path().join("seed_1_seed_2_rates_4E.json").exists());
        assert!(!dir.path().join("seed_1_seed_2_rates_4I.json").exists());
    }

    #[test]
    fn test_kl_summary_shape() {
        let dir = tempfile::tempdir().unwrap();
        for prefix in ["a_b", "a_c"] {
            for pop in ["4E", "4I"] {
                let pair =
                    HistogramPair::build(&spread(400, 0.0), &spread(400, 0.25)).unwrap();
                pair.save(&dir.path().join(format!("{}_rates_{}.json", prefix, pop)))
                    .unwrap();
            }
        }

        let prefixes = vec!["a_b".to_string(), "a_c".to_string()];
        let populations = vec!["4E".to_string(), "4I".to_string()];
        let summary = kl_summary(dir.path(), &prefixes, "rates", &populations).unwrap();
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|row| row.len() == 2));
        assert!(summary.iter().flatten().all(|kl| kl.is_finite()));
    }
}
