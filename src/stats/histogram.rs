//! Empirical histograms and their Kullback-Leibler divergence.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Comparison densities at or below this floor are masked out of the
/// divergence to avoid dividing by empty bins.
const DENSITY_FLOOR: f64 = 1.0e-15;

/// An empirical histogram over explicit bin edges.
///
/// Bins are half-open `[e_k, e_{k+1})`, except for the last bin which also
/// includes its right edge; values outside the edge range are dropped.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<u64>,
}

impl Histogram {
    /// Bin `data` over the given edges. The edges must be sorted ascending
    /// and contain at least two entries.
    pub fn new(data: &[f64], edges: Vec<f64>) -> Result<Self, AnalysisError> {
        if edges.len() < 2 {
            return Err(AnalysisError::DegenerateHistogram(format!(
                "need at least two bin edges, got {}",
                edges.len()
            )));
        }
        if edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::DegenerateHistogram(
                "bin edges must be strictly increasing".to_string(),
            ));
        }

        let num_bins = edges.len() - 1;
        let mut counts = vec![0u64; num_bins];
        for &v in data {
            if v < edges[0] || v > edges[num_bins] {
                continue;
            }
            let bin = (edges.partition_point(|&e| e <= v) - 1).min(num_bins - 1);
            counts[bin] += 1;
        }

        Ok(Histogram { edges, counts })
    }

    /// Returns the bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Returns the per-bin counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Returns the width of the first bin.
    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }
}

/// Interquartile range with linearly interpolated quantiles.
pub fn iqr(data: &[f64]) -> Result<f64, AnalysisError> {
    if data.is_empty() {
        return Err(AnalysisError::InvalidParameter(
            "cannot take quantiles of empty data".to_string(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(quantile(&sorted, 0.75) - quantile(&sorted, 0.25))
}

/// Linearly interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Bin edges following the Freedman-Diaconis rule: bin size `2 IQR / n^(1/3)`,
/// edges linearly spaced over the data range.
///
/// Returns an error for empty, constant or zero-IQR data, where the rule
/// degenerates.
pub fn freedman_diaconis_edges(data: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    let bin_size = 2.0 * iqr(data)? / (data.len() as f64).powf(1.0 / 3.0);
    if !(bin_size > 0.0) {
        return Err(AnalysisError::DegenerateHistogram(format!(
            "Freedman-Diaconis bin size {} is not positive",
            bin_size
        )));
    }

    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let num_edges = ((max - min) / bin_size).ceil() as usize;
    if num_edges < 2 {
        return Err(AnalysisError::DegenerateHistogram(format!(
            "data range {} is narrower than a single bin",
            max - min
        )));
    }

    Ok((0..num_edges)
        .map(|i| min + (max - min) * i as f64 / (num_edges - 1) as f64)
        .collect())
}

/// Kullback-Leibler divergence between two histograms over shared edges.
///
/// Both histograms are normalized to densities, bins whose comparison density
/// is at or below [`DENSITY_FLOOR`] are masked out, and the masked densities
/// are renormalized to probability vectors before the divergence
/// `sum p ln(p/q)` is taken. Identical histograms diverge by exactly zero.
pub fn kl_divergence(
    edges: &[f64],
    truth_counts: &[u64],
    comp_counts: &[u64],
) -> Result<f64, AnalysisError> {
    if edges.len() < 2 {
        return Err(AnalysisError::DegenerateHistogram(format!(
            "need at least two bin edges, got {}",
            edges.len()
        )));
    }
    if truth_counts.len() != edges.len() - 1 || comp_counts.len() != edges.len() - 1 {
        return Err(AnalysisError::ShapeMismatch(format!(
            "{} edges expect {} bins, got {} and {}",
            edges.len(),
            edges.len() - 1,
            truth_counts.len(),
            comp_counts.len()
        )));
    }

    let bin_width = edges[1] - edges[0];
    let truth_sum: u64 = truth_counts.iter().sum();
    let comp_sum: u64 = comp_counts.iter().sum();
    if truth_sum == 0 || comp_sum == 0 {
        return Err(AnalysisError::DegenerateHistogram(
            "cannot normalize an empty histogram".to_string(),
        ));
    }

    let truth_density: Vec<f64> = truth_counts
        .iter()
        .map(|&c| c as f64 / (truth_sum as f64 / bin_width))
        .collect();
    let comp_density: Vec<f64> = comp_counts
        .iter()
        .map(|&c| c as f64 / (comp_sum as f64 / bin_width))
        .collect();

    // Mask out bins where the comparison has no data
    let masked: Vec<(f64, f64)> = truth_density
        .into_iter()
        .zip(comp_density)
        .filter(|&(_, q)| q > DENSITY_FLOOR)
        .collect();

    let p_sum: f64 = masked.iter().map(|&(p, _)| p).sum();
    let q_sum: f64 = masked.iter().map(|&(_, q)| q).sum();
    if p_sum <= 0.0 {
        return Err(AnalysisError::DegenerateHistogram(
            "no ground-truth mass left after masking".to_string(),
        ));
    }

    Ok(masked
        .iter()
        .filter(|&&(p, _)| p > 0.0)
        .map(|&(p, q)| {
            let pk = p / p_sum;
            let qk = q / q_sum;
            pk * (pk / qk).ln()
        })
        .sum())
}
