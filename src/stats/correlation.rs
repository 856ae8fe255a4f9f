//! Mean pairwise correlation of binned spike trains.

use nalgebra::DMatrix;

use crate::error::AnalysisError;
use crate::record::SpikeRecord;
use crate::CORRELATION_ID_HEADROOM;

/// Estimate the mean pairwise Pearson correlation coefficient of a population.
///
/// Spike trains of a contiguous id block (starting at the smallest id present,
/// with a headroom of [`CORRELATION_ID_HEADROOM`] extra ids so that enough
/// non-silent trains remain) are binned into windows of `resolution_ms` over
/// `[t_min, t_max)`. Silent trains are discarded, the first `subsample`
/// remaining trains enter the correlation matrix, the diagonal is dropped and
/// coefficients of zero-variance trains (NaN) count as zero.
///
/// Returns the mean off-diagonal coefficient, or zero when fewer than two
/// usable trains exist.
pub fn mean_correlation(
    record: &SpikeRecord,
    t_min: f64,
    t_max: f64,
    subsample: usize,
    resolution_ms: f64,
) -> Result<f64, AnalysisError> {
    if resolution_ms <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "bin resolution must be positive, got {}",
            resolution_ms
        )));
    }
    if t_max <= t_min {
        return Err(AnalysisError::InvalidParameter(format!(
            "empty analysis window [{}, {})",
            t_min, t_max
        )));
    }
    if subsample < 2 {
        return Err(AnalysisError::InvalidParameter(
            "the subsample must contain at least two trains".to_string(),
        ));
    }

    let first_id = match record.min_id() {
        Some(id) => id,
        None => return Ok(0.0),
    };

    let num_bins = ((t_max - t_min) / resolution_ms).ceil() as usize;
    let trains = record.window(t_min, t_max).trains();

    // Instantaneous spike counts for the id block, silent trains stripped
    let mut binned: Vec<Vec<f64>> = Vec::with_capacity(subsample);
    for id in first_id..first_id + subsample as u64 + CORRELATION_ID_HEADROOM {
        if binned.len() == subsample {
            break;
        }
        let times = match trains.get(&id) {
            Some(times) if !times.is_empty() => times,
            _ => continue,
        };
        let mut counts = vec![0.0; num_bins];
        for &t in times {
            let bin = ((t - t_min) / resolution_ms) as usize;
            counts[bin.min(num_bins - 1)] += 1.0;
        }
        binned.push(counts);
    }

    let n = binned.len();
    if n < 2 {
        return Ok(0.0);
    }

    let mut counts = DMatrix::from_fn(n, num_bins, |i, j| binned[i][j]);
    for i in 0..n {
        let mean = counts.row(i).sum() / num_bins as f64;
        counts.row_mut(i).add_scalar_mut(-mean);
    }

    // Row Gram matrix carries all covariances at once
    let gram = &counts * counts.transpose();

    let mut sum = 0.0;
    for i in 0..n {
        for j in i + 1..n {
            let cc = gram[(i, j)] / (gram[(i, i)] * gram[(j, j)]).sqrt();
            // Zero-variance trains produce NaN coefficients, counted as zero
            if cc.is_finite() {
                sum += cc;
            }
        }
    }
    let num_pairs = (n * (n - 1) / 2) as f64;
    Ok(sum / num_pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SEED: u64 = 42;

    #[test]
    fn test_identical_trains_are_fully_correlated() {
        // Two neurons firing in lockstep with a varying pattern
        let mut times = Vec::new();
        let mut ids = Vec::new();
        for k in 0..50 {
            let t = (k * k % 97) as f64 + 0.5;
            times.push(t);
            ids.push(0);
            times.push(t);
            ids.push(1);
        }
        let record = SpikeRecord::build(times, ids).unwrap();

        let cc = mean_correlation(&record, 0.0, 100.0, 2, 1.0).unwrap();
        assert_relative_eq!(cc, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_independent_trains_are_uncorrelated() {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let record = SpikeRecord::rand_poisson(50, 20.0, 5000.0, &mut rng).unwrap();

        let cc = mean_correlation(&record, 0.0, 5000.0, 50, 1.0).unwrap();
        assert!(cc.abs() < 0.01, "mean correlation was {}", cc);
    }

    #[test]
    fn test_zero_variance_trains_count_as_zero() {
        // Neuron 1 fires exactly once per bin: zero variance, NaN coefficient
        let mut times = vec![0.5, 2.5];
        let mut ids = vec![0, 0];
        for k in 0..4 {
            times.push(k as f64 + 0.5);
            ids.push(1);
        }
        let record = SpikeRecord::build(times, ids).unwrap();

        let cc = mean_correlation(&record, 0.0, 4.0, 2, 1.0).unwrap();
        assert_eq!(cc, 0.0);
    }

    #[test]
    fn test_too_few_trains_yield_zero() {
        let record = SpikeRecord::build(vec![1.0, 2.0], vec![0, 0]).unwrap();
        assert_eq!(mean_correlation(&record, 0.0, 10.0, 2, 1.0).unwrap(), 0.0);

        let empty = SpikeRecord::build(vec![], vec![]).unwrap();
        assert_eq!(mean_correlation(&empty, 0.0, 10.0, 2, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let record = SpikeRecord::build(vec![1.0], vec![0]).unwrap();
        assert!(mean_correlation(&record, 0.0, 10.0, 2, 0.0).is_err());
        assert!(mean_correlation(&record, 10.0, 0.0, 2, 1.0).is_err());
        assert!(mean_correlation(&record, 0.0, 10.0, 1, 1.0).is_err());
    }
}
