//! Spike-train irregularity (LvR).

use itertools::Itertools;

use crate::error::AnalysisError;
use crate::record::SpikeRecord;

/// Compute the revised local variation LvR of a population.
/// See Shinomoto et al. 2009 for details.
///
/// The record is restricted to `[t_min, t_max)` before consecutive
/// inter-spike-interval pairs are formed per neuron. Neurons with fewer than
/// two intervals in the window get a defined LvR of zero, and silent neurons
/// absent from the record are padded with zeros up to `num_neurons` so that
/// they cannot inflate the population mean.
///
/// # Parameters
/// - `record`: The spike record of the population.
/// - `t_ref`: Refractory period of the neurons, in milliseconds.
/// - `t_min`: Minimal time for the calculation.
/// - `t_max`: Maximal time for the calculation.
/// - `num_neurons`: Number of recorded neurons, provided explicitly to
///   account for silent neurons not present in the record.
///
/// # Returns
/// The population-averaged LvR and the single-cell LvR values.
pub fn pop_lvr(
    record: &SpikeRecord,
    t_ref: f64,
    t_min: f64,
    t_max: f64,
    num_neurons: usize,
) -> Result<(f64, Vec<f64>), AnalysisError> {
    if t_ref < 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "refractory period must be non-negative, got {}",
            t_ref
        )));
    }
    if t_max <= t_min {
        return Err(AnalysisError::InvalidParameter(format!(
            "empty analysis window [{}, {})",
            t_min, t_max
        )));
    }
    if num_neurons == 0 {
        return Err(AnalysisError::InvalidParameter(
            "the number of neurons must be positive".to_string(),
        ));
    }

    let trains = record.window(t_min, t_max).trains();

    let mut lvr: Vec<f64> = trains.values().map(|times| single_cell_lvr(times, t_ref)).collect();

    // Silent neurons contribute a defined zero
    if lvr.len() < num_neurons {
        lvr.resize(num_neurons, 0.0);
    }

    let mean = lvr.iter().sum::<f64>() / lvr.len() as f64;
    Ok((mean, lvr))
}

/// LvR of a single sorted spike train. Trains with fewer than two
/// inter-spike intervals yield zero.
fn single_cell_lvr(times: &[f64], t_ref: f64) -> f64 {
    let intervals: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    if intervals.len() < 2 {
        return 0.0;
    }

    let sum: f64 = intervals
        .iter()
        .tuple_windows()
        .map(|(i1, i2)| {
            (1.0 - 4.0 * i1 * i2 / (i1 + i2).powi(2)) * (1.0 + 4.0 * t_ref / (i1 + i2))
        })
        .sum();

    sum * 3.0 / (intervals.len() as f64 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SEED: u64 = 42;

    #[test]
    fn test_regular_train_has_zero_lvr() {
        // A perfectly regular train: all consecutive interval pairs are equal,
        // so the local variation vanishes (up to the refractory correction).
        let times: Vec<f64> = (0..100).map(|i| i as f64 * 10.0).collect();
        let ids = vec![0; 100];
        let record = SpikeRecord::build(times, ids).unwrap();

        let (mean, lvr) = pop_lvr(&record, 0.0, 0.0, 1000.0, 1).unwrap();
        assert_eq!(lvr.len(), 1);
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_short_trains_are_zero() {
        // Two spikes give one interval only, which is below the two-interval
        // minimum of the estimator.
        let record = SpikeRecord::build(vec![1.0, 2.0], vec![0, 0]).unwrap();
        let (mean, lvr) = pop_lvr(&record, 2.0, 0.0, 10.0, 1).unwrap();
        assert_eq!(lvr, vec![0.0]);
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn test_silent_neurons_are_padded() {
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let record = SpikeRecord::build(times, vec![3; 10]).unwrap();

        let (_, lvr) = pop_lvr(&record, 0.0, 0.0, 100.0, 4).unwrap();
        assert_eq!(lvr.len(), 4);
        assert_eq!(lvr[1..], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_window_restricts_intervals() {
        // Outside-window spikes must not contribute intervals
        let record = SpikeRecord::build(
            vec![0.0, 100.0, 200.0, 300.0, 400.0, 5000.0],
            vec![0; 6],
        )
        .unwrap();
        let (full, _) = pop_lvr(&record, 0.0, 0.0, 10_000.0, 1).unwrap();
        let (windowed, _) = pop_lvr(&record, 0.0, 0.0, 500.0, 1).unwrap();
        assert!(full > windowed);
        assert_relative_eq!(windowed, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_poisson_train_has_unit_lvr() {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let record = SpikeRecord::rand_poisson(200, 10.0, 20_000.0, &mut rng).unwrap();

        let (mean, lvr) = pop_lvr(&record, 0.0, 0.0, 20_000.0, 200).unwrap();
        assert_eq!(lvr.len(), 200);
        // LvR of a Poisson process concentrates around one
        assert!((mean - 1.0).abs() < 0.1, "mean LvR was {}", mean);
    }

    #[test]
    fn test_invalid_parameters() {
        let record = SpikeRecord::build(vec![1.0], vec![0]).unwrap();
        assert!(pop_lvr(&record, -1.0, 0.0, 10.0, 1).is_err());
        assert!(pop_lvr(&record, 2.0, 10.0, 10.0, 1).is_err());
        assert!(pop_lvr(&record, 2.0, 0.0, 10.0, 0).is_err());
    }
}
