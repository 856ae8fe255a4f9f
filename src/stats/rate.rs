//! Population-averaged firing rate.

use crate::error::AnalysisError;
use crate::record::SpikeRecord;

/// Compute the mean firing rate of a population, in spikes per second per
/// neuron, counting only spikes after `t_min_ms`.
///
/// `num_neurons` is the number of recorded neurons. It needs to be provided
/// explicitly to avoid corruption of the result by silent neurons not present
/// in the record.
pub fn population_rate(
    record: &SpikeRecord,
    num_neurons: usize,
    t_min_ms: f64,
    duration_s: f64,
) -> Result<f64, AnalysisError> {
    if num_neurons == 0 {
        return Err(AnalysisError::InvalidParameter(
            "the number of neurons must be positive".to_string(),
        ));
    }
    let counted_s = duration_s - t_min_ms / 1000.0;
    if counted_s <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "duration {} s leaves no time after the {} ms transient",
            duration_s, t_min_ms
        )));
    }

    let num_spikes = record.num_spikes_after(t_min_ms);
    Ok(num_spikes as f64 / (num_neurons as f64 * counted_s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_population_rate() {
        // 4 neurons, 6 spikes after 500 ms, 1.5 s counted
        let times = vec![100.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0, 1600.0];
        let ids = vec![0, 1, 2, 3, 0, 1, 2, 3];
        let record = SpikeRecord::build(times, ids).unwrap();

        let rate = population_rate(&record, 4, 500.0, 2.0).unwrap();
        assert_relative_eq!(rate, 6.0 / (4.0 * 1.5), epsilon = 1e-12);
    }

    #[test]
    fn test_population_rate_invalid() {
        let record = SpikeRecord::build(vec![1.0], vec![0]).unwrap();
        assert!(population_rate(&record, 0, 500.0, 2.0).is_err());
        assert!(population_rate(&record, 10, 500.0, 0.5).is_err());
    }
}
