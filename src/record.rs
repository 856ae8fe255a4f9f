//! Module implementing the spike record, the two-row table of spike times and
//! neuron ids produced by a simulator run.

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A recorded set of spikes for one population.
///
/// Row 0 of the upstream table becomes `times` (milliseconds), row 1 becomes
/// `ids` (neuron identifiers, not necessarily zero-based or contiguous).
/// Times are kept sorted ascending, with ids aligned pairwise.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeRecord {
    times: Vec<f64>,
    ids: Vec<u64>,
}

impl SpikeRecord {
    /// Create a spike record from parallel time and id columns.
    /// The columns are sorted by time; the function returns an error if the
    /// columns differ in length or contain non-finite times.
    pub fn build(times: Vec<f64>, ids: Vec<u64>) -> Result<Self, AnalysisError> {
        if times.len() != ids.len() {
            return Err(AnalysisError::InvalidSpikeData(format!(
                "got {} spike times but {} neuron ids",
                times.len(),
                ids.len()
            )));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(AnalysisError::InvalidSpikeData(format!(
                "non-finite spike time {}",
                t
            )));
        }

        let mut spikes: Vec<(f64, u64)> = times.into_iter().zip(ids).collect();
        spikes.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .expect("NaN times should have been caught earlier")
        });

        let (times, ids) = spikes.into_iter().unzip();
        Ok(SpikeRecord { times, ids })
    }

    /// Returns the number of recorded spikes.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if no spike was recorded.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the spike times, sorted ascending.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the neuron ids, aligned with [`times`](Self::times).
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// Returns the smallest neuron id present, or `None` for an empty record.
    pub fn min_id(&self) -> Option<u64> {
        self.ids.iter().min().copied()
    }

    /// Returns the largest neuron id present, or `None` for an empty record.
    pub fn max_id(&self) -> Option<u64> {
        self.ids.iter().max().copied()
    }

    /// Counts the spikes occurring strictly after time `t`.
    pub fn num_spikes_after(&self, t: f64) -> usize {
        self.times.len() - self.times.partition_point(|&time| time <= t)
    }

    /// Restrict the record to the half-open interval `[t_min, t_max)`.
    pub fn window(&self, t_min: f64, t_max: f64) -> SpikeSlice<'_> {
        let start = self.times.partition_point(|&t| t < t_min);
        let end = self.times.partition_point(|&t| t < t_max);
        SpikeSlice {
            times: &self.times[start..end],
            ids: &self.ids[start..end],
        }
    }

    /// Sample homogeneous Poisson spike trains for `num_neurons` neurons with
    /// the given rate (spikes/s) over `duration_ms` milliseconds.
    ///
    /// Inter-spike intervals are drawn from an exponential distribution, so
    /// the resulting trains carry the irregularity of a Poisson process.
    pub fn rand_poisson<R: Rng>(
        num_neurons: usize,
        rate_hz: f64,
        duration_ms: f64,
        rng: &mut R,
    ) -> Result<Self, AnalysisError> {
        if rate_hz <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "firing rate must be positive, got {}",
                rate_hz
            )));
        }
        if duration_ms <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "duration must be positive, got {}",
                duration_ms
            )));
        }

        // Rate per millisecond sets the exponential inter-spike intervals
        let isi = Exp::new(rate_hz / 1000.0)
            .map_err(|e| AnalysisError::InvalidParameter(e.to_string()))?;

        let mut times = Vec::new();
        let mut ids = Vec::new();
        for id in 0..num_neurons as u64 {
            let mut t = isi.sample(rng);
            while t < duration_ms {
                times.push(t);
                ids.push(id);
                t += isi.sample(rng);
            }
        }

        SpikeRecord::build(times, ids)
    }
}

/// A borrowed view of a spike record restricted to a time window.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SpikeSlice<'a> {
    times: &'a [f64],
    ids: &'a [u64],
}

impl<'a> SpikeSlice<'a> {
    /// Returns the number of spikes in the window.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the window contains no spike.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the spike times in the window, sorted ascending.
    pub fn times(&self) -> &'a [f64] {
        self.times
    }

    /// Returns the neuron ids in the window, aligned with the times.
    pub fn ids(&self) -> &'a [u64] {
        self.ids
    }

    /// Group the window into per-neuron spike trains, keyed by neuron id.
    /// Each train inherits the ascending time order of the record.
    pub fn trains(&self) -> BTreeMap<u64, Vec<f64>> {
        let mut trains: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
        for (&t, &id) in self.times.iter().zip(self.ids.iter()) {
            trains.entry(id).or_default().push(t);
        }
        trains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SEED: u64 = 42;

    #[test]
    fn test_build_sorts_by_time() {
        let record = SpikeRecord::build(vec![3.0, 1.0, 2.0], vec![7, 5, 6]).unwrap();
        assert_eq!(record.times(), &[1.0, 2.0, 3.0]);
        assert_eq!(record.ids(), &[5, 6, 7]);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert_eq!(
            SpikeRecord::build(vec![1.0], vec![0, 1]),
            Err(AnalysisError::InvalidSpikeData(
                "got 1 spike times but 2 neuron ids".to_string()
            ))
        );
        assert!(matches!(
            SpikeRecord::build(vec![1.0, f64::NAN], vec![0, 1]),
            Err(AnalysisError::InvalidSpikeData(_))
        ));
    }

    #[test]
    fn test_window_is_half_open() {
        let record =
            SpikeRecord::build(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![0, 1, 2, 3, 4]).unwrap();
        let slice = record.window(1.0, 3.0);
        assert_eq!(slice.times(), &[1.0, 2.0]);
        assert_eq!(slice.ids(), &[1, 2]);

        assert!(record.window(5.0, 9.0).is_empty());
    }

    #[test]
    fn test_num_spikes_after() {
        let record = SpikeRecord::build(vec![0.5, 1.0, 1.5, 2.0], vec![0, 0, 1, 1]).unwrap();
        assert_eq!(record.num_spikes_after(1.0), 2);
        assert_eq!(record.num_spikes_after(-1.0), 4);
        assert_eq!(record.num_spikes_after(2.0), 0);
    }

    #[test]
    fn test_trains_group_by_id() {
        let record =
            SpikeRecord::build(vec![0.0, 1.0, 2.0, 3.0], vec![1, 0, 1, 0]).unwrap();
        let trains = record.window(0.0, 4.0).trains();
        assert_eq!(trains[&0], vec![1.0, 3.0]);
        assert_eq!(trains[&1], vec![0.0, 2.0]);
    }

    #[test]
    fn test_rand_poisson() {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);

        assert!(SpikeRecord::rand_poisson(10, -1.0, 100.0, &mut rng).is_err());
        assert!(SpikeRecord::rand_poisson(10, 1.0, 0.0, &mut rng).is_err());

        let record = SpikeRecord::rand_poisson(50, 10.0, 10_000.0, &mut rng).unwrap();

        // 50 neurons at 10 spikes/s over 10 s fire about 5000 spikes
        assert!(record.len() > 4000 && record.len() < 6000);
        assert!(record.times().windows(2).all(|w| w[0] <= w[1]));
        assert!(record.max_id().unwrap() < 50);
    }
}
