//! Spike-for-spike equivalence check between two runs of the same model.
//!
//! Two synaptic-processing strategies must produce the same dynamics: the
//! voltage traces may only differ by floating-point noise and every timestep
//! must contain exactly the same set of spiking neurons.

use std::collections::BTreeMap;

use crate::error::AnalysisError;
use crate::record::SpikeRecord;

/// Outcome of a successful equivalence check.
#[derive(Debug, PartialEq, Clone)]
pub struct ComparisonReport {
    /// Root-mean-square error between the two voltage traces.
    pub voltage_rmse: f64,
    /// Number of timesteps covered by the voltage traces.
    pub num_timesteps: usize,
    /// Number of spikes matched per run.
    pub num_spikes: usize,
}

/// Check that two runs are equivalent: voltage traces of equal shape (RMSE
/// reported, computed in f64), and identical per-timestep spike sets. Spike
/// times are integer timestep indices starting at one.
pub fn compare_runs(
    truth_voltages: &[f32],
    comp_voltages: &[f32],
    truth_spikes: &SpikeRecord,
    comp_spikes: &SpikeRecord,
    num_neurons: usize,
) -> Result<ComparisonReport, AnalysisError> {
    if num_neurons == 0 {
        return Err(AnalysisError::InvalidParameter(
            "the number of neurons must be positive".to_string(),
        ));
    }
    if truth_voltages.len() != comp_voltages.len() {
        return Err(AnalysisError::ShapeMismatch(format!(
            "voltage traces differ in length: {} vs {}",
            truth_voltages.len(),
            comp_voltages.len()
        )));
    }
    if truth_spikes.len() != comp_spikes.len() {
        return Err(AnalysisError::SpikeMismatch(format!(
            "spike counts differ: {} vs {}",
            truth_spikes.len(),
            comp_spikes.len()
        )));
    }

    let num_timesteps = truth_voltages.len() / num_neurons;

    let sum_sq: f64 = truth_voltages
        .iter()
        .zip(comp_voltages)
        .map(|(&a, &b)| {
            let err = a as f64 - b as f64;
            err * err
        })
        .sum();
    let voltage_rmse = (sum_sq / truth_voltages.len() as f64).sqrt();

    let truth_by_step = spikes_by_timestep(truth_spikes, num_timesteps)?;
    let comp_by_step = spikes_by_timestep(comp_spikes, num_timesteps)?;

    for (step, truth_ids) in &truth_by_step {
        match comp_by_step.get(step) {
            Some(comp_ids) if comp_ids == truth_ids => {}
            _ => {
                return Err(AnalysisError::SpikeMismatch(format!(
                    "spikes differ in timestep {}",
                    step
                )))
            }
        }
    }
    // Equal totals and matching truth-side groups leave nothing unmatched on
    // the comparison side, but a differing timestep set still means mismatch.
    if truth_by_step.len() != comp_by_step.len() {
        let step = comp_by_step
            .keys()
            .find(|step| !truth_by_step.contains_key(*step))
            .copied()
            .unwrap_or_default();
        return Err(AnalysisError::SpikeMismatch(format!(
            "spikes differ in timestep {}",
            step
        )));
    }

    Ok(ComparisonReport {
        voltage_rmse,
        num_timesteps,
        num_spikes: truth_spikes.len(),
    })
}

/// Group spikes by integer timestep, neuron ids sorted within each step.
fn spikes_by_timestep(
    record: &SpikeRecord,
    num_timesteps: usize,
) -> Result<BTreeMap<u64, Vec<u64>>, AnalysisError> {
    let mut by_step: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (&t, &id) in record.times().iter().zip(record.ids()) {
        if t.fract() != 0.0 || t < 1.0 || t > num_timesteps as f64 {
            return Err(AnalysisError::SpikeMismatch(format!(
                "spike time {} is not a timestep in 1..={}",
                t, num_timesteps
            )));
        }
        by_step.entry(t as u64).or_default().push(id);
    }
    for ids in by_step.values_mut() {
        ids.sort_unstable();
    }
    Ok(by_step)
}
