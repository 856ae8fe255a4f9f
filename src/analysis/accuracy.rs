//! Per-population accuracy statistics.
//!
//! For every recorded population, the pipeline loads all spike logs, looks up
//! the neuron count in the model description and computes firing rate,
//! irregularity and mean pairwise correlation per log. Populations are
//! independent and processed in parallel; each writes its own uniquely named
//! output files.

use std::path::Path;

use rayon::prelude::*;

use crate::error::AnalysisError;
use crate::io::arrays::{save_array, stats_file_name};
use crate::io::metadata::ModelDescription;
use crate::io::recordings::{area_files, parse_population_name, population_files, RecordingFormat};
use crate::io::spikes::{read_spike_csv, read_spike_gdf};
use crate::record::SpikeRecord;
use crate::stats::correlation::mean_correlation;
use crate::stats::irregularity::pop_lvr;
use crate::stats::rate::population_rate;
use crate::{CORRELATION_BIN_MS, CORRELATION_SUBSAMPLE, REFRACTORY_PERIOD, TRANSIENT_MS};

/// Parameters of the accuracy pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyConfig {
    /// Simulated duration in seconds.
    pub duration_s: f64,
    /// Refractory period entering the LvR estimate, in milliseconds.
    pub t_ref: f64,
    /// Startup transient excluded from all statistics, in milliseconds.
    pub transient_ms: f64,
    /// Number of non-silent trains entering the correlation estimate.
    pub subsample: usize,
    /// Correlation bin width in milliseconds.
    pub resolution_ms: f64,
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        AccuracyConfig {
            duration_s: 10.5,
            t_ref: REFRACTORY_PERIOD,
            transient_ms: TRANSIENT_MS,
            subsample: CORRELATION_SUBSAMPLE,
            resolution_ms: CORRELATION_BIN_MS,
        }
    }
}

/// Summary statistics of one population, one entry per recording file.
#[derive(Debug, PartialEq, Clone)]
pub struct PopulationStats {
    pub population: String,
    pub rates: Vec<f64>,
    pub irregularity: Vec<f64>,
    pub correlation: Vec<f64>,
}

/// Compute the accuracy statistics of one population from its recording
/// files. Reference-format shards without any post-transient spike are
/// skipped, matching the export quirk of the reference simulator.
pub fn population_stats(
    recording_dir: &Path,
    population: &str,
    format: RecordingFormat,
    model: &ModelDescription,
    config: &AccuracyConfig,
) -> Result<PopulationStats, AnalysisError> {
    let t_max = config.duration_s * 1000.0;
    let files = population_files(recording_dir, population, format)?;

    let mut stats = PopulationStats {
        population: population.to_string(),
        rates: Vec::with_capacity(files.len()),
        irregularity: Vec::with_capacity(files.len()),
        correlation: Vec::with_capacity(files.len()),
    };

    for file in &files {
        let (record, area) = match format {
            RecordingFormat::Csv => {
                let (area, _) = parse_population_name(file)?;
                (read_spike_csv(file)?, area)
            }
            RecordingFormat::Gdf => (read_spike_gdf(file)?, format.area_name(file)?),
        };

        let num_neurons = model.population_size(&area, population)?;

        if format == RecordingFormat::Gdf && record.num_spikes_after(config.transient_ms) == 0 {
            log::warn!(
                "skipping silent reference shard {}",
                file.display()
            );
            continue;
        }

        stats.rates.push(population_rate(
            &record,
            num_neurons,
            config.transient_ms,
            config.duration_s,
        )?);
        stats.irregularity.push(
            pop_lvr(&record, config.t_ref, config.transient_ms, t_max, num_neurons)?.0,
        );
        stats.correlation.push(mean_correlation(
            &record,
            config.transient_ms,
            t_max,
            config.subsample,
            config.resolution_ms,
        )?);
    }

    Ok(stats)
}

/// Persist the three statistic arrays of one population, keyed by simulator
/// label.
pub fn write_population_stats(
    out_dir: &Path,
    simulator: &str,
    stats: &PopulationStats,
) -> Result<(), AnalysisError> {
    save_array(
        &out_dir.join(stats_file_name(simulator, "rates", &stats.population)),
        &stats.rates,
    )?;
    save_array(
        &out_dir.join(stats_file_name(simulator, "irregularity", &stats.population)),
        &stats.irregularity,
    )?;
    save_array(
        &out_dir.join(stats_file_name(simulator, "corr_coeff", &stats.population)),
        &stats.correlation,
    )
}

/// Run the accuracy pipeline over a set of populations, in parallel, writing
/// one rate/irregularity/correlation array triple per population.
pub fn run(
    recording_dir: &Path,
    format: RecordingFormat,
    model: &ModelDescription,
    populations: &[String],
    simulator: &str,
    config: &AccuracyConfig,
    out_dir: &Path,
) -> Result<(), AnalysisError> {
    populations.par_iter().try_for_each(|population| {
        log::info!("computing {} statistics for population {}", simulator, population);
        let stats = population_stats(recording_dir, population, format, model, config)?;
        write_population_stats(out_dir, simulator, &stats)
    })
}

/// Raster data of one population inside an area panel.
#[derive(Debug, PartialEq, Clone)]
pub struct PopulationRaster {
    pub population: String,
    pub record: SpikeRecord,
    /// Neuron count approximated by the largest id seen in the log.
    pub num_neurons: u64,
}

/// Load the raster data of one area, inhibitory populations first within each
/// layer, the order the area panels are stacked in.
pub fn area_raster(
    recording_dir: &Path,
    area: &str,
) -> Result<Vec<PopulationRaster>, AnalysisError> {
    let files = area_files(recording_dir, area)?;
    if files.is_empty() {
        return Err(AnalysisError::IOError(format!(
            "no recordings for area {} in {}",
            area,
            recording_dir.display()
        )));
    }

    files
        .iter()
        .map(|file| {
            let (_, population) = parse_population_name(file)?;
            let record = read_spike_csv(file)?;
            let num_neurons = record.max_id().unwrap_or(0);
            Ok(PopulationRaster {
                population,
                record,
                num_neurons,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::spikes::write_spike_csv;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::fs;

    fn write_model(dir: &Path) -> ModelDescription {
        let path = dir.join("custom_Data_Model_test.json");
        fs::write(
            &path,
            r#"{"neuron_numbers": {"V1": {"4E": 40, "4I": 10}, "V2": {"4E": 40}}}"#,
        )
        .unwrap();
        ModelDescription::load(&path).unwrap()
    }

    #[test]
    fn test_population_stats_csv() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for name in ["V1_4E.csv", "V2_4E.csv"] {
            let record = SpikeRecord::rand_poisson(40, 8.0, 2000.0, &mut rng).unwrap();
            write_spike_csv(&dir.path().join(name), &record).unwrap();
        }

        let config = AccuracyConfig {
            duration_s: 2.0,
            subsample: 10,
            ..AccuracyConfig::default()
        };
        let stats =
            population_stats(dir.path(), "4E", RecordingFormat::Csv, &model, &config).unwrap();

        assert_eq!(stats.rates.len(), 2);
        assert_eq!(stats.irregularity.len(), 2);
        assert_eq!(stats.correlation.len(), 2);
        // 8 Hz Poisson input: the rate estimate lands in the right decade
        assert!(stats.rates.iter().all(|&r| r > 4.0 && r < 12.0));
        assert!(stats.irregularity.iter().all(|&l| (l - 1.0).abs() < 0.5));
    }

    #[test]
    fn test_run_writes_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path());
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for name in ["V1_4E.csv", "V1_4I.csv"] {
            let record = SpikeRecord::rand_poisson(10, 10.0, 2000.0, &mut rng).unwrap();
            write_spike_csv(&dir.path().join(name), &record).unwrap();
        }

        let config = AccuracyConfig {
            duration_s: 2.0,
            subsample: 5,
            ..AccuracyConfig::default()
        };
        let populations = vec!["4E".to_string(), "4I".to_string()];
        run(
            dir.path(),
            RecordingFormat::Csv,
            &model,
            &populations,
            "gpu",
            &config,
            dir.path(),
        )
        .unwrap();

        for pop in ["4E", "4I"] {
            for metric in ["rates", "irregularity", "corr_coeff"] {
                let values =
                    crate::io::arrays::load_array(&dir.path().join(stats_file_name("gpu", metric, pop)))
                        .unwrap();
                assert_eq!(values.len(), 1);
            }
        }
    }

    #[test]
    fn test_area_raster_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["V1_4E.csv", "V1_4I.csv"] {
            let record = SpikeRecord::build(vec![1.0, 2.0], vec![0, 3]).unwrap();
            write_spike_csv(&dir.path().join(name), &record).unwrap();
        }

        let rasters = area_raster(dir.path(), "V1").unwrap();
        assert_eq!(rasters[0].population, "4I");
        assert_eq!(rasters[1].population, "4E");
        assert_eq!(rasters[0].num_neurons, 3);

        assert!(area_raster(dir.path(), "FEF").is_err());
    }
}
