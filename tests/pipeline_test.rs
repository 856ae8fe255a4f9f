use std::fs;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

use spike_bench::analysis::accuracy::{self, AccuracyConfig};
use spike_bench::analysis::pairwise;
use spike_bench::io::arrays::{load_array, save_array, stats_file_name};
use spike_bench::io::metadata::{find_model_description, ModelDescription};
use spike_bench::io::recordings::RecordingFormat;
use spike_bench::io::spikes::write_spike_csv;
use spike_bench::record::SpikeRecord;

const POPULATIONS: [&str; 2] = ["4E", "4I"];
const AREAS: [&str; 2] = ["V1", "V2"];
const NUM_NEURONS: usize = 30;
const DURATION_S: f64 = 2.0;

/// Lay out a data directory the way a benchmark run leaves it behind:
/// a model description plus one spike log per area and population.
fn write_benchmark_dir(dir: &std::path::Path, seed: u64) {
    fs::write(
        dir.join("custom_Data_Model_test.json"),
        r#"{"neuron_numbers": {
            "V1": {"4E": 30, "4I": 30},
            "V2": {"4E": 30, "4I": 30}}}"#,
    )
    .unwrap();

    let recordings = dir.join("recordings");
    fs::create_dir(&recordings).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for area in AREAS {
        for population in POPULATIONS {
            let record =
                SpikeRecord::rand_poisson(NUM_NEURONS, 8.0, DURATION_S * 1000.0, &mut rng)
                    .unwrap();
            write_spike_csv(&recordings.join(format!("{}_{}.csv", area, population)), &record)
                .unwrap();
        }
    }
}

#[test]
fn accuracy_pipeline_writes_one_entry_per_recording() {
    let dir = tempdir().unwrap();
    write_benchmark_dir(dir.path(), 1);

    let model = ModelDescription::load(&find_model_description(dir.path()).unwrap()).unwrap();
    let populations: Vec<String> = POPULATIONS.iter().map(|p| p.to_string()).collect();
    let config = AccuracyConfig {
        duration_s: DURATION_S,
        subsample: 10,
        ..AccuracyConfig::default()
    };

    accuracy::run(
        &dir.path().join("recordings"),
        RecordingFormat::Csv,
        &model,
        &populations,
        "gpu",
        &config,
        dir.path(),
    )
    .unwrap();

    for population in POPULATIONS {
        let rates =
            load_array(&dir.path().join(stats_file_name("gpu", "rates", population))).unwrap();
        let irregularity =
            load_array(&dir.path().join(stats_file_name("gpu", "irregularity", population)))
                .unwrap();
        let correlation =
            load_array(&dir.path().join(stats_file_name("gpu", "corr_coeff", population)))
                .unwrap();

        // One entry per area
        assert_eq!(rates.len(), AREAS.len());
        assert_eq!(irregularity.len(), AREAS.len());
        assert_eq!(correlation.len(), AREAS.len());

        // Poisson input at 8 spikes/s: rates in the right decade,
        // irregularity near one, correlation near zero
        assert!(rates.iter().all(|&r| r > 3.0 && r < 14.0));
        assert!(irregularity.iter().all(|&l| (l - 1.0).abs() < 0.5));
        assert!(correlation.iter().all(|&c| c.abs() < 0.1));
    }
}

/// Per-run statistic distribution with enough spread for histogram binning.
fn write_stat_arrays(dir: &std::path::Path, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for population in POPULATIONS {
        let values: Vec<f64> = (0..200).map(|_| 3.0 + rng.gen::<f64>() * 6.0).collect();
        save_array(&dir.join(format!("rates_{}.json", population)), &values).unwrap();
    }
}

#[test]
fn pairwise_artifacts_feed_the_kl_summary() {
    let dir = tempdir().unwrap();
    let artifacts = dir.path().join("artifacts");
    fs::create_dir(&artifacts).unwrap();

    for (folder, seed) in [("seed_1", 21), ("seed_2", 22)] {
        let run_dir = dir.path().join(folder);
        fs::create_dir(&run_dir).unwrap();
        write_stat_arrays(&run_dir, seed);
    }
    // An array without a comparison partner is skipped with a warning
    save_array(&dir.path().join("seed_1/corr_coeff_4E.json"), &[0.001, 0.002, 0.003])
        .unwrap();

    let written = pairwise::run(dir.path(), "seed_1", "seed_2", &artifacts).unwrap();
    assert_eq!(written, POPULATIONS.len());
    assert!(!artifacts.join("seed_1_seed_2_corr_coeff_4E.json").exists());

    let self_written = pairwise::run(dir.path(), "seed_2", "seed_2", &artifacts).unwrap();
    assert_eq!(self_written, POPULATIONS.len());

    let populations: Vec<String> = POPULATIONS.iter().map(|p| p.to_string()).collect();

    // A run compared against itself diverges by exactly zero
    let self_prefix = vec!["seed_2_seed_2".to_string()];
    let summary = pairwise::kl_summary(&artifacts, &self_prefix, "rates", &populations).unwrap();
    assert_eq!(summary, vec![vec![0.0, 0.0]]);

    // Two independent draws from the same distribution stay close but not equal
    let cross_prefix = vec!["seed_1_seed_2".to_string()];
    let summary = pairwise::kl_summary(&artifacts, &cross_prefix, "rates", &populations).unwrap();
    assert_eq!(summary.len(), 1);
    assert!(summary[0].iter().all(|&kl| kl.is_finite() && kl >= 0.0 && kl < 1.0));
}
