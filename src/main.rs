//! Command-line entry point: one subcommand per analysis or figure of the
//! benchmarking study.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use spike_bench::analysis::accuracy::{self, AccuracyConfig};
use spike_bench::analysis::{compare, pairwise};
use spike_bench::error::AnalysisError;
use spike_bench::io::arrays::{load_array, stats_file_name};
use spike_bench::io::metadata::{find_model_description, ModelDescription};
use spike_bench::io::recordings::RecordingFormat;
use spike_bench::io::reference::load_reference_stats;
use spike_bench::io::spikes::read_spike_csv;
use spike_bench::io::timing::read_timing_csv;
use spike_bench::io::voltages::read_voltages;
use spike_bench::plot::accuracy::{accuracy_figure, MetricPanel};
use spike_bench::plot::kl::kl_figure;
use spike_bench::plot::merging::merging_figure;
use spike_bench::plot::raster::raster_figure;
use spike_bench::plot::scaling::scaling_figure;
use spike_bench::plot::settings::PlotContext;

/// Analysis and plotting tools for spiking neural network simulator benchmarks.
#[derive(Parser)]
#[command(name = "spike-bench")]
#[command(about = "Benchmark analysis for spiking neural network simulators")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute per-population rate, irregularity and correlation statistics
    Stats {
        /// Data directory holding the model description and a recordings/ subdirectory
        data_path: PathBuf,

        /// Reference-simulator spike directory (tab-delimited shards) to process instead
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Simulated duration in seconds
        #[arg(long, default_value_t = 10.5)]
        duration_s: f64,

        /// Populations to process
        #[arg(long, value_delimiter = ',', default_value = "4E,4I,5E,5I,6E,6I,23E,23I")]
        populations: Vec<String>,

        /// Directory the statistic arrays are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Build pairwise histogram artifacts from two statistic folders
    Pairwise {
        /// Directory holding the two statistic folders
        data_path: PathBuf,

        /// Ground-truth folder name
        ground_truth: String,

        /// Comparison folder name
        comparison: String,

        /// Directory the artifacts are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Render the KL-divergence summary figure from pairwise artifacts
    KlFigure {
        /// Directory holding the pairwise histogram artifacts
        data_path: PathBuf,

        /// Run permutations to summarize
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "reference_seed_1,reference_seed_2,reference_seed_3,seed_1_seed_2,seed_1_seed_3,seed_2_seed_3"
        )]
        permutations: Vec<String>,

        /// Populations shown on the x axis
        #[arg(long, value_delimiter = ',', default_value = "4E,4I,5E,5I,6E,6I,23E,23I")]
        populations: Vec<String>,

        /// Output image path
        #[arg(long, default_value = "kl_divergence.png")]
        output: PathBuf,

        /// Use presentation styling instead of paper styling
        #[arg(long)]
        presentation: bool,
    },

    /// Render the accuracy figure: area rasters and distribution panels
    AccuracyFigure {
        /// Directory holding the per-population spike recordings
        recording_dir: PathBuf,

        /// Directory holding the reference-simulator analysis JSON files
        reference_analysis: PathBuf,

        /// Directory holding the computed statistic arrays
        stats_dir: PathBuf,

        /// Areas shown as raster panels
        #[arg(long, value_delimiter = ',', default_value = "V1,V2,FEF")]
        areas: Vec<String>,

        /// Populations entering the distribution panels
        #[arg(long, value_delimiter = ',', default_value = "4E,4I,5E,5I,6E,6I,23E,23I")]
        populations: Vec<String>,

        /// Simulator label of the computed arrays
        #[arg(long, default_value = "gpu")]
        simulator: String,

        /// Raster time window in seconds, as start,end
        #[arg(long, value_delimiter = ',', default_value = "3.0,3.5")]
        window_s: Vec<f64>,

        /// Output image path
        #[arg(long, default_value = "accuracy.png")]
        output: PathBuf,

        /// Use presentation styling instead of paper styling
        #[arg(long)]
        presentation: bool,
    },

    /// Render the simulation-time scaling figure from a timing table
    ScalingFigure {
        /// Timing table CSV
        input: PathBuf,

        /// Device names, in table column order
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "Jetson TX2,GeForce MX130,GeForce GTX 1650,Titan RTX"
        )]
        devices: Vec<String>,

        /// Algorithm names, in table column order
        #[arg(long, value_delimiter = ',', default_value = "Sparse,Bitfield,Procedural")]
        algorithms: Vec<String>,

        /// Repeated measurements per device and algorithm
        #[arg(long, default_value_t = 5)]
        num_repeats: usize,

        /// Output image path
        #[arg(long, default_value = "performance_scaling.png")]
        output: PathBuf,

        /// Use presentation styling instead of paper styling
        #[arg(long)]
        presentation: bool,
    },

    /// Render the kernel-merging scaling figure from a timing table
    MergingFigure {
        /// Timing table CSV
        input: PathBuf,

        /// Label of the first toolchain version
        #[arg(long, default_value = "Latest version")]
        first_label: String,

        /// Label of the second toolchain version
        #[arg(long, default_value = "Release 4.1.0")]
        second_label: String,

        /// Output image path
        #[arg(long, default_value = "merging_scaling.png")]
        output: PathBuf,

        /// Use presentation styling instead of paper styling
        #[arg(long)]
        presentation: bool,
    },

    /// Render a spike raster and rate trace for one spike log
    RasterFigure {
        /// Spike log CSV
        input: PathBuf,

        /// Number of neurons in the recorded population
        #[arg(long)]
        num_neurons: usize,

        /// Simulated duration in milliseconds
        #[arg(long, default_value_t = 10_000.0)]
        duration_ms: f64,

        /// Rate histogram bin width in milliseconds
        #[arg(long, default_value_t = 10.0)]
        bin_ms: f64,

        /// Output image path
        #[arg(long, default_value = "spikes.png")]
        output: PathBuf,

        /// Use presentation styling instead of paper styling
        #[arg(long)]
        presentation: bool,
    },

    /// Check two runs for spike-for-spike equivalence
    Compare {
        /// Ground-truth voltage trace (raw little-endian f32)
        #[arg(long)]
        truth_voltages: PathBuf,

        /// Comparison voltage trace
        #[arg(long)]
        voltages: PathBuf,

        /// Ground-truth spike log CSV
        #[arg(long)]
        truth_spikes: PathBuf,

        /// Comparison spike log CSV
        #[arg(long)]
        spikes: PathBuf,

        /// Number of neurons covered by the voltage traces
        #[arg(long, default_value_t = 8000)]
        num_neurons: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AnalysisError> {
    match command {
        Command::Stats {
            data_path,
            reference,
            duration_s,
            populations,
            out_dir,
        } => {
            let model = ModelDescription::load(&find_model_description(&data_path)?)?;
            let config = AccuracyConfig {
                duration_s,
                ..AccuracyConfig::default()
            };
            match reference {
                Some(reference_dir) => accuracy::run(
                    &reference_dir,
                    RecordingFormat::Gdf,
                    &model,
                    &populations,
                    "reference",
                    &config,
                    &out_dir,
                ),
                None => accuracy::run(
                    &data_path.join("recordings"),
                    RecordingFormat::Csv,
                    &model,
                    &populations,
                    "gpu",
                    &config,
                    &out_dir,
                ),
            }
        }

        Command::Pairwise {
            data_path,
            ground_truth,
            comparison,
            out_dir,
        } => {
            let written = pairwise::run(&data_path, &ground_truth, &comparison, &out_dir)?;
            println!("wrote {} histogram artifacts", written);
            Ok(())
        }

        Command::KlFigure {
            data_path,
            permutations,
            populations,
            output,
            presentation,
        } => {
            let rate = pairwise::kl_summary(&data_path, &permutations, "rates", &populations)?;
            let correlation =
                pairwise::kl_summary(&data_path, &permutations, "corr_coeff", &populations)?;
            let irregularity =
                pairwise::kl_summary(&data_path, &permutations, "irregularity", &populations)?;
            kl_figure(
                &populations,
                &permutations,
                &rate,
                &correlation,
                &irregularity,
                &PlotContext::new(presentation),
                &output,
            )
        }

        Command::AccuracyFigure {
            recording_dir,
            reference_analysis,
            stats_dir,
            areas,
            populations,
            simulator,
            window_s,
            output,
            presentation,
        } => {
            if window_s.len() != 2 || window_s[1] <= window_s[0] {
                return Err(AnalysisError::InvalidParameter(format!(
                    "--window-s expects start,end with start < end, got {:?}",
                    window_s
                )));
            }

            // The rate file fixes the area subset used by the other metrics
            let rates = load_reference_stats(&reference_analysis.join("pop_rates.json"), None)?;
            let reference_areas = rates.areas.clone();
            let correlation = load_reference_stats(
                &reference_analysis.join("corrcoeff.json"),
                Some(&reference_areas),
            )?;
            let irregularity = load_reference_stats(
                &reference_analysis.join("pop_LvR.json"),
                Some(&reference_areas),
            )?;

            let computed = |metric: &str| -> Result<Vec<(String, f64)>, AnalysisError> {
                let mut pairs = Vec::new();
                for population in &populations {
                    let values =
                        load_array(&stats_dir.join(stats_file_name(&simulator, metric, population)))?;
                    pairs.extend(values.into_iter().map(|v| (population.clone(), v)));
                }
                Ok(pairs)
            };

            let panels = vec![
                MetricPanel::from_pairs(
                    "Rate [spikes/s]",
                    (0.0, 12.0),
                    &rates.pairs(),
                    &computed("rates")?,
                ),
                MetricPanel::from_pairs(
                    "Correlation coefficient",
                    (0.0, 0.01),
                    &correlation.pairs(),
                    &computed("corr_coeff")?,
                ),
                MetricPanel::from_pairs(
                    "Irregularity",
                    (0.0, 2.0),
                    &irregularity.pairs(),
                    &computed("irregularity")?,
                ),
            ];

            let rasters = areas
                .iter()
                .map(|area| {
                    Ok((area.clone(), accuracy::area_raster(&recording_dir, area)?))
                })
                .collect::<Result<Vec<_>, AnalysisError>>()?;

            accuracy_figure(
                &rasters,
                &panels,
                (window_s[0], window_s[1]),
                ("reference", &simulator),
                &PlotContext::new(presentation),
                &output,
            )
        }

        Command::ScalingFigure {
            input,
            devices,
            algorithms,
            num_repeats,
            output,
            presentation,
        } => {
            let rows = read_timing_csv(&input)?;
            scaling_figure(
                &rows,
                &devices,
                &algorithms,
                num_repeats,
                &PlotContext::new(presentation),
                &output,
            )
        }

        Command::MergingFigure {
            input,
            first_label,
            second_label,
            output,
            presentation,
        } => {
            let rows = read_timing_csv(&input)?;
            merging_figure(
                &rows,
                (&first_label, &second_label),
                &PlotContext::new(presentation),
                &output,
            )
        }

        Command::RasterFigure {
            input,
            num_neurons,
            duration_ms,
            bin_ms,
            output,
            presentation,
        } => {
            let record = read_spike_csv(&input)?;
            raster_figure(
                &record,
                num_neurons,
                duration_ms,
                bin_ms,
                &PlotContext::new(presentation),
                &output,
            )
        }

        Command::Compare {
            truth_voltages,
            voltages,
            truth_spikes,
            spikes,
            num_neurons,
        } => {
            let truth_v = read_voltages(&truth_voltages)?;
            let comp_v = read_voltages(&voltages)?;
            let truth_s = read_spike_csv(&truth_spikes)?;
            let comp_s = read_spike_csv(&spikes)?;

            let report = compare::compare_runs(&truth_v, &comp_v, &truth_s, &comp_s, num_neurons)?;
            println!("{} timesteps", report.num_timesteps);
            println!("RMSE: {}", report.voltage_rmse);
            println!("Spikes equal!");
            Ok(())
        }
    }
}
