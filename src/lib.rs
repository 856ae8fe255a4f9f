//! This crate provides analysis and plotting tools for benchmarking spiking
//! neural network simulators against each other.
//!
//! A benchmark run leaves behind per-population spike recordings, timing
//! tables and metadata files. The tools here load those artifacts, compute
//! summary statistics (firing rate, spike-train irregularity, pairwise
//! correlation, histogram divergence) and render comparison figures.
//!
//! # Computing Statistics
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use spike_bench::record::SpikeRecord;
//! use spike_bench::stats::irregularity::pop_lvr;
//!
//! // Sample Poisson spike trains for 100 neurons over 10 s
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let record = SpikeRecord::rand_poisson(100, 8.0, 10_000.0, &mut rng).unwrap();
//!
//! // Irregularity of a Poisson population is close to one
//! let (mean, lvr) = pop_lvr(&record, 2.0, 500.0, 10_000.0, 100).unwrap();
//! assert_eq!(lvr.len(), 100);
//! assert!((mean - 1.0).abs() < 0.25);
//! ```
//!
//! # Comparing Histograms
//!
//! ```rust
//! use spike_bench::stats::histogram::{freedman_diaconis_edges, Histogram, kl_divergence};
//!
//! let data: Vec<f64> = (0..1000).map(|i| (i % 97) as f64 / 10.0).collect();
//! let edges = freedman_diaconis_edges(&data).unwrap();
//! let hist = Histogram::new(&data, edges.clone()).unwrap();
//!
//! // A histogram diverges from itself by exactly zero
//! let kl = kl_divergence(&edges, hist.counts(), hist.counts()).unwrap();
//! assert_eq!(kl, 0.0);
//! ```

pub mod analysis;
pub mod error;
pub mod io;
pub mod plot;
pub mod record;
pub mod stats;

/// The refractory period of the simulated neuron models, in milliseconds.
pub const REFRACTORY_PERIOD: f64 = 2.0;
/// Startup transient excluded from all statistics, in milliseconds.
pub const TRANSIENT_MS: f64 = 500.0;
/// Window width used to bin spike trains for correlation estimates, in milliseconds.
pub const CORRELATION_BIN_MS: f64 = 1.0;
/// Number of non-silent spike trains entering the correlation estimate.
pub const CORRELATION_SUBSAMPLE: usize = 2000;
/// Extra neuron ids scanned beyond the subsample so that enough non-silent trains remain.
pub const CORRELATION_ID_HEADROOM: u64 = 1000;
