//! Statistics module collecting the summary measures used to compare
//! simulator runs.
//!
//! - [`rate`]: population-averaged firing rate
//! - [`irregularity`]: spike-train irregularity (LvR)
//! - [`correlation`]: mean pairwise correlation of binned spike trains
//! - [`histogram`]: empirical histograms and their Kullback-Leibler divergence
pub mod correlation;
pub mod histogram;
pub mod irregularity;
pub mod rate;
