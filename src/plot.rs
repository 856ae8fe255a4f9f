//! Figure module rendering the benchmark comparison charts.
//!
//! - [`settings`]: shared figure sizes, fonts and colors
//! - [`raster`]: spike raster with a population rate trace
//! - [`accuracy`]: area rasters beside per-population distribution panels
//! - [`kl`]: KL-divergence bar panels
//! - [`scaling`]: simulation-time scaling across devices
//! - [`merging`]: kernel-merging scaling panels
pub mod accuracy;
pub mod kl;
pub mod merging;
pub mod raster;
pub mod scaling;
pub mod settings;

use crate::error::AnalysisError;

/// Collapse a backend drawing error into the crate error type.
pub(crate) fn plot_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::PlotError(e.to_string())
}
