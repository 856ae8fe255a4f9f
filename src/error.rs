//! Error module for the spike_bench library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum AnalysisError {
    /// Error for malformed spike data, e.g., mismatched time/id columns or non-finite times.
    InvalidSpikeData(String),
    /// Error for invalid parameters.
    InvalidParameter(String),
    /// Error for arrays whose shapes do not line up, e.g., a timing table with the wrong column count.
    ShapeMismatch(String),
    /// Error for histograms that cannot be binned or normalized, e.g., zero interquartile range.
    DegenerateHistogram(String),
    /// Error for two simulator runs that disagree, e.g., different spikes in a timestep.
    SpikeMismatch(String),
    /// Error while parsing a data file.
    ParseError(String),
    /// Error for I/O operations.
    IOError(String),
    /// Error while rendering a figure.
    PlotError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::InvalidSpikeData(e) => write!(f, "Invalid spike data: {}", e),
            AnalysisError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            AnalysisError::ShapeMismatch(e) => write!(f, "Shape mismatch: {}", e),
            AnalysisError::DegenerateHistogram(e) => write!(f, "Degenerate histogram: {}", e),
            AnalysisError::SpikeMismatch(e) => write!(f, "Spike mismatch: {}", e),
            AnalysisError::ParseError(e) => write!(f, "Parse error: {}", e),
            AnalysisError::IOError(e) => write!(f, "I/O error: {}", e),
            AnalysisError::PlotError(e) => write!(f, "Plot error: {}", e),
        }
    }
}

impl Error for AnalysisError {}
