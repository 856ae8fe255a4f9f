//! Delimited spike logs.
//!
//! The GPU simulator records comma-separated `time,neuron_id` logs with a
//! header line; the reference simulator exports tab-delimited `id<TAB>time`
//! lines without a header and with a trailing delimiter.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::AnalysisError;
use crate::record::SpikeRecord;

/// Read a comma-delimited spike log with a `time,neuron_id` header.
pub fn read_spike_csv(path: &Path) -> Result<SpikeRecord, AnalysisError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;

    let mut times = Vec::new();
    let mut ids = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))?;
        times.push(parse_field::<f64>(&row, 0, path)?);
        ids.push(parse_field::<u64>(&row, 1, path)?);
    }

    SpikeRecord::build(times, ids)
}

/// Write a spike record as a comma-delimited log with a `time,neuron_id` header.
pub fn write_spike_csv(path: &Path, record: &SpikeRecord) -> Result<(), AnalysisError> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;

    writer
        .write_record(["time", "neuron_id"])
        .map_err(|e| AnalysisError::IOError(e.to_string()))?;
    for (t, id) in record.times().iter().zip(record.ids()) {
        writer
            .write_record([t.to_string(), id.to_string()])
            .map_err(|e| AnalysisError::IOError(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| AnalysisError::IOError(e.to_string()))
}

/// Read a tab-delimited reference-simulator spike log: `id<TAB>time` per
/// line, no header, with a trailing delimiter that adds an empty field.
pub fn read_spike_gdf(path: &Path) -> Result<SpikeRecord, AnalysisError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;

    let mut times = Vec::new();
    let mut ids = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))?;
        ids.push(parse_field::<u64>(&row, 0, path)?);
        times.push(parse_field::<f64>(&row, 1, path)?);
    }

    SpikeRecord::build(times, ids)
}

fn parse_field<T: std::str::FromStr>(
    row: &csv::StringRecord,
    index: usize,
    path: &Path,
) -> Result<T, AnalysisError> {
    let field = row.get(index).ok_or_else(|| {
        AnalysisError::ParseError(format!(
            "{}: missing field {} in line {:?}",
            path.display(),
            index,
            row.position().map(|p| p.line())
        ))
    })?;
    field.trim().parse().map_err(|_| {
        AnalysisError::ParseError(format!(
            "{}: cannot parse field {:?} in line {:?}",
            path.display(),
            field,
            row.position().map(|p| p.line())
        ))
    })
}
