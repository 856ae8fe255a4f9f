//! Benchmark timing tables.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::AnalysisError;

/// Read a comma-delimited timing table with a header line. Empty cells parse
/// as NaN, matching runs that were aborted or never measured.
pub fn read_timing_csv(path: &Path) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result
            .map_err(|e| AnalysisError::ParseError(format!("{}: {}", path.display(), e)))?;
        let values: Result<Vec<f64>, AnalysisError> = row
            .iter()
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    Ok(f64::NAN)
                } else {
                    field.parse().map_err(|_| {
                        AnalysisError::ParseError(format!(
                            "{}: cannot parse cell {:?}",
                            path.display(),
                            field
                        ))
                    })
                }
            })
            .collect();
        rows.push(values?);
    }

    Ok(rows)
}

/// Check that every row of a timing table has the expected column count.
pub fn check_columns(rows: &[Vec<f64>], expected: usize) -> Result<(), AnalysisError> {
    match rows.iter().find(|row| row.len() != expected) {
        Some(row) => Err(AnalysisError::ShapeMismatch(format!(
            "expected {} columns, found a row with {}",
            expected,
            row.len()
        ))),
        None => Ok(()),
    }
}
