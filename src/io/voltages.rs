//! Raw membrane-voltage traces.

use std::path::Path;

use crate::error::AnalysisError;

/// Read a raw little-endian `f32` voltage trace, the dump format of the
/// benchmark models.
pub fn read_voltages(path: &Path) -> Result<Vec<f32>, AnalysisError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AnalysisError::IOError(format!("{}: {}", path.display(), e)))?;
    if bytes.len() % 4 != 0 {
        return Err(AnalysisError::ParseError(format!(
            "{}: {} bytes is not a whole number of f32 samples",
            path.display(),
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
