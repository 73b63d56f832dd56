//! Typed CSV persistence for the intermediate stage files
//!
//! Writes go through a temp file in the target directory followed by a
//! rename, so a crashed stage never leaves a half-written CSV behind.

use crate::error::{PipelineError, Result};
use crate::types::CsvColumns;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read every record from a headered CSV file
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut records = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        let record: T = row.map_err(|e| {
            PipelineError::MalformedInput(format!(
                "{} record {}: {}",
                path.display(),
                index + 1,
                e
            ))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Serialize records to a CSV file with a header row, replacing any
/// existing file atomically
///
/// Zero records still produce the header line.
pub fn write_records<T: Serialize + CsvColumns>(path: &Path, records: &[T]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Temp file must live on the same filesystem as the target for the
    // rename to be atomic.
    let tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        if records.is_empty() {
            writer.write_record(T::COLUMNS)?;
        } else {
            for record in records {
                writer.serialize(record)?;
            }
        }
        writer.flush().map_err(PipelineError::Io)?;
    }
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}
