//! CSV output for collected catalog records.

use crate::models::Record;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { path: PathBuf, records: usize },
    /// Nothing collected, so no file was created.
    Empty,
}

/// Write all records with a header row. Zero records writes nothing.
pub fn save_records(path: &Path, records: &[Record]) -> Result<SaveOutcome> {
    if records.is_empty() {
        warn!("No data to save");
        return Ok(SaveOutcome::Empty);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record {:?}", record.name))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

    info!("Saved {} assessments to {:?}", records.len(), path);
    Ok(SaveOutcome::Written {
        path: path.to_path_buf(),
        records: records.len(),
    })
}
