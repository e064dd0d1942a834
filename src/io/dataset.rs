//! Dataset snapshot JSON read/write.
//!
//! A refresh replaces the snapshot wholesale: the JSON is written to a sibling
//! temp file and renamed over the target, so readers see either the previous
//! snapshot or the new one.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::Dataset;
use crate::error::AppError;

/// Write `dataset` as pretty JSON, replacing any existing file at `path`.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display())))?;
    }

    let tmp = temp_path(path);
    let file = File::create(&tmp)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset JSON '{}': {e}", tmp.display())))?;
    let mut writer = BufWriter::new(file);

    let written = serde_json::to_writer_pretty(&mut writer, dataset)
        .map_err(|e| AppError::new(2, format!("Failed to write dataset JSON: {e}")))
        .and_then(|()| {
            writer
                .flush()
                .map_err(|e| AppError::new(2, format!("Failed to flush dataset JSON: {e}")))
        });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::new(2, format!("Failed to replace dataset JSON '{}': {e}", path.display()))
    })?;

    log::info!("Wrote {} records to {}", dataset.data.len(), path.display());
    Ok(())
}

/// Read a dataset snapshot.
pub fn read_dataset_json(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dataset JSON '{}': {e}", path.display())))?;
    let dataset: Dataset = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid dataset JSON '{}': {e}", path.display())))?;
    Ok(dataset)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
