//! CSV loading and saving

use crate::error::{MangaError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// CSV reader shared by every pipeline stage
#[derive(Debug, Clone, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file with a header row, scanning every row for schema inference
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MangaError::DataError(format!("{}: {}", path.display(), e)))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| MangaError::DataError(format!("{}: {}", path.display(), e)))
    }
}

/// Writes frames back to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row, replacing any existing file
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| MangaError::DataError(format!("{}: {}", path.display(), e)))
    }
}
