//! Existence-checked CSV artifact cache
//!
//! An artifact is computed only when its file is absent. The frame handed
//! back is always the one read from disk, so callers see exactly what a
//! later run will see. Contents are never validated: a stale file stays in
//! use until it is deleted.

use crate::error::Result;
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Whether the last load found the artifact or had to build it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Computed,
}

/// A derived CSV file that is built on first use
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    path: PathBuf,
    loader: DataLoader,
}

impl CachedArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loader: DataLoader::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the artifact so the next load recomputes it.
    /// Returns whether a file was removed.
    pub fn invalidate(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        info!(path = %self.path.display(), "Cache invalidated");
        Ok(true)
    }

    /// Load the artifact, running `compute` and persisting its output first
    /// if the file does not exist yet.
    pub fn load_or_compute<F>(&self, compute: F) -> Result<DataFrame>
    where
        F: FnOnce() -> Result<DataFrame>,
    {
        self.load_with_status(compute).map(|(df, _)| df)
    }

    /// Same as [`load_or_compute`](Self::load_or_compute), also reporting
    /// whether `compute` ran.
    pub fn load_with_status<F>(&self, compute: F) -> Result<(DataFrame, CacheStatus)>
    where
        F: FnOnce() -> Result<DataFrame>,
    {
        let status = if self.exists() {
            info!(path = %self.path.display(), "Cache hit");
            CacheStatus::Hit
        } else {
            let start = Instant::now();
            let mut df = compute()?;
            DataSaver::save_csv(&mut df, &self.path)?;
            info!(
                path = %self.path.display(),
                rows = df.height(),
                cols = df.width(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Cache miss, artifact written"
            );
            CacheStatus::Computed
        };

        let df = self.loader.load_csv(&self.path)?;
        Ok((df, status))
    }
}

/// Load `path`, computing and persisting it with `compute` when absent
pub fn load_cached<F>(path: impl Into<PathBuf>, compute: F) -> Result<DataFrame>
where
    F: FnOnce() -> Result<DataFrame>,
{
    CachedArtifact::new(path).load_or_compute(compute)
}
