//! Manga dataset stages
//!
//! raw CSV → cleaned CSV → ML-cleaned CSV → feature-expanded CSV.
//! Each derived file is a cache built on first use (see [`cache`]).

pub mod cache;
pub mod cleaning;
pub mod user;

pub use cache::{load_cached, CacheStatus, CachedArtifact};
pub use cleaning::{clean_manga_dataset, drop_columns, select_columns};
pub use user::{load_user, USER_COLUMNS};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::preprocessing::FeatureExpander;
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use tracing::info;

/// Access to every dataset stage for one data directory
#[derive(Debug, Clone)]
pub struct MangaDataset {
    config: PipelineConfig,
}

impl MangaDataset {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cleaned dataset, built from the raw file if missing
    pub fn load_data(&self) -> Result<DataFrame> {
        CachedArtifact::new(self.config.cleaned_path()).load_or_compute(|| {
            let raw = DataLoader::new().load_csv(self.config.raw_path())?;
            info!(rows = raw.height(), cols = raw.width(), "Loaded raw dataset");
            drop_columns(&raw, &self.config.clean_drop)
        })
    }

    /// ML-oriented column subset of the cleaned dataset
    pub fn load_ml_data(&self) -> Result<DataFrame> {
        CachedArtifact::new(self.config.ml_path()).load_or_compute(|| {
            let cleaned = self.load_data()?;
            select_columns(&cleaned, &self.config.ml_columns)
        })
    }

    /// Feature-expanded dataset, ready for training
    pub fn load_ml_featureset(&self) -> Result<DataFrame> {
        CachedArtifact::new(self.config.features_path()).load_or_compute(|| {
            let ml = self.load_ml_data()?;
            let expander = FeatureExpander::fit(&ml, &self.config.expansions)?;
            info!(features = expander.feature_names().len(), "Built categorical vocabularies");
            expander.transform(&ml)
        })
    }

    /// Rewrite the cleaned and ML-cleaned files from the raw file and drop
    /// the feature cache, so the next [`load_ml_featureset`](Self::load_ml_featureset)
    /// rebuilds vocabularies from the new data.
    pub fn rebuild(&self) -> Result<(DataFrame, DataFrame)> {
        let cleaned = clean_manga_dataset(
            self.config.raw_path(),
            self.config.cleaned_path(),
            &self.config.clean_drop,
        )?;
        let mut ml = select_columns(&cleaned, &self.config.ml_columns)?;
        DataSaver::save_csv(&mut ml, self.config.ml_path())?;
        CachedArtifact::new(self.config.features_path()).invalidate()?;
        Ok((cleaned, ml))
    }

    /// User table, created header-only if missing
    pub fn load_user(&self) -> Result<DataFrame> {
        load_user(self.config.user_path())
    }
}
