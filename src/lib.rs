//! mangascore - Which attributes drive manga popularity scores
//!
//! This crate turns a raw manga catalogue CSV into per-feature importances:
//! - Column cleaning with cached CSV stages
//! - One-hot expansion of list-valued categorical columns
//! - Random Forest regression on the score
//! - Ranked, persisted feature importances
//!
//! # Modules
//!
//! - [`config`] - Pipeline configuration
//! - [`dataset`] - Raw → cleaned → ML → feature-expanded stages and their caches
//! - [`preprocessing`] - List parsing, vocabularies and indicator expansion
//! - [`training`] - Split, regression trees and the Random Forest
//! - [`importance`] - Ranking and JSON persistence of importances
//! - [`pipeline`] - The end-to-end run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Data stages
pub mod dataset;
pub mod preprocessing;

// Modelling
pub mod training;
pub mod importance;
pub mod pipeline;

// Utilities
pub mod utils;

// Interface
pub mod cli;

pub use error::{MangaError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{MangaError, Result};

    pub use crate::config::{ColumnDrop, ExpansionColumn, PipelineConfig};

    pub use crate::dataset::{clean_manga_dataset, load_user, MangaDataset};

    pub use crate::preprocessing::{expand_features, extract_vocabulary, parse_list, ExpansionSpec, FeatureExpander};

    pub use crate::training::{RandomForest, RegressionMetrics, TrainEngine, TrainingConfig};

    pub use crate::importance::{json_load_feature_importances, to_json_feature_importances, FeatureImportanceReport};

    pub use crate::pipeline::{run_random_forest_feature_importance, PipelineOutcome};
}
