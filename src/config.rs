//! Pipeline configuration
//!
//! Every path and hyperparameter the pipeline uses lives here. Paths are
//! resolved against an explicit `data_dir` root.

use crate::error::{MangaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the first cleaning step selects the columns to remove
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnDrop {
    /// Zero-based column positions in the raw file
    Positions(Vec<usize>),
    /// Column names
    Names(Vec<String>),
}

impl Default for ColumnDrop {
    fn default() -> Self {
        // German, French and Spanish localized names
        ColumnDrop::Positions(vec![12, 13, 14])
    }
}

/// One categorical list column to expand into indicator columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionColumn {
    /// Source column holding list-encoded cells
    pub column: String,
    /// Prefix for the derived indicator columns
    pub prefix: String,
}

impl ExpansionColumn {
    pub fn new(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            prefix: prefix.into(),
        }
    }
}

/// Configuration for the full clean → expand → train → report pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root directory holding every input and derived artifact
    pub data_dir: PathBuf,

    /// Raw dataset file name
    pub raw_file: String,
    /// Cleaned dataset file name
    pub cleaned_file: String,
    /// ML-oriented subset file name
    pub ml_file: String,
    /// Feature-expanded cache file name
    pub features_file: String,
    /// User data file name
    pub user_file: String,
    /// Feature importance output file name
    pub importance_file: String,

    /// Columns removed when cleaning the raw dataset
    pub clean_drop: ColumnDrop,
    /// Columns kept (by name) in the ML-oriented subset
    pub ml_columns: Vec<String>,
    /// Categorical list columns to one-hot expand
    pub expansions: Vec<ExpansionColumn>,

    /// Regression target
    pub target_column: String,
    /// Columns never used as features (target included)
    pub excluded_columns: Vec<String>,

    /// Held-out fraction
    pub test_size: f64,
    /// Seed for the split and the forest
    pub random_state: u64,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth (None = unbounded)
    pub max_depth: Option<usize>,
    /// Worker threads for tree construction (None = all cores)
    pub n_jobs: Option<usize>,
    /// Number of ranked features to display
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Dataset"),
            raw_file: "manga_entries.csv".to_string(),
            cleaned_file: "cleaned_manga_entries.csv".to_string(),
            ml_file: "ml_cleaned_manga_entries.csv".to_string(),
            features_file: "test_ml_dataset.csv".to_string(),
            user_file: "user_data.csv".to_string(),
            importance_file: "feature_importance.json".to_string(),
            clean_drop: ColumnDrop::default(),
            ml_columns: [
                "id",
                "score",
                "scored_by",
                "ranked",
                "popularity",
                "members",
                "favorited",
                "serialization",
                "genres",
                "themes",
                "demographic",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            expansions: vec![
                ExpansionColumn::new("genres", "genre"),
                ExpansionColumn::new("themes", "theme"),
                ExpansionColumn::new("serialization", "serialization"),
                ExpansionColumn::new("demographic", "demographic"),
            ],
            target_column: "score".to_string(),
            excluded_columns: [
                "id",
                "score",
                "scored_by",
                "ranked",
                "popularity",
                "members",
                "favorited",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            test_size: 0.2,
            random_state: 42,
            n_estimators: 300,
            max_depth: None,
            n_jobs: None,
            top_n: 50,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration rooted at `data_dir` with default values
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the number of trees
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Builder method to cap tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builder method to set the number of worker threads
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Builder method to set how many ranked features are displayed
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Builder method to set the cleaning drop rule
    pub fn with_clean_drop(mut self, drop: ColumnDrop) -> Self {
        self.clean_drop = drop;
        self
    }

    /// Builder method to replace the expansion columns
    pub fn with_expansions(mut self, expansions: Vec<ExpansionColumn>) -> Self {
        self.expansions = expansions;
        self
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file)
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.data_dir.join(&self.cleaned_file)
    }

    pub fn ml_path(&self) -> PathBuf {
        self.data_dir.join(&self.ml_file)
    }

    pub fn features_path(&self) -> PathBuf {
        self.data_dir.join(&self.features_file)
    }

    pub fn user_path(&self) -> PathBuf {
        self.data_dir.join(&self.user_file)
    }

    pub fn importance_path(&self) -> PathBuf {
        self.data_dir.join(&self.importance_file)
    }

    /// Check hyperparameters and column settings for consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(MangaError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        if self.n_estimators == 0 {
            return Err(MangaError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.n_jobs == Some(0) {
            return Err(MangaError::InvalidParameter {
                name: "n_jobs".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1 (omit for all cores)".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(MangaError::InvalidParameter {
                name: "max_depth".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1 (omit for unbounded)".to_string(),
            });
        }
        if !self.excluded_columns.contains(&self.target_column) {
            return Err(MangaError::ConfigError(format!(
                "target column '{}' must be listed in excluded_columns",
                self.target_column
            )));
        }
        for exp in &self.expansions {
            if exp.prefix.is_empty() {
                return Err(MangaError::ConfigError(format!(
                    "expansion of '{}' has an empty prefix",
                    exp.column
                )));
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MangaError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
