//! Training configuration

use crate::config::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the split → fit → evaluate run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Regression target column
    pub target_column: String,

    /// Columns excluded from the feature matrix (target included)
    pub excluded_columns: Vec<String>,

    /// Held-out fraction
    pub test_size: f64,

    /// Seed for the split and the forest
    pub random_state: u64,

    // Forest parameters
    /// Number of trees
    pub n_estimators: usize,

    /// Maximum depth of trees (None = unbounded)
    pub max_depth: Option<usize>,

    /// Number of worker threads (None = all cores)
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for TrainingConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            target_column: config.target_column.clone(),
            excluded_columns: config.excluded_columns.clone(),
            test_size: config.test_size,
            random_state: config.random_state,
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            n_jobs: config.n_jobs,
        }
    }
}

impl TrainingConfig {
    /// Create a configuration for `target` with no other excluded columns
    pub fn new(target: &str) -> Self {
        Self {
            target_column: target.to_string(),
            excluded_columns: vec![target.to_string()],
            ..Self::default()
        }
    }

    /// Builder method to exclude additional columns from the features
    pub fn with_excluded(mut self, columns: &[&str]) -> Self {
        for column in columns {
            if !self.excluded_columns.iter().any(|c| c == column) {
                self.excluded_columns.push(column.to_string());
            }
        }
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
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_pipeline_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.target_column, "score");
        assert_eq!(config.n_estimators, 300);
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert!(config.excluded_columns.contains(&"favorited".to_string()));
    }

    #[test]
    fn test_new_excludes_only_target() {
        let config = TrainingConfig::new("target").with_excluded(&["id", "target"]);
        assert_eq!(config.excluded_columns, vec!["target".to_string(), "id".to_string()]);
    }
}
