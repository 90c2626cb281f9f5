//! Model training module
//!
//! Provides regression training for the popularity score:
//! - Regression trees and a bootstrap Random Forest
//! - Seeded train/test splitting
//! - Feature matrix extraction with zero and median imputation
//! - Held-out RMSE / R² evaluation

mod config;
mod engine;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use config::TrainingConfig;
pub use engine::{impute_median, median, FeatureMatrix, TrainEngine, TrainingReport};
pub use decision_tree::{DecisionTree, TreeNode};
pub use metrics::RegressionMetrics;
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{split_indices, train_test_split, TrainTestSplit};
