//! End-to-end feature importance run

use crate::config::PipelineConfig;
use crate::dataset::MangaDataset;
use crate::error::{MangaError, Result};
use crate::importance::FeatureImportanceReport;
use crate::training::{TrainEngine, TrainingConfig, TrainingReport};
use std::path::PathBuf;
use tracing::info;

/// Result of [`run_random_forest_feature_importance`]
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Held-out metrics and split sizes
    pub training: TrainingReport,
    /// Features ranked by importance
    pub importances: FeatureImportanceReport,
    /// Where the importance mapping was written
    pub importance_path: PathBuf,
}

/// Load (or build) the feature-expanded dataset, fit a Random Forest on the
/// popularity score and persist the per-feature importances as JSON.
pub fn run_random_forest_feature_importance(config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    let dataset = MangaDataset::new(config.clone());
    let features = dataset.load_ml_featureset()?;
    info!(rows = features.height(), cols = features.width(), "Loaded feature set");

    let mut engine = TrainEngine::new(TrainingConfig::from(config));
    engine.fit(&features)?;

    let training = engine.report().cloned().ok_or(MangaError::ModelNotFitted)?;
    let importances = engine
        .model()
        .and_then(|m| m.feature_importances())
        .ok_or(MangaError::ModelNotFitted)?;
    let report = FeatureImportanceReport::new(engine.feature_names(), importances)?;

    let importance_path = config.importance_path();
    report.persist(&importance_path)?;

    Ok(PipelineOutcome {
        training,
        importances: report,
        importance_path,
    })
}
