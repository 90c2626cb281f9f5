//! Training engine: frame → matrices → split → forest → held-out metrics

use super::config::TrainingConfig;
use super::metrics::RegressionMetrics;
use super::random_forest::RandomForest;
use super::split::train_test_split;
use crate::error::{MangaError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Feature matrix, target vector and the column name of each matrix column
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_names: Vec<String>,
}

impl FeatureMatrix {
    /// Extract features and target from `df`.
    ///
    /// Every column not in `config.excluded_columns` becomes a feature, cast to
    /// f64 with missing values set to 0. Missing targets take the median of the
    /// observed targets. Excluded names must exist in `df`, and string columns
    /// are rejected rather than coerced.
    pub fn from_frame(df: &DataFrame, config: &TrainingConfig) -> Result<Self> {
        if let Some(missing) = config
            .excluded_columns
            .iter()
            .find(|c| df.column(c.as_str()).is_err())
        {
            return Err(MangaError::FeatureNotFound(missing.clone()));
        }

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| !config.excluded_columns.iter().any(|c| c == name.as_str()))
            .map(|name| name.to_string())
            .collect();

        if feature_names.is_empty() {
            return Err(MangaError::TrainingError(
                "no feature columns left after exclusions".to_string(),
            ));
        }

        let target = column_values(df, &config.target_column)?;
        let y = impute_median(&target)?;
        let x = columns_to_array2(df, &feature_names)?;

        Ok(Self { x, y, feature_names })
    }
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| MangaError::FeatureNotFound(name.to_string()))?;
    if matches!(column.dtype(), DataType::String) {
        return Err(MangaError::DataError(format!(
            "column '{}' holds strings, expected numeric values",
            name
        )));
    }
    let as_f64 = column.strict_cast(&DataType::Float64)?;
    let values = as_f64
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Named columns as a row-major f64 matrix, missing values set to 0
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| {
            column_values(df, name).map(|values| values.into_iter().map(|v| v.unwrap_or(0.0)).collect())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, col_names.len()), |(r, c)| col_data[c][r]))
}

/// Median of `values`, averaging the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Replace missing entries with the median of the observed ones
pub fn impute_median(values: &[Option<f64>]) -> Result<Array1<f64>> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.len() == values.len() {
        return Ok(Array1::from_vec(observed));
    }

    let fill = median(&observed).ok_or_else(|| {
        MangaError::DataError("target column has no observed values".to_string())
    })?;
    info!(missing = values.len() - observed.len(), fill, "Imputed missing targets with median");

    Ok(values.iter().map(|v| v.unwrap_or(fill)).collect())
}

/// Everything produced by one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub metrics: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub training_time_secs: f64,
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    feature_names: Vec<String>,
    model: Option<RandomForest>,
    test_predictions: Option<Array1<f64>>,
    report: Option<TrainingReport>,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            feature_names: Vec::new(),
            model: None,
            test_predictions: None,
            report: None,
        }
    }

    /// Prepare features from `df`, then split, fit and evaluate
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let data = FeatureMatrix::from_frame(df, &self.config)?;
        self.fit_matrix(data)
    }

    /// Split, fit and evaluate on an already extracted matrix
    pub fn fit_matrix(&mut self, data: FeatureMatrix) -> Result<&mut Self> {
        let start = Instant::now();
        let split = train_test_split(&data.x, &data.y, self.config.test_size, self.config.random_state)?;
        info!(
            train = split.y_train.len(),
            test = split.y_test.len(),
            features = data.feature_names.len(),
            "Split dataset"
        );

        let mut model = RandomForest::new_regressor(self.config.n_estimators)
            .with_random_state(self.config.random_state);
        if let Some(depth) = self.config.max_depth {
            model = model.with_max_depth(depth);
        }
        if let Some(n) = self.config.n_jobs {
            model = model.with_n_jobs(n);
        }
        model.fit(&split.x_train, &split.y_train)?;

        let predictions = model.predict(&split.x_test)?;
        let metrics = RegressionMetrics::compute(&split.y_test, &predictions)?;
        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            rmse = metrics.rmse,
            r2 = metrics.r2,
            trees = model.n_trees(),
            secs = training_time_secs,
            "Random forest trained"
        );

        self.report = Some(TrainingReport {
            metrics,
            n_train: split.y_train.len(),
            n_test: split.y_test.len(),
            n_features: data.feature_names.len(),
            training_time_secs,
        });
        self.feature_names = data.feature_names;
        self.test_predictions = Some(predictions);
        self.model = Some(model);

        Ok(self)
    }

    /// Held-out metrics and split sizes
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Trained forest
    pub fn model(&self) -> Option<&RandomForest> {
        self.model.as_ref()
    }

    /// Predictions on the held-out rows
    pub fn test_predictions(&self) -> Option<&Array1<f64>> {
        self.test_predictions.as_ref()
    }

    /// Feature names in matrix column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict for a frame with the same feature columns as the training frame
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let model = self.model.as_ref().ok_or(MangaError::ModelNotFitted)?;
        let x = columns_to_array2(df, &self.feature_names)?;
        model.predict(&x)
    }
}
