//! Feature importance ranking and JSON persistence

use crate::error::{MangaError, Result};
use ndarray::Array1;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Decimal places kept in the persisted mapping
pub const IMPORTANCE_DECIMALS: i32 = 3;

/// Round `value` to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Write a feature → importance mapping as a flat JSON object
pub fn to_json_feature_importances(importances: &BTreeMap<String, f64>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, importances)?;
    writer.flush()?;
    Ok(())
}

/// Read a mapping written by [`to_json_feature_importances`]
pub fn json_load_feature_importances(path: impl AsRef<Path>) -> Result<BTreeMap<String, f64>> {
    let reader = BufReader::new(File::open(path)?);
    let importances = serde_json::from_reader(reader)?;
    Ok(importances)
}

/// Features ranked by importance, highest first
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportanceReport {
    ranked: Vec<(String, f64)>,
}

impl FeatureImportanceReport {
    /// Pair `feature_names` with `importances` and sort descending.
    /// Equal importances are ordered by name.
    pub fn new(feature_names: &[String], importances: &Array1<f64>) -> Result<Self> {
        if feature_names.len() != importances.len() {
            return Err(MangaError::ShapeError {
                expected: format!("{} importances", feature_names.len()),
                actual: format!("{} importances", importances.len()),
            });
        }

        let mut ranked: Vec<(String, f64)> = feature_names
            .iter()
            .cloned()
            .zip(importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Self { ranked })
    }

    /// Every feature, highest importance first
    pub fn ranked(&self) -> &[(String, f64)] {
        &self.ranked
    }

    /// The `n` most important features
    pub fn top(&self, n: usize) -> &[(String, f64)] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// `"{rank}. {name}: {importance:.3}"` lines for the top `n`, rank starting at 1
    pub fn format_top(&self, n: usize) -> Vec<String> {
        self.top(n)
            .iter()
            .enumerate()
            .map(|(i, (name, importance))| format!("{}. {}: {:.3}", i + 1, name, importance))
            .collect()
    }

    /// All features mapped to their importance rounded to three decimals
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.ranked
            .iter()
            .map(|(name, importance)| (name.clone(), round_to(*importance, IMPORTANCE_DECIMALS)))
            .collect()
    }

    /// Write the rounded mapping to `path`, read it back and check that it
    /// survived the round trip.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<BTreeMap<String, f64>> {
        let path = path.as_ref();
        let map = self.to_map();
        to_json_feature_importances(&map, path)?;

        let reloaded = json_load_feature_importances(path)?;
        let matches = reloaded.len() == map.len()
            && map
                .iter()
                .all(|(k, v)| reloaded.get(k).is_some_and(|r| (r - v).abs() < 1e-9));
        if !matches {
            return Err(MangaError::SerializationError(format!(
                "feature importances in {} do not match what was written",
                path.display()
            )));
        }

        info!(path = %path.display(), features = map.len(), "Feature importances saved");
        Ok(reloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(0.0006, 3), 0.001);
        assert_eq!(round_to(0.0004, 3), 0.0);
    }

    #[test]
    fn test_ranking_descending_with_name_ties() {
        let report = FeatureImportanceReport::new(
            &names(&["theme_School", "genre_Action", "genre_Drama", "demographic_Shounen"]),
            &array![0.1, 0.5, 0.1, 0.3],
        )
        .unwrap();

        let order: Vec<&str> = report.ranked().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["genre_Action", "demographic_Shounen", "genre_Drama", "theme_School"]);
        assert_eq!(report.top(2).len(), 2);
        assert_eq!(report.top(10).len(), 4);
    }

    #[test]
    fn test_format_top_is_one_based() {
        let report =
            FeatureImportanceReport::new(&names(&["genre_Action", "genre_Comedy"]), &array![0.25, 0.75]).unwrap();
        assert_eq!(
            report.format_top(1),
            vec!["1. genre_Comedy: 0.750".to_string()]
        );
    }

    #[test]
    fn test_map_holds_all_features_rounded() {
        let report = FeatureImportanceReport::new(
            &names(&["a", "b", "c"]),
            &array![0.66666, 0.33333, 0.00001],
        )
        .unwrap();
        let map = report.to_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], 0.667);
        assert_eq!(map["b"], 0.333);
        assert_eq!(map["c"], 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = FeatureImportanceReport::new(&names(&["a"]), &array![0.5, 0.5]).unwrap_err();
        assert!(matches!(err, MangaError::ShapeError { .. }));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_importance.json");

        let mut map = BTreeMap::new();
        map.insert("genre_Slice_of_Life".to_string(), 0.123);
        map.insert("theme_Gore".to_string(), 0.0);
        to_json_feature_importances(&map, &path).unwrap();

        assert_eq!(json_load_feature_importances(&path).unwrap(), map);
    }

    #[test]
    fn test_persist_returns_reloaded_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("feature_importance.json");
        let report =
            FeatureImportanceReport::new(&names(&["genre_Action", "genre_Comedy"]), &array![0.6, 0.4]).unwrap();

        let saved = report.persist(&path).unwrap();
        assert_eq!(saved, report.to_map());
    }
}
