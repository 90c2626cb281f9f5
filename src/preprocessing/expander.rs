//! One-hot expansion of list-encoded categorical columns

use super::vocabulary::{extract_vocabulary, parse_column, Vocabulary};
use crate::config::ExpansionColumn;
use crate::error::{MangaError, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Column name for the indicator of `item` under `prefix`.
///
/// Spaces and hyphens in the item become underscores.
pub fn feature_name(prefix: &str, item: &str) -> String {
    let sanitized: String = item
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    format!("{}_{}", prefix, sanitized)
}

/// One column to expand together with its fixed vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionSpec {
    pub column: String,
    pub vocabulary: Vocabulary,
    pub prefix: String,
}

impl ExpansionSpec {
    pub fn new(column: impl Into<String>, vocabulary: Vocabulary, prefix: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            vocabulary,
            prefix: prefix.into(),
        }
    }

    /// Derived column names, in vocabulary order
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary
            .iter()
            .map(|item| feature_name(&self.prefix, item))
            .collect()
    }
}

/// Replaces each configured list column with one 0/1 column per vocabulary item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureExpander {
    specs: Vec<ExpansionSpec>,
}

impl FeatureExpander {
    /// Create an expander from explicit specs
    pub fn new(specs: Vec<ExpansionSpec>) -> Self {
        Self { specs }
    }

    /// Build the vocabulary of every configured column from `df`
    pub fn fit(df: &DataFrame, columns: &[ExpansionColumn]) -> Result<Self> {
        let specs = columns
            .iter()
            .map(|c| {
                let vocabulary = extract_vocabulary(df, &c.column)?;
                debug!(column = %c.column, items = vocabulary.len(), "Extracted vocabulary");
                Ok(ExpansionSpec::new(c.column.clone(), vocabulary, c.prefix.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ExpansionSpec] {
        &self.specs
    }

    /// Every derived column name across all specs
    pub fn feature_names(&self) -> Vec<String> {
        self.specs.iter().flat_map(|s| s.feature_names()).collect()
    }

    /// Expand `df` into a new frame. The input frame is left untouched.
    ///
    /// Derived columns are appended after the existing ones and the source
    /// column is dropped once its indicators are in place.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for spec in &self.specs {
            let rows = parse_column(&result, &spec.column)?;
            let row_sets: Vec<HashSet<&str>> = rows
                .iter()
                .map(|tokens| tokens.iter().map(|t| t.as_str()).collect())
                .collect();

            let mut taken: HashSet<String> = result
                .get_column_names()
                .into_iter()
                .filter(|name| name.as_str() != spec.column)
                .map(|name| name.to_string())
                .collect();

            let names = spec.feature_names();
            for name in &names {
                if !taken.insert(name.clone()) {
                    return Err(MangaError::PreprocessingError(format!(
                        "feature column '{}' from '{}' collides with an existing column",
                        name, spec.column
                    )));
                }
            }

            let pairs: Vec<(&String, &String)> = spec.vocabulary.iter().zip(names.iter()).collect();
            let indicators: Vec<Series> = pairs
                .par_iter()
                .map(|&(item, name)| {
                    let values: Vec<i32> = row_sets
                        .iter()
                        .map(|set| i32::from(set.contains(item.as_str())))
                        .collect();
                    Series::new(name.as_str().into(), values)
                })
                .collect();

            for series in indicators {
                result.with_column(series)?;
            }
            result = result.drop(&spec.column)?;

            debug!(
                column = %spec.column,
                added = names.len(),
                width = result.width(),
                "Expanded categorical column"
            );
        }

        Ok(result)
    }
}

/// Expand `df` with the given specs in one call
pub fn expand_features(df: &DataFrame, specs: &[ExpansionSpec]) -> Result<DataFrame> {
    FeatureExpander::new(specs.to_vec()).transform(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre_vocab() -> Vocabulary {
        ["Action", "Comedy"].iter().map(|s| s.to_string()).collect()
    }

    fn indicator(df: &DataFrame, name: &str) -> Vec<i32> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn test_feature_name_sanitization() {
        assert_eq!(feature_name("genre", "Slice of Life"), "genre_Slice_of_Life");
        assert_eq!(feature_name("genre", "Sci-Fi"), "genre_Sci_Fi");
        assert_eq!(feature_name("theme", "Gore"), "theme_Gore");
    }

    #[test]
    fn test_expand_genre_scenario() {
        let df = df!(
            "id" => &[1i64, 2, 3],
            "genres" => &["Action, Comedy", "Action", ""]
        )
        .unwrap();

        let spec = ExpansionSpec::new("genres", genre_vocab(), "genre");
        let out = expand_features(&df, &[spec]).unwrap();

        assert_eq!(indicator(&out, "genre_Action"), vec![1, 1, 0]);
        assert_eq!(indicator(&out, "genre_Comedy"), vec![1, 0, 0]);
        assert!(out.column("genres").is_err());
    }

    #[test]
    fn test_shape_guarantee_and_input_untouched() {
        let df = df!(
            "id" => &[1i64, 2],
            "genres" => &["['Action']", "['Comedy', 'Drama']"],
            "themes" => &[Some("School"), None]
        )
        .unwrap();

        let expander = FeatureExpander::fit(
            &df,
            &[
                ExpansionColumn::new("genres", "genre"),
                ExpansionColumn::new("themes", "theme"),
            ],
        )
        .unwrap();
        let out = expander.transform(&df).unwrap();

        // 3 - 2 + (3 genres + 1 theme)
        assert_eq!(out.width(), 5);
        assert_eq!(out.height(), df.height());
        assert_eq!(df.width(), 3);
        assert!(df.column("genres").is_ok());
        assert_eq!(indicator(&out, "theme_School"), vec![1, 0]);
    }

    #[test]
    fn test_duplicate_tokens_count_once() {
        let df = df!("genres" => &["Action, Action, Comedy"]).unwrap();
        let spec = ExpansionSpec::new("genres", genre_vocab(), "genre");
        let out = expand_features(&df, &[spec]).unwrap();

        let total: i32 = indicator(&out, "genre_Action")[0] + indicator(&out, "genre_Comedy")[0];
        assert_eq!(total, 2);
    }

    #[test]
    fn test_item_absent_from_vocabulary_is_ignored() {
        let df = df!("genres" => &["Horror"]).unwrap();
        let spec = ExpansionSpec::new("genres", genre_vocab(), "genre");
        let out = expand_features(&df, &[spec]).unwrap();
        assert_eq!(out.width(), 2);
        assert_eq!(indicator(&out, "genre_Action"), vec![0]);
    }

    #[test]
    fn test_sanitized_collision_is_rejected() {
        let df = df!("genres" => &["Sci-Fi"]).unwrap();
        let vocab: Vocabulary = ["Sci-Fi", "Sci Fi"].iter().map(|s| s.to_string()).collect();
        let spec = ExpansionSpec::new("genres", vocab, "genre");
        assert!(matches!(
            expand_features(&df, &[spec]),
            Err(MangaError::PreprocessingError(_))
        ));
    }

    #[test]
    fn test_missing_source_column() {
        let df = df!("id" => &[1i64]).unwrap();
        let spec = ExpansionSpec::new("genres", genre_vocab(), "genre");
        assert!(matches!(
            expand_features(&df, &[spec]),
            Err(MangaError::FeatureNotFound(_))
        ));
    }
}
