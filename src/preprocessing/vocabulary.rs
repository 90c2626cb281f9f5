//! Vocabulary extraction for list-encoded categorical columns

use super::list_parser::parse_list;
use crate::error::{MangaError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;

/// Distinct items observed in one categorical column, in sorted order
pub type Vocabulary = BTreeSet<String>;

/// Parse every cell of `column` into its token list, one entry per row.
///
/// A column with no observed values (all-null dtype) parses to empty lists.
pub fn parse_column(df: &DataFrame, column: &str) -> Result<Vec<Vec<String>>> {
    let col = df
        .column(column)
        .map_err(|_| MangaError::FeatureNotFound(column.to_string()))?;
    let series = col.as_materialized_series();

    match series.dtype() {
        DataType::Null => Ok(vec![Vec::new(); series.len()]),
        DataType::String => {
            let ca = series.str()?;
            Ok(ca.into_iter().map(parse_list).collect())
        }
        other => Err(MangaError::DataError(format!(
            "column '{}' holds {:?}, expected list-encoded strings",
            column, other
        ))),
    }
}

/// Union of the parsed tokens of every cell in `column`.
///
/// Null cells and cells that fail to parse contribute nothing.
pub fn extract_vocabulary(df: &DataFrame, column: &str) -> Result<Vocabulary> {
    let vocabulary: Vocabulary = parse_column(df, column)?
        .into_iter()
        .flatten()
        .collect();

    Ok(vocabulary)
}
