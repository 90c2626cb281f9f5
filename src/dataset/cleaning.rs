//! Column pruning for the raw manga dataset

use crate::config::ColumnDrop;
use crate::error::{MangaError, Result};
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Remove the columns selected by `rule` from a copy of `df`.
///
/// Positions are checked against the frame width; out-of-range positions
/// and unknown names are errors.
pub fn drop_columns(df: &DataFrame, rule: &ColumnDrop) -> Result<DataFrame> {
    let names: Vec<String> = match rule {
        ColumnDrop::Positions(positions) => {
            let columns = df.get_column_names();
            positions
                .iter()
                .map(|&pos| {
                    columns
                        .get(pos)
                        .map(|name| name.to_string())
                        .ok_or_else(|| {
                            MangaError::ValidationError(format!(
                                "cannot drop column {}: frame has {} columns",
                                pos,
                                columns.len()
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?
        }
        ColumnDrop::Names(names) => names.clone(),
    };

    let mut result = df.clone();
    for name in &names {
        result = result
            .drop(name)
            .map_err(|_| MangaError::FeatureNotFound(name.clone()))?;
    }

    info!(dropped = ?names, remaining = result.width(), "Dropped columns");
    Ok(result)
}

/// Keep only `columns`, in the given order
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    if let Some(missing) = columns.iter().find(|c| df.column(c.as_str()).is_err()) {
        return Err(MangaError::FeatureNotFound(missing.clone()));
    }

    let selected = df.select(columns.iter().map(|c| c.as_str()))?;
    info!(kept = selected.width(), dropped = df.width() - selected.width(), "Selected ML columns");
    Ok(selected)
}

/// Read the raw dataset, drop the configured columns and write the result,
/// replacing any existing output file.
pub fn clean_manga_dataset(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    rule: &ColumnDrop,
) -> Result<DataFrame> {
    let raw = DataLoader::new().load_csv(input_path)?;
    let mut cleaned = drop_columns(&raw, rule)?;
    DataSaver::save_csv(&mut cleaned, output_path)?;
    Ok(cleaned)
}
