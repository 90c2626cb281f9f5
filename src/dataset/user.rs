//! User profile table

use crate::error::Result;
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Header of the user data file
pub const USER_COLUMNS: [&str; 6] = [
    "username",
    "age",
    "gender",
    "preferred_genres",
    "preferred_themes",
    "read_manga",
];

/// Load the user table, creating a header-only file first if none exists.
///
/// A freshly created table is returned as an empty frame with string columns.
pub fn load_user(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if path.exists() {
        return DataLoader::new().load_csv(path);
    }

    let columns: Vec<Column> = USER_COLUMNS
        .iter()
        .map(|&name| Column::from(Series::new_empty(name.into(), &DataType::String)))
        .collect();
    let mut df = DataFrame::new(columns)?;
    DataSaver::save_csv(&mut df, path)?;
    info!(path = %path.display(), "Created empty user data file");

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.csv");

        let df = load_user(&path).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), USER_COLUMNS.len());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next().unwrap(), USER_COLUMNS.join(","));
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.csv");
        std::fs::write(
            &path,
            "username,age,gender,preferred_genres,preferred_themes,read_manga\n\
             reader1,24,F,\"['Action']\",\"['School']\",\"[1, 2]\"\n",
        )
        .unwrap();

        let df = load_user(&path).unwrap();
        assert_eq!(df.shape(), (1, 6));
    }
}
