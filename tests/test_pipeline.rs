//! Integration test: raw CSV → cached stages → forest → importance JSON

use mangascore::cli::cmd_clean;
use mangascore::config::{ColumnDrop, PipelineConfig};
use mangascore::dataset::{CacheStatus, CachedArtifact, MangaDataset};
use mangascore::importance::json_load_feature_importances;
use mangascore::pipeline::run_random_forest_feature_importance;
use mangascore::MangaError;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "id,title,score,scored_by,ranked,popularity,members,favorited,genres,themes,\
demographic,serialization,english_title,japanese_title,title_synonyms,authors,url";

/// 40 rows where Action adds 2 points to the score and Comedy adds 0.3
fn write_raw_catalogue(dir: &Path) {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for i in 0..40 {
        let action = i % 2 == 0;
        let comedy = i % 3 == 0;
        let mut genres = Vec::new();
        if action {
            genres.push("'Action'");
        }
        if comedy {
            genres.push("'Comedy'");
        }
        if i % 5 == 0 {
            genres.push("'Slice of Life'");
        }
        let themes = if i % 4 == 0 { "['School']" } else { "[]" };
        let demographic = if i % 7 < 3 { "['Shounen']" } else { "['Seinen']" };
        let serialization = if i % 3 == 1 { "['Weekly Shounen Jump']" } else { "['Young Animal']" };

        // One unscored title exercises median imputation
        let score = if i == 7 {
            String::new()
        } else {
            let s = 6.0 + if action { 2.0 } else { 0.0 } + if comedy { 0.3 } else { 0.0 };
            format!("{:.2}", s)
        };

        csv.push_str(&format!(
            "{id},Title {id},{score},{sb},{rank},{pop},{members},{fav},\"[{genres}]\",\"{themes}\",\
\"{demographic}\",\"{serialization}\",English {id},Japanese {id},[],\"['Author {id}']\",https://example.org/{id}\n",
            id = i + 1,
            score = score,
            sb = 1000 + i * 10,
            rank = i + 1,
            pop = 40 - i,
            members = 5000 + i * 100,
            fav = 10 * i,
            genres = genres.join(", "),
            themes = themes,
            demographic = demographic,
            serialization = serialization,
        ));
    }

    std::fs::write(dir.join("manga_entries.csv"), csv).unwrap();
}

fn small_config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::new(dir.path()).with_n_estimators(25).with_top_n(5)
}

#[test]
fn test_full_run_writes_every_feature() {
    let dir = TempDir::new().unwrap();
    write_raw_catalogue(dir.path());
    let config = small_config(&dir);

    let outcome = run_random_forest_feature_importance(&config).unwrap();

    assert!(config.cleaned_path().exists());
    assert!(config.ml_path().exists());
    assert!(config.features_path().exists());

    assert_eq!(outcome.training.n_test, 8);
    assert_eq!(outcome.training.n_train, 32);

    let saved = json_load_feature_importances(&outcome.importance_path).unwrap();
    let expected = [
        "genre_Action",
        "genre_Comedy",
        "genre_Slice_of_Life",
        "theme_School",
        "serialization_Weekly_Shounen_Jump",
        "serialization_Young_Animal",
        "demographic_Seinen",
        "demographic_Shounen",
    ];
    assert_eq!(saved.len(), expected.len());
    for name in expected {
        assert!(saved.contains_key(name), "missing {}", name);
    }
    assert_eq!(outcome.importances.top(1)[0].0, "genre_Action");

    let total: f64 = saved.values().sum();
    assert!((total - 1.0).abs() < 0.01, "importances sum to {}", total);
}

#[test]
fn test_cleaning_drops_localized_titles() {
    let dir = TempDir::new().unwrap();
    write_raw_catalogue(dir.path());
    let dataset = MangaDataset::new(small_config(&dir));

    let cleaned = dataset.load_data().unwrap();
    let names: Vec<String> = cleaned.get_column_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(cleaned.width(), 14);
    assert!(!names.contains(&"english_title".to_string()));
    assert!(!names.contains(&"title_synonyms".to_string()));
    assert!(names.contains(&"authors".to_string()));

    let ml = dataset.load_ml_data().unwrap();
    assert_eq!(ml.width(), 11);
    assert_eq!(ml.height(), 40);
}

#[test]
fn test_cached_stages_are_reused() {
    let dir = TempDir::new().unwrap();
    write_raw_catalogue(dir.path());
    let config = small_config(&dir);

    run_random_forest_feature_importance(&config).unwrap();
    let features_before = std::fs::read(config.features_path()).unwrap();
    let json_before = json_load_feature_importances(config.importance_path()).unwrap();

    // The raw file is no longer needed once the caches exist
    std::fs::remove_file(config.raw_path()).unwrap();

    run_random_forest_feature_importance(&config).unwrap();
    assert_eq!(std::fs::read(config.features_path()).unwrap(), features_before);
    assert_eq!(json_load_feature_importances(config.importance_path()).unwrap(), json_before);

    let (_, status) = CachedArtifact::new(config.features_path())
        .load_with_status(|| panic!("cache should be hit"))
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);
}

#[test]
fn test_forced_clean_picks_up_raw_changes() {
    let dir = TempDir::new().unwrap();
    write_raw_catalogue(dir.path());
    let config = small_config(&dir);

    let first = run_random_forest_feature_importance(&config).unwrap();
    assert!(!first.importances.to_map().contains_key("genre_Horror"));

    let raw = std::fs::read_to_string(config.raw_path()).unwrap();
    std::fs::write(config.raw_path(), raw.replace("'Action'", "'Action', 'Horror'")).unwrap();

    cmd_clean(&config, true).unwrap();
    assert!(!config.features_path().exists());

    run_random_forest_feature_importance(&config).unwrap();
    let saved = json_load_feature_importances(config.importance_path()).unwrap();
    assert!(saved.contains_key("genre_Horror"));
    assert!(saved.contains_key("genre_Action"));
}

#[test]
fn test_missing_raw_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = run_random_forest_feature_importance(&small_config(&dir)).unwrap_err();
    assert!(matches!(err, MangaError::DataError(_)), "got {:?}", err);
    assert!(!small_config(&dir).cleaned_path().exists());
}

#[test]
fn test_drop_by_name_keeps_positions_irrelevant() {
    let dir = TempDir::new().unwrap();
    write_raw_catalogue(dir.path());
    let config = small_config(&dir).with_clean_drop(ColumnDrop::Names(vec![
        "url".to_string(),
        "english_title".to_string(),
    ]));

    let cleaned = MangaDataset::new(config).load_data().unwrap();
    assert_eq!(cleaned.width(), 15);
}

#[test]
fn test_invalid_config_is_rejected_before_io() {
    let dir = TempDir::new().unwrap();
    let config = small_config(&dir).with_test_size(1.5);
    let err = run_random_forest_feature_importance(&config).unwrap_err();
    assert!(matches!(err, MangaError::InvalidParameter { .. }));
}

#[test]
fn test_user_table_created_once() {
    let dir = TempDir::new().unwrap();
    let dataset = MangaDataset::new(small_config(&dir));

    let users = dataset.load_user().unwrap();
    assert_eq!(users.height(), 0);
    assert_eq!(users.width(), 6);
    assert!(dataset.config().user_path().exists());

    let again = dataset.load_user().unwrap();
    assert_eq!(again.width(), 6);
}
