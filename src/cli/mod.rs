//! mangascore CLI Module
//!
//! Command-line interface for cleaning, feature expansion and the
//! feature importance run.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::dataset::MangaDataset;
use crate::pipeline::run_random_forest_feature_importance;
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "mangascore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Which genres, themes, magazines and demographics drive manga scores")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding the raw and derived CSV files
    #[arg(long, global = true, env = "MANGASCORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON pipeline configuration
    #[arg(long, global = true, env = "MANGASCORE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean, expand, train and report feature importances (default)
    Run(RunArgs),

    /// Build the cleaned and ML-cleaned CSV files
    Clean {
        /// Rewrite both files from the raw file and clear the feature cache
        #[arg(long)]
        force: bool,
    },

    /// Build the feature-expanded CSV file
    Featurize,

    /// Create the user table if it does not exist
    UserInit,

    /// Inspect a CSV file
    Info {
        /// CSV file to inspect
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Per-run overrides of the pipeline configuration
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Seed for the split and the forest
    #[arg(long)]
    pub seed: Option<u64>,

    /// Held-out fraction, in (0, 1)
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Number of trees
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Worker threads for tree construction
    #[arg(long)]
    pub n_jobs: Option<usize>,

    /// Number of ranked features to print
    #[arg(long)]
    pub top_n: Option<usize>,
}

impl RunArgs {
    /// Apply the overrides that were given on the command line
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(seed) = self.seed {
            config = config.with_random_state(seed);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }
        if let Some(n) = self.n_estimators {
            config = config.with_n_estimators(n);
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if let Some(n) = self.n_jobs {
            config = config.with_n_jobs(n);
        }
        if let Some(n) = self.top_n {
            config = config.with_top_n(n);
        }
        config
    }
}

/// Build the pipeline configuration from `--config` and `--data-dir`.
/// `--data-dir` wins over the directory stored in the config file.
pub fn resolve_config(config_path: Option<&Path>, data_dir: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Feature Importance");

    kv("Data", &config.data_dir.display().to_string());
    kv("Trees", &config.n_estimators.to_string());
    kv("Seed", &config.random_state.to_string());
    println!();

    step_run("Training random forest");
    let start = Instant::now();
    let outcome = run_random_forest_feature_importance(config)?;
    step_done(&format!("{:?}", start.elapsed()));

    let training = &outcome.training;
    println!();
    kv("Train rows", &training.n_train.to_string());
    kv("Test rows", &training.n_test.to_string());
    kv("Features", &training.n_features.to_string());
    println!("  {:<16} {}", muted("RMSE"), format!("{:.4}", training.metrics.rmse).white().bold());
    println!("  {:<16} {}", muted("R²"), format!("{:.4}", training.metrics.r2).white().bold());

    section(&format!("Top {} features", config.top_n));
    for line in outcome.importances.format_top(config.top_n) {
        println!("  {}", line);
    }

    println!();
    println!("  {} {}", muted("Saved"), outcome.importance_path.display());
    println!();
    Ok(())
}

pub fn cmd_clean(config: &PipelineConfig, force: bool) -> anyhow::Result<()> {
    section("Clean");
    let dataset = MangaDataset::new(config.clone());

    step_run("Cleaning raw dataset");
    let (cleaned, ml) = if force {
        dataset.rebuild()?
    } else {
        (dataset.load_data()?, dataset.load_ml_data()?)
    };
    step_done(&format!("{} rows × {} cols", cleaned.height(), cleaned.width()));
    kv("ML columns", &format!("{} rows × {} cols", ml.height(), ml.width()));
    if force {
        kv("Feature cache", "cleared");
    }

    println!();
    Ok(())
}

pub fn cmd_featurize(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Featurize");

    step_run("Expanding categorical lists");
    let start = Instant::now();
    let features = MangaDataset::new(config.clone()).load_ml_featureset()?;
    step_done(&format!("{} rows × {} cols in {:?}", features.height(), features.width(), start.elapsed()));

    println!("  {} {}", muted("Saved"), config.features_path().display());
    println!();
    Ok(())
}

pub fn cmd_user_init(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Users");

    let users = MangaDataset::new(config.clone()).load_user()?;
    kv("File", &config.user_path().display().to_string());
    kv("Rows", &users.height().to_string());
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load_csv(data_path)?;

    kv("File", &data_path.display().to_string());
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    println!("  {:<16} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<28} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(58)));

    for col in df.get_columns() {
        println!(
            "  {:<28} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["mangascore"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_info_parses_without_config() {
        let cli = Cli::try_parse_from(["mangascore", "info", "-d", "manga_entries.csv"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Info { data }) if data == PathBuf::from("manga_entries.csv")));
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "mangascore",
            "--data-dir",
            "/tmp/manga",
            "run",
            "--seed",
            "7",
            "--n-estimators",
            "10",
            "--top-n",
            "5",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let config = args.apply(resolve_config(None, cli.data_dir.as_deref()).unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/manga"));
        assert_eq!(config.random_state, 7);
        assert_eq!(config.n_estimators, 10);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_config_file_then_data_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mangascore.json");
        PipelineConfig::default().with_n_estimators(25).save_json(&path).unwrap();

        let config = resolve_config(Some(path.as_path()), Some(dir.path())).unwrap();
        assert_eq!(config.n_estimators, 25);
        assert_eq!(config.data_dir, dir.path());
    }
}
