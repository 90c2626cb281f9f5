//! Data preprocessing module
//!
//! Turns list-encoded categorical columns into model-ready features:
//! - Cell parsing (list literals and comma-separated strings)
//! - Vocabulary extraction per column
//! - One-hot expansion into `{prefix}_{item}` indicator columns

pub mod list_parser;
pub mod vocabulary;
mod expander;

pub use list_parser::parse_list;
pub use vocabulary::{extract_vocabulary, parse_column, Vocabulary};
pub use expander::{expand_features, feature_name, ExpansionSpec, FeatureExpander};
