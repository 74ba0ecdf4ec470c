//! Shared building blocks for the sector news pipeline.
//!
//! Holds the keyword catalog, the persisted article shape, environment-driven
//! configuration, and the text logic used for near-duplicate detection
//! (normalization and TF-IDF cosine similarity).

pub mod app_config;
pub mod article;
pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod similarity;

pub use app_config::{AppConfig, Environment};
pub use article::{ArticleRecord, DateKey};
pub use catalog::{load_catalog, KeywordCatalog};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use normalize::{clean_text, extract_anchor_text};
pub use similarity::{is_duplicate, max_similarity, DEFAULT_SIMILARITY_THRESHOLD};
