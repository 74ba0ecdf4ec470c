use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for a pipeline invocation, resolved from `SECTORNEWS_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    /// Directory holding one `YYYYMMDD.csv` file per publication day.
    pub bucket_dir: PathBuf,
    /// Directory receiving `keyword.csv` and `sector.csv`.
    pub summary_dir: PathBuf,
    pub feed_base_url: String,
    pub feed_language: String,
    pub feed_region: String,
    pub lookback_days: u32,
    pub max_concurrent_fetches: usize,
    pub similarity_threshold: f64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}
