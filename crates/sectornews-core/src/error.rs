use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog JSON: {0}")]
    CatalogJson(#[from] serde_json::Error),

    #[error("failed to parse catalog YAML: {0}")]
    CatalogYaml(#[from] serde_yaml::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date key \"{0}\": expected YYYYMMDD")]
    InvalidDateKey(String),
}
