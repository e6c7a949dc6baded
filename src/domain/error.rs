use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file '{0}': please select a valid CSV file")]
    UnsupportedFile(String),

    #[error("CSV parsing errors: {}", .issues.join(", "))]
    Parse { issues: Vec<String> },

    /// Message reported by the product backend, kept verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
