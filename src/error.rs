use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere in the lookup pipeline.
///
/// Errors from a page lookup are retried by the fetcher and never leave it.
/// Everything else (input, output, failure log, configuration) aborts the run.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup returned HTTP {0}")]
    Status(u16),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV output: {0}")]
    Csv(#[from] csv::Error),
}

impl LookupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LookupError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
