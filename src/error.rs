use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the reference catalog at startup
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to download catalog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("expected CSV but received HTML from {0}")]
    UnexpectedHtml(String),

    #[error("catalog {0} has no header row")]
    Empty(String),

    #[error("unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),

    #[error("malformed JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
}
