//! Error types for ntk-mc

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ntk-mc
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog is not valid JSON or has the wrong shape
    #[error("Invalid map catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog file could not be read
    #[error("Failed to read map catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type using ntk-mc Error
pub type Result<T> = std::result::Result<T, Error>;
