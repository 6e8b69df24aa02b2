use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for corpus loading, output writing, and run configuration failures.
///
/// Extraction, serialization, and score aggregation are total and never
/// produce this error; only file access, JSON decoding, and run-level
/// preconditions do.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The input directory does not exist.
    #[error("input directory '{}' does not exist", path.display())]
    MissingInputDir {
        /// Configured input directory.
        path: PathBuf,
    },
    /// A record file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A record file is not valid JSON.
    #[error("failed to decode '{}': {source}", path.display())]
    Decode {
        /// File that failed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A record file holds JSON that is not a record object.
    #[error("'{}' is not a JSON object: {details}", path.display())]
    InvalidRecord {
        /// File that failed.
        path: PathBuf,
        /// What the payload was instead.
        details: String,
    },
    /// No case is left to export.
    #[error("no exportable analysis records found under '{}'", path.display())]
    EmptyCorpus {
        /// Configured input directory.
        path: PathBuf,
    },
    /// Output IO failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Output JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
