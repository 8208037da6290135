//! Error types for gapfill

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Structurally invalid input: empty header, mismatched cell counts,
    /// too few rows, rows off the sampling grid.
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Cannot detect a positive step size between timestamps")]
    StepDetection,

    #[error("Line {line}: cannot parse timestamp '{value}'")]
    Timestamp { line: usize, value: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Background run failed: {0}")]
    Worker(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
