//! Errors raised by tracking clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracking service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("run file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run {0} is already finished")]
    RunFinished(String),

    #[error("project name {0:?} cannot be used as a run directory")]
    InvalidProject(String),

    #[error("row has {got} cells but the table has {expected} columns")]
    RowWidth { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, TrackingError>;
