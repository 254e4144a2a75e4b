use std::{io, path::PathBuf};

use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, TimelineError>;

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("experience '{id}' ends ({end}) before it starts ({start})")]
    InvalidRange {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("duplicate experience id '{0}'")]
    DuplicateId(String),

    /// Groups are only built from existing membership, so this is an internal fault.
    #[error("group '{0}' has no members")]
    EmptyGroup(String),

    #[error("invalid --now value '{0}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidNow(String),

    #[error("unsupported shell: {0}. Use bash, zsh, or fish.")]
    UnsupportedShell(String),

    #[error("marker ticker error: {0}")]
    Ticker(String),
}

impl TimelineError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TimelineError::Io {
            path: path.into(),
            source,
        }
    }
}
