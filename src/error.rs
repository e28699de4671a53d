//! Error types for the form boundary and seed loading.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a form submission is refused. The form stays open and the store
/// is not touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Deadline is required")]
    MissingDeadline,

    #[error("Could not understand deadline '{0}' (try YYYY-MM-DD, 'tomorrow' or 'in 3d')")]
    InvalidDeadline(String),
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("seed contains task id {0} more than once")]
    DuplicateId(u64),
}
