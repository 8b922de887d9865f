use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a tree under a strict configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("duplicate file path '{path}' (records {first} and {second})")]
    DuplicatePath {
        path: String,
        first: u32,
        second: u32,
    },

    #[error("path '{path}' is used both as a file and as a folder")]
    PathConflict { path: String },
}

/// Errors raised while reading a record listing.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file listing: {0}")]
    Json(#[from] serde_json::Error),
}
