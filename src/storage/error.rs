//! Persistence layer errors.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),
}
