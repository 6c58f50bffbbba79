//! Error types for sidecar annotation file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or removing a sidecar file.
///
/// Reading never fails: an unreadable sidecar is treated as "no boxes".
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sidecar path has no parent directory to stage the temporary file in
    #[error("Invalid sidecar path: {path:?}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
    },
}

impl FormatError {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}
