//! Error types for the curation session.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::FormatError;

/// Errors surfaced to the operator by session transitions.
///
/// Every variant leaves the pending sequence consistent with where images
/// currently live on disk.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The image could not be decoded; the session skips it
    #[error("Cannot decode image {path:?}: {message}")]
    ImageDecodeFailed {
        /// Image that failed to decode
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// Moving the image failed; nothing changed
    #[error("Cannot move image {from:?} to {to:?}: {source}")]
    ImageMoveFailed {
        /// Current image location
        from: PathBuf,
        /// Intended destination
        to: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Moving the sidecar failed after the image moved
    #[error("Cannot move sidecar {from:?} to {to:?}: {source}")]
    SidecarMoveFailed {
        /// Current sidecar location
        from: PathBuf,
        /// Intended destination
        to: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A label prompt was cancelled or answered with a blank label
    #[error("Empty label; the pending edit was discarded")]
    EmptyLabelInput,

    /// The working folder cannot be listed or its buckets cannot be created
    #[error("Cannot open folder {path:?}: {source}")]
    FolderUnreadable {
        /// Folder that was opened
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The action needs an open working folder
    #[error("No folder is open")]
    NoFolderOpen,

    /// An action arrived that the current state does not accept
    #[error("'{action}' is not available while {state}")]
    InvalidTransition {
        /// Action name
        action: &'static str,
        /// State name
        state: &'static str,
    },

    /// Writing the sidecar failed
    #[error("Annotation save failed: {0}")]
    Format(#[from] FormatError),
}

impl SessionError {
    /// Create an invalid transition error.
    pub fn invalid_transition(action: &'static str, state: &'static str) -> Self {
        Self::InvalidTransition { action, state }
    }
}
