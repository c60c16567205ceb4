//! Run-level errors. Every variant ends the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::auth::AuthError;
use crate::transport::HttpError;

/// Fatal conditions for an export run.
///
/// Per-item failures are logged and counted in
/// [`ExportStats`](super::ExportStats); they never surface here.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Contradictory or out-of-range options.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The output root could not be created.
    #[error("cannot create output directory {path}: {source}")]
    Directory {
        /// Directory that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP clients could not be built.
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Initial login failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A transport failure that stops the run (listing failure or failed
    /// re-authentication).
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ExportError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a directory error.
    pub fn directory(path: &Path, source: std::io::Error) -> Self {
        Self::Directory {
            path: path.to_path_buf(),
            source,
        }
    }
}
