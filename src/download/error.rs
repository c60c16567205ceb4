//! Error types for the download module.
//!
//! Every variant is recoverable per file: the destination is left absent so a
//! later run retries it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while materializing a file.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error (create, write, rename, relocate).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The resolved URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl MaterializeError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let msg = MaterializeError::http_status("https://cdn/file.pdf", 403).to_string();
        assert!(msg.contains("403"), "{msg}");
        assert!(msg.contains("https://cdn/file.pdf"), "{msg}");
    }

    #[test]
    fn test_io_display_includes_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let msg = MaterializeError::io("/tmp/book.pdf", io_error).to_string();
        assert!(msg.contains("/tmp/book.pdf"), "{msg}");
    }

    #[test]
    fn test_invalid_url_display() {
        let msg = MaterializeError::invalid_url("not-a-url").to_string();
        assert!(msg.contains("invalid URL") && msg.contains("not-a-url"), "{msg}");
    }
}
