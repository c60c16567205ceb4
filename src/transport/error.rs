//! Error types for API requests.

use thiserror::Error;

use crate::auth::AuthError;

/// Longest response body excerpt kept in a status error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur while talking to the API.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx response surfaced by a caller that needed success.
    #[error("HTTP {status} requesting {url}: {body}")]
    Status {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Leading excerpt of the response body.
        body: String,
    },

    /// The token was rejected again after re-authentication.
    #[error("HTTP 401 requesting {url} after re-authentication")]
    Unauthorized {
        /// The URL that rejected the refreshed token.
        url: String,
    },

    /// Re-authentication itself failed. Fatal for the run.
    #[error("re-authentication failed: {0}")]
    Reauthentication(#[from] AuthError),

    /// Response body was not valid JSON for the expected type.
    #[error("unreadable response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Response decoded but lacked a required field.
    #[error("unexpected response from {url}: {detail}")]
    UnexpectedShape {
        /// The URL whose body had the wrong shape.
        url: String,
        /// What was missing.
        detail: String,
    },
}

impl HttpError {
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

    /// Creates a status error, keeping only a short body excerpt.
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let body: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        Self::Status {
            url: url.into(),
            status,
            body,
        }
    }

    /// Creates the error for a replay that was rejected again.
    pub fn unauthorized(url: impl Into<String>) -> Self {
        Self::Unauthorized { url: url.into() }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an unexpected-shape error.
    pub fn unexpected_shape(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error must stop the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Reauthentication(_))
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(1000);
        let err = HttpError::status("https://api/x", 500, &body);
        match &err {
            HttpError::Status { body, .. } => assert_eq!(body.len(), BODY_EXCERPT_CHARS),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_only_reauthentication_is_fatal() {
        assert!(HttpError::Reauthentication(AuthError::rejected(401, "bad")).is_fatal());
        assert!(!HttpError::unauthorized("https://api/x").is_fatal());
        assert!(!HttpError::status("https://api/x", 404, "").is_fatal());
        assert!(!HttpError::unexpected_shape("https://api/x", "no data").is_fatal());
    }

    #[test]
    fn test_unauthorized_reports_401() {
        let err = HttpError::unauthorized("https://api/x");
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("after re-authentication"));
    }
}
