//! API request plumbing.
//!
//! - [`RequestSender`] - one GET, optionally carrying an `Authorization` value
//! - [`ReqwestSender`] - production sender over a shared `reqwest::Client`
//! - [`AuthenticatedTransport`] - decorator that attaches the current token and
//!   replays once after re-authentication on 401
//! - [`ApiResponse`] - fully read response (status + body)

mod authenticated;
mod client;
mod error;

pub use authenticated::AuthenticatedTransport;
pub use client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpSettings, ReqwestSender,
    build_http_client,
};
pub(crate) use client::build_download_client;
pub use error::HttpError;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// A fully read API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// The requested URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response value.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server rejected the token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Converts a non-2xx response into [`HttpError::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::status(&self.url, self.status, &self.body))
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::decode(&self.url, e))
    }
}

/// Sends one GET request and reads the whole body.
///
/// Non-2xx statuses are returned as responses, not errors; only transport
/// failures are errors.
#[async_trait]
pub trait RequestSender: Send + Sync {
    /// Issues a GET to `url`, attaching `authorization` when present.
    async fn get(&self, url: &str, authorization: Option<&str>)
    -> Result<ApiResponse, HttpError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status_passes_success() {
        let response = ApiResponse::new("https://api/x", 204, "");
        assert!(response.error_for_status().is_ok());
    }

    #[test]
    fn test_error_for_status_maps_failure() {
        let err = ApiResponse::new("https://api/x", 503, "maintenance")
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("maintenance"));
    }

    #[test]
    fn test_json_decode_error_names_url() {
        let err = ApiResponse::new("https://api/x", 200, "not json")
            .json::<serde_json::Value>()
            .unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
        assert!(err.to_string().contains("https://api/x"));
    }
}
