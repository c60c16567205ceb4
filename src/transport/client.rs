//! `reqwest`-backed HTTP client construction and the production sender.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, instrument};

use super::{ApiResponse, HttpError, RequestSender};
use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Timeout settings shared by the API and download clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request deadline for API calls; idle time allowed between
    /// reads for downloads.
    pub read_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Builds a client for API calls (auth, listing, lookups).
///
/// # Errors
///
/// Returns the builder error when TLS or proxy initialization fails.
pub fn build_http_client(settings: HttpSettings) -> Result<Client, reqwest::Error> {
    base_client_builder(settings, user_agent::default_api_user_agent())
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .build()
}

/// Builds the file download client.
///
/// Transfers have no overall deadline; only a stalled read (no bytes for
/// `read_timeout_secs`) ends them.
pub(crate) fn build_download_client(settings: HttpSettings) -> Result<Client, reqwest::Error> {
    base_client_builder(settings, user_agent::default_download_user_agent())
        .read_timeout(Duration::from_secs(settings.read_timeout_secs))
        .build()
}

fn base_client_builder(settings: HttpSettings, user_agent: String) -> reqwest::ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .gzip(true)
        .user_agent(user_agent)
}

/// Production [`RequestSender`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    /// Wraps an existing client (connection pool is shared).
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestSender for ReqwestSender {
    #[instrument(level = "debug", skip(self, authorization), fields(url = %url))]
    async fn get(
        &self,
        url: &str,
        authorization: Option<&str>,
    ) -> Result<ApiResponse, HttpError> {
        let mut request = self.client.get(url);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::transport(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::transport(url, e))?;
        debug!(status, bytes = body.len(), "response received");

        Ok(ApiResponse::new(url, status, body))
    }
}
