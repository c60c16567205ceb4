//! Per-item format discovery and download URL resolution.
//!
//! Both lookups go through the [`AuthenticatedTransport`]; nothing is cached
//! between items.

mod format;

pub use format::{FileFormat, UnknownFormat};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::endpoints::ApiEndpoints;
use crate::transport::{AuthenticatedTransport, HttpError};

/// Resolves formats and direct URLs for catalog items.
#[derive(Debug, Clone)]
pub struct ItemResolver {
    transport: AuthenticatedTransport,
    endpoints: Arc<ApiEndpoints>,
}

impl ItemResolver {
    /// Creates a resolver over the authenticated transport.
    #[must_use]
    pub fn new(transport: AuthenticatedTransport, endpoints: Arc<ApiEndpoints>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Returns the formats the provider offers for `item_id`.
    ///
    /// A body that is not JSON or has no `data[0].fileTypes` yields an
    /// empty set; identifiers this exporter does not know are ignored.
    ///
    /// # Errors
    ///
    /// Propagates [`HttpError`] from the transport, including non-2xx statuses.
    #[instrument(skip(self))]
    pub async fn available_formats(&self, item_id: &str) -> Result<BTreeSet<FileFormat>, HttpError> {
        let url = self.endpoints.types_url(item_id);
        let response = self.transport.get(&url).await?.error_for_status()?;
        let body: Value = match response.json() {
            Ok(body) => body,
            Err(error) => {
                warn!(error = %error, "types response is not JSON; treating as no formats");
                return Ok(BTreeSet::new());
            }
        };

        let Some(types) = body
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|first| first.get("fileTypes"))
            .and_then(Value::as_array)
        else {
            warn!("types response has no data[0].fileTypes; treating as no formats");
            return Ok(BTreeSet::new());
        };

        let formats = types
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|raw| match raw.parse::<FileFormat>() {
                Ok(format) => Some(format),
                Err(_) => {
                    debug!(file_type = raw, "ignoring unsupported file type");
                    None
                }
            })
            .collect();
        Ok(formats)
    }

    /// Returns the direct download URL for one item and format.
    ///
    /// # Errors
    ///
    /// Propagates [`HttpError`] from the transport; returns
    /// [`HttpError::UnexpectedShape`] when `data` is not a non-empty string.
    #[instrument(skip(self), fields(format = %format))]
    pub async fn resolve_url(&self, item_id: &str, format: FileFormat) -> Result<String, HttpError> {
        let url = self.endpoints.file_url(item_id, format);
        let body: Value = self.transport.get_json(&url).await?;
        body.get("data")
            .and_then(Value::as_str)
            .filter(|direct| !direct.is_empty())
            .map(str::to_string)
            .ok_or_else(|| HttpError::unexpected_shape(&url, "missing download URL in `data`"))
    }
}

/// Formats both requested and available, in the caller's requested order.
#[must_use]
pub fn select_formats(requested: &[FileFormat], available: &BTreeSet<FileFormat>) -> Vec<FileFormat> {
    let mut selected = Vec::new();
    for format in requested {
        if available.contains(format) && !selected.contains(format) {
            selected.push(*format);
        }
    }
    selected
}
