//! Per-item summary documents.
//!
//! A summary is built from the product summary record plus optional table of
//! contents, rating, and author lookups. Each lookup is independent: a
//! failure drops its section and is logged, the document is still written.
//! Only a fatal transport error (failed re-authentication) propagates.

mod model;
mod render;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::endpoints::ApiEndpoints;
use crate::transport::{AuthenticatedTransport, HttpError, RequestSender};

pub use model::{Author, Chapter, ProductSummary, Rating, Section, TableOfContents};
pub use render::SummaryDocument;

/// File name of a separated summary inside the item directory.
pub const SEPARATED_SUMMARY_NAME: &str = "README.md";

/// Errors writing a summary file.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// I/O failure on the summary path.
    #[error("I/O error writing summary {path}: {source}")]
    Io {
        /// The summary path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Which auxiliary lookups feed the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLookups {
    /// Table of contents.
    pub toc: bool,
    /// Aggregate rating.
    pub reviews: bool,
    /// Author biographies.
    pub authors: bool,
}

impl Default for SummaryLookups {
    fn default() -> Self {
        Self {
            toc: true,
            reviews: false,
            authors: false,
        }
    }
}

/// Fetches metadata records.
///
/// Summary, TOC, and author records come from the static host without
/// credentials; ratings go through the authenticated transport.
#[derive(Clone)]
pub struct MetadataClient {
    static_sender: Arc<dyn RequestSender>,
    transport: AuthenticatedTransport,
    endpoints: Arc<ApiEndpoints>,
}

impl std::fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl MetadataClient {
    /// Creates a client.
    #[must_use]
    pub fn new(
        static_sender: Arc<dyn RequestSender>,
        transport: AuthenticatedTransport,
        endpoints: Arc<ApiEndpoints>,
    ) -> Self {
        Self {
            static_sender,
            transport,
            endpoints,
        }
    }

    /// Product summary record.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-2xx, or bad JSON.
    pub async fn summary(&self, item_id: &str) -> Result<ProductSummary, HttpError> {
        self.static_json(&self.endpoints.summary_url(item_id)).await
    }

    /// Table of contents.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-2xx, or bad JSON.
    pub async fn toc(&self, item_id: &str) -> Result<TableOfContents, HttpError> {
        self.static_json(&self.endpoints.toc_url(item_id)).await
    }

    /// Author record.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-2xx, or bad JSON.
    pub async fn author(&self, author_id: &str) -> Result<Author, HttpError> {
        self.static_json(&self.endpoints.author_url(author_id)).await
    }

    /// Aggregate rating.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-2xx, or bad JSON;
    /// [`HttpError::Reauthentication`] is fatal.
    pub async fn rating(&self, item_id: &str) -> Result<Rating, HttpError> {
        self.transport
            .get_json(&self.endpoints.reviews_url(item_id))
            .await
    }

    /// Gathers every enabled section for one item.
    ///
    /// `prefetched` avoids a second summary request when the caller already
    /// looked the record up for naming.
    ///
    /// # Errors
    ///
    /// Only fatal errors propagate; see [`HttpError::is_fatal`].
    #[instrument(skip(self, display_name, prefetched))]
    pub async fn document(
        &self,
        item_id: &str,
        display_name: &str,
        prefetched: Option<ProductSummary>,
        lookups: SummaryLookups,
    ) -> Result<SummaryDocument, HttpError> {
        let summary = match prefetched {
            Some(summary) => Some(summary),
            None => degrade("summary", self.summary(item_id).await)?,
        };
        let toc = if lookups.toc {
            degrade("toc", self.toc(item_id).await)?
        } else {
            None
        };
        let rating = if lookups.reviews {
            degrade("reviews", self.rating(item_id).await)?
        } else {
            None
        };

        let mut authors = Vec::new();
        if lookups.authors
            && let Some(summary) = &summary
        {
            for author_id in summary.author_ids() {
                if let Some(author) = degrade("author", self.author(&author_id).await)? {
                    authors.push(author);
                }
            }
        }

        Ok(SummaryDocument {
            item_id: item_id.to_string(),
            display_name: display_name.to_string(),
            summary,
            toc,
            rating,
            authors,
            shop_link: self.endpoints.shop_link(item_id),
            reader_link: self.endpoints.reader_link(item_id),
        })
    }

    async fn static_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.static_sender
            .get(url, None)
            .await?
            .error_for_status()?
            .json()
    }
}

fn degrade<T>(section: &str, result: Result<T, HttpError>) -> Result<Option<T>, HttpError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_fatal() => Err(error),
        Err(error) => {
            warn!(section, error = %error, "metadata lookup failed; section omitted");
            Ok(None)
        }
    }
}

/// Where an item's summary lives.
///
/// Separated summaries are `<item_dir>/README.md`; otherwise
/// `<item_dir>/<base_name>.md`.
#[must_use]
pub fn summary_path(item_dir: &Path, base_name: &str, separate: bool) -> PathBuf {
    if separate {
        item_dir.join(SEPARATED_SUMMARY_NAME)
    } else {
        item_dir.join(format!("{base_name}.md"))
    }
}

/// Writes `contents` to `path` unless a file is already there.
///
/// Returns `Ok(None)` when the file existed. A failed write removes the
/// partially written file so a later run can retry.
///
/// # Errors
///
/// Returns [`SummaryError::Io`] on any other I/O failure.
pub async fn write_summary(path: &Path, contents: &str) -> Result<Option<PathBuf>, SummaryError> {
    let file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "summary already exists, skipping");
            return Ok(None);
        }
        Err(error) => {
            return Err(SummaryError::Io {
                path: path.to_path_buf(),
                source: error,
            });
        }
    };

    let mut file = file;
    let written = async {
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    if let Err(error) = written {
        let _ = tokio::fs::remove_file(path).await;
        return Err(SummaryError::Io {
            path: path.to_path_buf(),
            source: error,
        });
    }

    debug!(path = %path.display(), "summary written");
    Ok(Some(path.to_path_buf()))
}
