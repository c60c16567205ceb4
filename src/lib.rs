//! Library Exporter Core Library
//!
//! Exports the items an account owns on a content-distribution service to a
//! local directory tree: log in, list the catalog (or take explicit ids),
//! resolve each requested file format to a direct URL, and stream the files
//! to disk, optionally writing a Markdown summary per item.
//!
//! # Architecture
//!
//! Leaf-first:
//! - [`auth`] - Credential exchange and the single-flight token holder
//! - [`transport`] - HTTP sender seam and the retry-once-on-401 decorator
//! - [`catalog`] - Paged, de-duplicated catalog listing
//! - [`resolver`] - Format discovery and download URL resolution
//! - [`download`] - Skip-if-exists streaming materializer
//! - [`summary`] - Metadata lookups and summary documents
//! - [`pipeline`] - Run orchestration and statistics

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod catalog;
pub mod download;
pub mod endpoints;
pub mod pipeline;
pub mod resolver;
pub mod summary;
pub mod transport;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, Authenticator, Credentials, Token, TokenSource};
pub use catalog::{CatalogItem, CatalogLister, ListRequest, PROVIDER_PAGE_SIZE};
pub use download::{MaterializeError, MaterializeOutcome, Materializer, ProgressObserver};
pub use endpoints::ApiEndpoints;
pub use pipeline::{
    ExportError, ExportMode, ExportRequest, ExportStats, Exporter, MAX_CONCURRENCY,
    SummaryOptions,
};
pub use resolver::{FileFormat, ItemResolver};
pub use summary::{MetadataClient, SummaryLookups};
pub use transport::{ApiResponse, AuthenticatedTransport, HttpError, HttpSettings, RequestSender};
