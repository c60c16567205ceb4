//! Streams resolved URLs to their destination paths.

use std::path::{Path, PathBuf};

use dashmap::DashSet;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::MaterializeError;
use super::filename::{archive_form, final_path, partial_path};
use super::progress::ProgressObserver;
use crate::transport::{HttpSettings, build_download_client};

/// Result of a successful [`Materializer::materialize`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// The file was downloaded and now lives at `path`.
    Downloaded {
        /// Final path (archive-renamed for source archives).
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// Nothing was done; `path` already existed.
    AlreadyPresent {
        /// The existing file.
        path: PathBuf,
    },
    /// Another worker is writing the same destination right now.
    InProgressElsewhere {
        /// The contested final path.
        path: PathBuf,
    },
}

/// Downloads files with skip-if-exists semantics.
///
/// Bytes go to `<destination>.part` first and are renamed to the final name
/// (the archive name for source archives) only after the writer is flushed
/// and closed, so a destination path never holds a partial file. An
/// in-flight registry keyed by final path makes the check-then-write of one
/// path exclusive across concurrent callers.
#[derive(Debug)]
pub struct Materializer {
    client: Client,
    in_flight: DashSet<PathBuf>,
}

struct InFlightClaim<'a> {
    registry: &'a DashSet<PathBuf>,
    path: PathBuf,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.registry.remove(&self.path);
    }
}

impl Materializer {
    /// Creates a materializer with its own download client.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` builder error when the client cannot be built.
    pub fn new(settings: HttpSettings) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_download_client(settings)?))
    }

    /// Creates a materializer over an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            in_flight: DashSet::new(),
        }
    }

    /// Returns the existing file that satisfies `destination`, if any.
    ///
    /// Checks the destination itself and, for source archives, its
    /// archive-renamed form.
    pub async fn existing(&self, destination: &Path) -> Option<PathBuf> {
        let candidates = std::iter::once(destination.to_path_buf()).chain(archive_form(destination));
        for candidate in candidates {
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }

    /// Downloads `source_url` to `destination` unless it is already present.
    ///
    /// Responses without a content length are written in one shot; otherwise
    /// the body is streamed and each chunk is reported to `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] on invalid URL, network failure, non-2xx
    /// status, or filesystem failure. No file is left at the destination or
    /// at its `.part` path on error.
    #[instrument(skip(self, source_url, progress), fields(destination = %destination.display()))]
    pub async fn materialize(
        &self,
        destination: &Path,
        source_url: &str,
        progress: &dyn ProgressObserver,
    ) -> Result<MaterializeOutcome, MaterializeError> {
        if let Some(path) = self.existing(destination).await {
            debug!(path = %path.display(), "already present; skipping");
            return Ok(MaterializeOutcome::AlreadyPresent { path });
        }

        let target = final_path(destination);
        let Some(_claim) = self.claim(&target) else {
            debug!("destination is being written by another worker");
            return Ok(MaterializeOutcome::InProgressElsewhere { path: target });
        };
        // Re-check under the claim: a concurrent writer may have finished.
        if let Some(path) = self.existing(destination).await {
            return Ok(MaterializeOutcome::AlreadyPresent { path });
        }

        Url::parse(source_url).map_err(|_| MaterializeError::invalid_url(source_url))?;
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| MaterializeError::transport(source_url, e))?;
        if !response.status().is_success() {
            return Err(MaterializeError::http_status(
                source_url,
                response.status().as_u16(),
            ));
        }

        let partial = partial_path(destination);
        let label = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let written = write_partial(&partial, response, source_url, &label, progress).await;
        let bytes = match written {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %partial.display(), "removing partial file after error");
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(error);
            }
        };

        if let Err(error) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(MaterializeError::io(&target, error));
        }

        info!(path = %target.display(), bytes, "download complete");
        Ok(MaterializeOutcome::Downloaded {
            path: target,
            bytes,
        })
    }

    fn claim(&self, path: &Path) -> Option<InFlightClaim<'_>> {
        self.in_flight.insert(path.to_path_buf()).then(|| InFlightClaim {
            registry: &self.in_flight,
            path: path.to_path_buf(),
        })
    }
}

/// Writes the response body to `partial`, returning bytes written.
///
/// The writer is flushed and the file closed before returning.
async fn write_partial(
    partial: &Path,
    response: reqwest::Response,
    url: &str,
    label: &str,
    progress: &dyn ProgressObserver,
) -> Result<u64, MaterializeError> {
    let file = File::create(partial)
        .await
        .map_err(|e| MaterializeError::io(partial, e))?;
    let mut writer = BufWriter::new(file);

    let bytes_written = match response.content_length() {
        None => {
            let body = response
                .bytes()
                .await
                .map_err(|e| MaterializeError::transport(url, e))?;
            writer
                .write_all(&body)
                .await
                .map_err(|e| MaterializeError::io(partial, e))?;
            body.len() as u64
        }
        Some(total) => {
            let mut transfer = progress.begin(label, total);
            let mut stream = response.bytes_stream();
            let mut written: u64 = 0;
            let result = async {
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| MaterializeError::transport(url, e))?;
                    writer
                        .write_all(&chunk)
                        .await
                        .map_err(|e| MaterializeError::io(partial, e))?;
                    written += chunk.len() as u64;
                    transfer.advance(chunk.len() as u64);
                }
                Ok::<(), MaterializeError>(())
            }
            .await;
            transfer.finish();
            result?;
            written
        }
    };

    writer
        .flush()
        .await
        .map_err(|e| MaterializeError::io(partial, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| MaterializeError::io(partial, e))?;

    Ok(bytes_written)
}
