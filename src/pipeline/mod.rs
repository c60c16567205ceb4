//! Export orchestration.
//!
//! One run walks `authenticate -> list or take ids -> per item: formats ->
//! materialize each selected format -> optional summary`. Items are processed
//! by a bounded worker pool; a failure inside one item is logged and counted,
//! the run continues. Only the conditions in [`ExportError`] end a run.

mod error;
mod stats;

pub use error::ExportError;
pub use stats::ExportStats;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, instrument, warn};

use crate::auth::{Authenticator, Credentials};
use crate::catalog::{CatalogItem, CatalogLister, ListRequest};
use crate::download::{
    MaterializeOutcome, Materializer, ProgressObserver, SilentProgress, destination_path,
    item_base_name, relocate_into_item_dir,
};
use crate::endpoints::ApiEndpoints;
use crate::resolver::{FileFormat, ItemResolver, select_formats};
use crate::summary::{
    MetadataClient, ProductSummary, SummaryLookups, summary_path, write_summary,
};
use crate::transport::{
    AuthenticatedTransport, HttpError, HttpSettings, RequestSender, ReqwestSender,
    build_http_client,
};

/// Largest accepted worker count.
pub const MAX_CONCURRENCY: usize = 8;

/// Where the items of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// Page through the owned catalog.
    Catalog(ListRequest),
    /// Export exactly these item ids, skipping the listing.
    Ids(Vec<String>),
}

/// Summary generation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryOptions {
    /// Write a summary per item.
    pub enabled: bool,
    /// Write it as `README.md` in the item directory.
    pub separate: bool,
    /// Auxiliary sections to look up.
    pub lookups: SummaryLookups,
}

/// Parameters of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Output root.
    pub output_dir: PathBuf,
    /// Requested formats, in preference order.
    pub formats: Vec<FileFormat>,
    /// Item source.
    pub mode: ExportMode,
    /// One subdirectory per item.
    pub separate: bool,
    /// Summary generation.
    pub summary: SummaryOptions,
    /// Items processed at once (1 = sequential).
    pub concurrency: usize,
}

impl ExportRequest {
    /// Rejects contradictory options.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] for separated summaries without
    /// separated directories, a concurrency outside `1..=MAX_CONCURRENCY`,
    /// or a run that would neither download nor summarize anything.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.summary.separate && !self.separate {
            return Err(ExportError::config(
                "separated summaries require separated directories (--separate)",
            ));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ExportError::config(format!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        if self.formats.is_empty() && !self.summary.enabled {
            return Err(ExportError::config(
                "no file types requested and summaries disabled",
            ));
        }
        Ok(())
    }
}

/// Drives an export run.
pub struct Exporter {
    authenticator: Arc<Authenticator>,
    lister: CatalogLister,
    resolver: ItemResolver,
    metadata: MetadataClient,
    materializer: Materializer,
    progress: Arc<dyn ProgressObserver>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    /// Wires every component against `endpoints`.
    ///
    /// The API client is shared by the authenticator, the authenticated
    /// transport, and metadata lookups; downloads use their own client.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Client`] when a client cannot be built.
    pub fn new(
        endpoints: ApiEndpoints,
        credentials: Credentials,
        settings: HttpSettings,
    ) -> Result<Self, ExportError> {
        let client = build_http_client(settings).map_err(ExportError::Client)?;
        let materializer = Materializer::new(settings).map_err(ExportError::Client)?;
        let endpoints = Arc::new(endpoints);

        let authenticator = Arc::new(Authenticator::new(
            client.clone(),
            &endpoints,
            credentials,
        ));
        let sender: Arc<dyn RequestSender> = Arc::new(ReqwestSender::new(client));
        let transport = AuthenticatedTransport::new(Arc::clone(&sender), authenticator.clone());

        Ok(Self {
            lister: CatalogLister::new(transport.clone(), Arc::clone(&endpoints)),
            resolver: ItemResolver::new(transport.clone(), Arc::clone(&endpoints)),
            metadata: MetadataClient::new(sender, transport, endpoints),
            authenticator,
            materializer,
            progress: Arc::new(SilentProgress),
        })
    }

    /// Reports transfer progress to `progress` instead of discarding it.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs one export.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] for the fatal conditions only: invalid
    /// request, failed login, output root not creatable, listing failure,
    /// or failed re-authentication. In the last case items already in
    /// flight finish first.
    #[instrument(skip_all, fields(output_dir = %request.output_dir.display()))]
    pub async fn run(&self, request: &ExportRequest) -> Result<ExportStats, ExportError> {
        request.validate()?;
        self.authenticator.authenticate().await?;

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| ExportError::directory(&request.output_dir, e))?;

        let work = match &request.mode {
            ExportMode::Catalog(list) => self
                .lister
                .list(list)
                .await?
                .into_iter()
                .map(WorkItem::Listed)
                .collect::<Vec<_>>(),
            ExportMode::Ids(ids) => unique_ids(ids).into_iter().map(WorkItem::Id).collect(),
        };
        info!(items = work.len(), "starting export");

        let stats = ExportStats::new();
        let aborted = AtomicBool::new(false);
        let stats_ref = &stats;
        let aborted_ref = &aborted;

        let results: Vec<Result<(), HttpError>> = stream::iter(work)
            .map(|work| async move {
                if aborted_ref.load(Ordering::SeqCst) {
                    return Ok(());
                }
                let result = self.export_item(work, request, stats_ref).await;
                if result.is_err() {
                    aborted_ref.store(true, Ordering::SeqCst);
                }
                result
            })
            .buffer_unordered(request.concurrency)
            .collect()
            .await;

        if let Some(fatal) = results.into_iter().find_map(Result::err) {
            warn!(error = %fatal, "run stopped");
            return Err(fatal.into());
        }

        info!(
            items = stats.items(),
            downloaded = stats.downloaded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            summaries = stats.summaries(),
            "export finished"
        );
        Ok(stats)
    }

    /// Processes one item. Only fatal errors are returned.
    async fn export_item(
        &self,
        work: WorkItem,
        request: &ExportRequest,
        stats: &ExportStats,
    ) -> Result<(), HttpError> {
        let (item, prefetched) = self.identify(work).await;
        stats.record_item();
        let base_name = item_base_name(&item.display_name, &item.item_id);
        info!(item_id = %item.item_id, title = %item.display_name, "exporting item");

        let item_dir = if request.separate {
            match relocate_into_item_dir(&request.output_dir, &base_name).await {
                Ok(dir) => dir,
                Err(error) => {
                    warn!(item_id = %item.item_id, error = %error, "cannot prepare item directory");
                    stats.record_failed();
                    return Ok(());
                }
            }
        } else {
            request.output_dir.clone()
        };

        self.export_formats(&item, &item_dir, &base_name, request, stats)
            .await?;

        if request.summary.enabled {
            self.export_summary(&item, &item_dir, &base_name, prefetched, request, stats)
                .await?;
        }
        Ok(())
    }

    /// Resolves the display name of an id-mode item from its summary record.
    async fn identify(&self, work: WorkItem) -> (CatalogItem, Option<ProductSummary>) {
        match work {
            WorkItem::Listed(item) => (item, None),
            WorkItem::Id(item_id) => match self.metadata.summary(&item_id).await {
                Ok(summary) => {
                    let title = summary
                        .title
                        .clone()
                        .filter(|title| !title.trim().is_empty())
                        .unwrap_or_else(|| item_id.clone());
                    (CatalogItem::new(item_id, title), Some(summary))
                }
                Err(error) => {
                    warn!(item_id = %item_id, error = %error, "title lookup failed; naming by id");
                    (CatalogItem::new(item_id.clone(), item_id), None)
                }
            },
        }
    }

    async fn export_formats(
        &self,
        item: &CatalogItem,
        item_dir: &Path,
        base_name: &str,
        request: &ExportRequest,
        stats: &ExportStats,
    ) -> Result<(), HttpError> {
        if request.formats.is_empty() {
            return Ok(());
        }

        let available = match self.resolver.available_formats(&item.item_id).await {
            Ok(available) => available,
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                warn!(item_id = %item.item_id, error = %error, "format lookup failed; skipping downloads");
                stats.record_failed();
                return Ok(());
            }
        };

        for format in &request.formats {
            if !available.contains(format) {
                debug!(item_id = %item.item_id, format = %format, "format not offered for item");
            }
        }

        for format in select_formats(&request.formats, &available) {
            let destination = destination_path(item_dir, base_name, format);
            if let Some(existing) = self.materializer.existing(&destination).await {
                info!(item_id = %item.item_id, format = %format, path = %existing.display(), "already present, skipping");
                stats.record_skipped();
                continue;
            }

            let url = match self.resolver.resolve_url(&item.item_id, format).await {
                Ok(url) => url,
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!(item_id = %item.item_id, format = %format, error = %error, "cannot resolve download URL");
                    stats.record_failed();
                    continue;
                }
            };

            match self
                .materializer
                .materialize(&destination, &url, self.progress.as_ref())
                .await
            {
                Ok(MaterializeOutcome::Downloaded { .. }) => stats.record_downloaded(),
                Ok(MaterializeOutcome::AlreadyPresent { .. })
                | Ok(MaterializeOutcome::InProgressElsewhere { .. }) => stats.record_skipped(),
                Err(error) => {
                    warn!(item_id = %item.item_id, format = %format, error = %error, "download failed");
                    stats.record_failed();
                }
            }
        }
        Ok(())
    }

    async fn export_summary(
        &self,
        item: &CatalogItem,
        item_dir: &Path,
        base_name: &str,
        prefetched: Option<ProductSummary>,
        request: &ExportRequest,
        stats: &ExportStats,
    ) -> Result<(), HttpError> {
        let path = summary_path(item_dir, base_name, request.summary.separate);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "summary already exists, skipping");
            return Ok(());
        }

        let document = self
            .metadata
            .document(
                &item.item_id,
                &item.display_name,
                prefetched,
                request.summary.lookups,
            )
            .await?;
        match write_summary(&path, &document.render()).await {
            Ok(Some(_)) => stats.record_summary(),
            Ok(None) => {}
            Err(error) => {
                warn!(item_id = %item.item_id, error = %error, "cannot write summary");
                stats.record_failed();
            }
        }
        Ok(())
    }
}

enum WorkItem {
    Listed(CatalogItem),
    Id(String),
}

/// Ids in first-seen order without repeats or blanks.
fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !unique.iter().any(|seen| seen == id) {
            unique.push(id.to_string());
        }
    }
    unique
}
