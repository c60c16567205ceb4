use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one export run.
///
/// Updated concurrently by item workers.
#[derive(Debug, Default)]
pub struct ExportStats {
    items: AtomicUsize,
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    summaries: AtomicUsize,
}

impl ExportStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items processed.
    #[must_use]
    pub fn items(&self) -> usize {
        self.items.load(Ordering::SeqCst)
    }

    /// Files downloaded in this run.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Files skipped because they were already present.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Item or format steps that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Summary documents written.
    #[must_use]
    pub fn summaries(&self) -> usize {
        self.summaries.load(Ordering::SeqCst)
    }

    /// True when at least one step failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub(super) fn record_item(&self) {
        self.items.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn record_downloaded(&self) {
        self.downloaded.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn record_summary(&self) {
        self.summaries.fetch_add(1, Ordering::SeqCst);
    }
}
