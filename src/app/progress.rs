//! Byte progress bars for downloads.

use std::sync::Arc;

use exporter_core::download::{ProgressObserver, SilentProgress, TransferProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// One bar per in-flight transfer, stacked in a [`MultiProgress`].
pub(crate) struct BarProgress {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            multi: MultiProgress::new(),
            style,
        }
    }
}

impl ProgressObserver for BarProgress {
    fn begin(&self, label: &str, total_bytes: u64) -> Box<dyn TransferProgress> {
        let bar = self.multi.add(ProgressBar::new(total_bytes));
        bar.set_style(self.style.clone());
        bar.set_message(label.to_string());
        Box::new(BarTransfer { bar })
    }
}

struct BarTransfer {
    bar: ProgressBar,
}

impl TransferProgress for BarTransfer {
    fn advance(&mut self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Bars when `enabled`, otherwise a silent observer.
pub(crate) fn progress_observer(enabled: bool) -> Arc<dyn ProgressObserver> {
    if enabled {
        Arc::new(BarProgress::new())
    } else {
        Arc::new(SilentProgress)
    }
}
