//! Progress reporting seam for streaming transfers.

/// Creates a progress handle per transfer.
pub trait ProgressObserver: Send + Sync {
    /// Called once a transfer with a known length starts.
    fn begin(&self, label: &str, total_bytes: u64) -> Box<dyn TransferProgress>;
}

/// Receives per-chunk progress for one transfer.
pub trait TransferProgress: Send {
    /// Bytes written since the previous call.
    fn advance(&mut self, bytes: u64);

    /// The transfer ended (successfully or not).
    fn finish(&mut self);
}

/// Observer that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn begin(&self, _label: &str, _total_bytes: u64) -> Box<dyn TransferProgress> {
        Box::new(Self)
    }
}

impl TransferProgress for SilentProgress {
    fn advance(&mut self, _bytes: u64) {}

    fn finish(&mut self) {}
}
