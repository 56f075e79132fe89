use std::path::Path;

use crate::config::Mode;
use crate::error::Error;
use crate::stats::CompressionStats;

use super::FileTask;

/// Receives per-file progress from a directory batch.
///
/// Implementors must be thread-safe (Send + Sync).
pub trait BatchObserver: Send + Sync {
    /// A file finished successfully.
    fn file_completed(&self, mode: Mode, task: &FileTask, stats: &CompressionStats);

    /// A file was skipped because of `error`; the batch carries on.
    fn file_failed(&self, mode: Mode, input: &Path, error: &Error);
}

/// Observer for callers that only want the returned summary.
pub struct NoOpObserver;

impl BatchObserver for NoOpObserver {
    fn file_completed(&self, _mode: Mode, _task: &FileTask, _stats: &CompressionStats) {}
    fn file_failed(&self, _mode: Mode, _input: &Path, _error: &Error) {}
}
