//! Per-file and per-batch statistics.

use std::path::PathBuf;
use std::time::Duration;

/// Result of one successful file operation.
///
/// For compression `original_size` is the source length and `processed_size`
/// the container length. For decompression `original_size` is the container
/// length on disk and `processed_size` the restored length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStats {
    pub original_size: u64,
    pub processed_size: u64,
    pub elapsed: Duration,
}

impl CompressionStats {
    pub fn new(original_size: u64, processed_size: u64, elapsed: Duration) -> Self {
        Self {
            original_size,
            processed_size,
            elapsed,
        }
    }

    /// `processed / original * 100`, or `None` for an empty source.
    pub fn ratio(&self) -> Option<f64> {
        if self.original_size == 0 {
            return None;
        }
        Some(self.processed_size as f64 / self.original_size as f64 * 100.0)
    }

    /// Percentage of the original size that was saved. Negative when the
    /// output grew.
    pub fn space_saved(&self) -> Option<f64> {
        if self.original_size == 0 {
            return None;
        }
        let saved = self.original_size as f64 - self.processed_size as f64;
        Some(saved / self.original_size as f64 * 100.0)
    }
}

/// Aggregate outcome of a directory batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failures: Vec<(PathBuf, String)>,
    pub original_bytes: u64,
    pub processed_bytes: u64,
}

impl BatchSummary {
    pub(crate) fn record_success(&mut self, stats: &CompressionStats) {
        self.succeeded += 1;
        self.original_bytes += stats.original_size;
        self.processed_bytes += stats.processed_size;
    }

    pub(crate) fn record_failure(&mut self, path: PathBuf, message: String) {
        self.failures.push((path, message));
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Combined statistics over every successful file.
    pub fn total(&self, elapsed: Duration) -> CompressionStats {
        CompressionStats::new(self.original_bytes, self.processed_bytes, elapsed)
    }
}

/// Format a percentage, printing `n/a` when it is undefined.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

/// Format a byte size into a human-readable string.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_and_savings() {
        let stats = CompressionStats::new(200, 50, Duration::ZERO);
        assert_eq!(stats.ratio(), Some(25.0));
        assert_eq!(stats.space_saved(), Some(75.0));
    }

    #[test]
    fn empty_source_has_no_ratio() {
        let stats = CompressionStats::new(0, 20, Duration::ZERO);
        assert_eq!(stats.ratio(), None);
        assert_eq!(stats.space_saved(), None);
        assert_eq!(format_percent(stats.ratio()), "n/a");
    }

    #[test]
    fn growth_gives_negative_savings() {
        let stats = CompressionStats::new(10, 30, Duration::ZERO);
        assert_eq!(stats.space_saved(), Some(-200.0));
    }

    #[test]
    fn summary_accumulates() {
        let mut summary = BatchSummary::default();
        summary.record_success(&CompressionStats::new(100, 40, Duration::ZERO));
        summary.record_success(&CompressionStats::new(300, 60, Duration::ZERO));
        summary.record_failure(PathBuf::from("x"), "boom".into());
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_clean());
        assert_eq!(summary.total(Duration::ZERO).ratio(), Some(25.0));
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }
}
