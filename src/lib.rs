//! # gzpipe
//!
//! A Rust gzip utility that compresses single files or mirrors whole
//! directory trees.
//!
//! Every file is written as a standard gzip member (RFC 1952) carrying the
//! original base name and modification time in its header, so the output
//! can be read by any gzip decoder and decompression restores the timestamp.
//!
//! ## Features
//!
//! - Compress and decompress single files with size/ratio/timing statistics
//! - Compress and decompress directory trees, mirroring the layout 1:1
//! - Best-effort batches: a failing file is reported and skipped
//! - Header inspection (`gzip -l` style) without inflating the body
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use gzpipe::{CompressionLevel, Compressor, NoOpObserver, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::default().with_level(CompressionLevel::new(9));
//!     let compressor = Compressor::local(config);
//!
//!     let stats = compressor
//!         .compress_file(Path::new("report.txt"), Path::new("report.txt.gz"))
//!         .await?;
//!     println!("{} -> {} bytes", stats.original_size, stats.processed_size);
//!
//!     let summary = compressor
//!         .compress_directory(Path::new("docs"), Path::new("docs_gz"), &NoOpObserver)
//!         .await?;
//!     println!("{} files, {} failed", summary.succeeded, summary.failed());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gzip;
pub mod io;
pub mod pipeline;
pub mod stats;

pub use cli::Cli;
pub use config::{CompressionLevel, Mode, PipelineConfig};
pub use error::{Error, Result};
pub use io::{FileSystem, LocalFileSystem};
pub use pipeline::{BatchObserver, Compressor, FileTask, NoOpObserver};
pub use stats::{BatchSummary, CompressionStats};
