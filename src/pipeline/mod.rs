//! File and directory pipelines.
//!
//! [`Compressor`] is the callable surface: two single-file operations
//! ([`Compressor::compress_file`], [`Compressor::decompress_file`]) and two
//! directory operations ([`Compressor::compress_directory`],
//! [`Compressor::decompress_directory`]). Directory operations walk the input
//! tree, mirror it under the output root and hand every regular file to the
//! file pipeline, one at a time.

mod directory;
mod file;
mod observer;

pub use directory::{FileTask, destination_for};
pub use observer::{BatchObserver, NoOpObserver};

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::io::{FileSystem, LocalFileSystem};

/// Runs gzip pipelines with a fixed configuration.
pub struct Compressor<F: FileSystem> {
    fs: Arc<F>,
    config: PipelineConfig,
}

impl<F: FileSystem> Compressor<F> {
    pub fn new(fs: Arc<F>, config: PipelineConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Compressor<LocalFileSystem> {
    /// A compressor working directly on the local disk.
    pub fn local(config: PipelineConfig) -> Self {
        Self::new(Arc::new(LocalFileSystem::new()), config)
    }
}

/// Run synchronous codec work off the async runtime.
async fn blocking<T, Func>(f: Func) -> Result<T>
where
    T: Send + 'static,
    Func: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Task(e.to_string()))
}
