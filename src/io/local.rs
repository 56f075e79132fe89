use super::FileSystem;
use async_trait::async_trait;
use std::fs::{FileTimes, OpenOptions};
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;

use crate::error::{Error, Result};

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<()> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let times = FileTimes::new()
                .set_accessed(SystemTime::now())
                .set_modified(modified);
            // set_times needs a writable handle on Windows
            OpenOptions::new()
                .write(true)
                .open(&owned)
                .and_then(|file| file.set_times(times))
                .map_err(|e| Error::io(&owned, e))
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}
