mod local;

pub use local::LocalFileSystem;

use async_trait::async_trait;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

/// Filesystem side effects the pipelines need besides reading and writing
/// file contents.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Create `path` and any missing parents. An existing directory is not an error.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Set the modification time of `path`; the access time becomes "now".
    async fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<()>;
}
