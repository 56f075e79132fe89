use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by the codec and the file/directory pipelines.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("IO error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot start gzip container: {0}")]
    CodecInit(String),

    #[error("invalid gzip data: {0}")]
    CodecFormat(String),

    #[error("'{}' does not end with '{suffix}'", path.display())]
    MissingSuffix { path: PathBuf, suffix: String },

    #[error("cannot traverse '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("worker task failed: {0}")]
    Task(String),
}

impl Error {
    /// Classify an IO error against the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
            _ => Error::Io { path, source },
        }
    }
}

/// Library-level Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
