use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::debug;

use crate::config::Mode;
use crate::error::{Error, Result};
use crate::gzip::{self, EntryMetadata};
use crate::io::FileSystem;
use crate::stats::CompressionStats;

use super::{Compressor, blocking};

impl<F: FileSystem> Compressor<F> {
    /// Compress or decompress a single file, depending on `mode`.
    pub async fn process_file(
        &self,
        input: &Path,
        output: &Path,
        mode: Mode,
    ) -> Result<CompressionStats> {
        match mode {
            Mode::Compress => self.compress_file(input, output).await,
            Mode::Decompress => self.decompress_file(input, output).await,
        }
    }

    /// Compress `input` into a gzip file at `output`.
    ///
    /// The gzip header records the input's base name and modification time.
    /// `output` is created or truncated; if compression fails midway the
    /// partial output is left in place.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] / [`Error::PermissionDenied`] when `input`
    ///   cannot be opened or `output` cannot be created
    /// - [`Error::CodecInit`] when the base name cannot be stored in the header
    /// - [`Error::Io`] on any other read or write failure
    pub async fn compress_file(&self, input: &Path, output: &Path) -> Result<CompressionStats> {
        let start = Instant::now();

        let source = fs::File::open(input)
            .await
            .map_err(|e| Error::io(input, e))?;
        let info = source.metadata().await.map_err(|e| Error::io(input, e))?;
        ensure_regular(input, &info)?;
        ensure_distinct(input, output).await?;

        let metadata = EntryMetadata {
            name: base_name(input),
            modified: info.modified().ok(),
        };

        let dest = fs::File::create(output)
            .await
            .map_err(|e| Error::io(output, e))?;

        debug!(input = %input.display(), output = %output.display(), level = %self.config.level, "compressing");

        let source = source.into_std().await;
        let dest = dest.into_std().await;
        let level = self.config.level;
        let compressed_size = blocking(move || {
            gzip::compress(source, BufWriter::new(dest), level, &metadata)
        })
        .await?
        .map_err(|e| e.at(input, output))?;

        let stats = CompressionStats::new(info.len(), compressed_size, start.elapsed());
        debug!(
            input = %input.display(),
            bytes = stats.original_size,
            compressed = stats.processed_size,
            "compressed"
        );
        Ok(stats)
    }

    /// Decompress the gzip file `input` into `output`.
    ///
    /// When the header carries a modification time it is applied to
    /// `output`. The returned ratio compares the restored size with the
    /// compressed size on disk.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] / [`Error::PermissionDenied`] as for compression
    /// - [`Error::CodecFormat`] when `input` is not a valid gzip stream
    /// - [`Error::Io`] on any other read or write failure
    pub async fn decompress_file(&self, input: &Path, output: &Path) -> Result<CompressionStats> {
        let start = Instant::now();

        let source = fs::File::open(input)
            .await
            .map_err(|e| Error::io(input, e))?;
        let info = source.metadata().await.map_err(|e| Error::io(input, e))?;
        ensure_regular(input, &info)?;
        ensure_distinct(input, output).await?;

        let dest = fs::File::create(output)
            .await
            .map_err(|e| Error::io(output, e))?;

        debug!(input = %input.display(), output = %output.display(), "decompressing");

        let source = source.into_std().await;
        let dest = dest.into_std().await;
        // The output handle is closed inside the task, before the timestamp is set.
        let outcome = blocking(move || gzip::decompress(source, dest))
            .await?
            .map_err(|e| e.at(input, output))?;

        if let Some(modified) = outcome.modified {
            self.fs.set_modified(output, modified).await?;
        }

        let stats = CompressionStats::new(info.len(), outcome.bytes_written, start.elapsed());
        debug!(
            input = %input.display(),
            compressed = stats.original_size,
            bytes = stats.processed_size,
            "decompressed"
        );
        Ok(stats)
    }
}

fn ensure_regular(path: &Path, info: &std::fs::Metadata) -> Result<()> {
    if info.is_file() {
        return Ok(());
    }
    Err(Error::io(
        path,
        io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
    ))
}

/// Creating the output truncates it, so it must not be the input itself.
async fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if let (Ok(a), Ok(b)) = (fs::canonicalize(input).await, fs::canonicalize(output).await)
        && a == b
    {
        return Err(Error::io(
            output,
            io::Error::new(io::ErrorKind::InvalidInput, "output is the input file"),
        ));
    }
    Ok(())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
