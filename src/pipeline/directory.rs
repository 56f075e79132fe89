use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Mode;
use crate::error::{Error, Result};
use crate::io::FileSystem;
use crate::stats::{BatchSummary, CompressionStats};

use super::{BatchObserver, Compressor, blocking};

/// One regular file found in the input tree and where its result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// A walk entry is either a task to run or a path that already failed.
type Planned = std::result::Result<FileTask, (PathBuf, Error)>;

/// Map a path relative to the input root onto the output root.
///
/// Compression appends `suffix`. Decompression strips it, and fails with
/// [`Error::MissingSuffix`] when the file name does not end with it (or is
/// nothing but the suffix) rather than inventing a name.
pub fn destination_for(
    output_root: &Path,
    relative: &Path,
    mode: Mode,
    suffix: &str,
) -> Result<PathBuf> {
    match mode {
        Mode::Compress => {
            let mut name = output_root.join(relative).into_os_string();
            name.push(suffix);
            Ok(PathBuf::from(name))
        }
        Mode::Decompress => {
            let stripped = relative
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(suffix))
                .filter(|name| !name.is_empty())
                .ok_or_else(|| Error::MissingSuffix {
                    path: relative.to_path_buf(),
                    suffix: suffix.to_string(),
                })?;
            let parent = relative.parent().unwrap_or(Path::new(""));
            Ok(output_root.join(parent).join(stripped))
        }
    }
}

/// Walk `input_root` in lexical order and plan one task per regular file.
///
/// Only a failure to read the root itself aborts the walk; unreadable
/// entries below it are returned as failed plans.
fn plan_tasks(
    input_root: &Path,
    output_root: &Path,
    mode: Mode,
    suffix: &str,
) -> Result<Vec<Planned>> {
    // Outputs written inside the input tree must not be picked up again.
    let excluded = match (input_root.canonicalize(), output_root.canonicalize()) {
        (Ok(input), Ok(output)) if output != input && output.starts_with(&input) => Some(output),
        _ => None,
    };

    let walker = WalkDir::new(input_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match &excluded {
            Some(out) if entry.file_type().is_dir() => entry
                .path()
                .canonicalize()
                .map(|p| p != *out)
                .unwrap_or(true),
            _ => true,
        });

    let mut planned = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(Error::Walk {
                    path: input_root.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                let path = source.path().unwrap_or(input_root).to_path_buf();
                planned.push(Err((path.clone(), Error::Walk { path, source })));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            if entry.file_type().is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
            }
            continue;
        }

        let input = entry.into_path();
        let relative = match input.strip_prefix(input_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };

        planned.push(
            destination_for(output_root, &relative, mode, suffix)
                .map(|output| FileTask {
                    input: input.clone(),
                    output,
                })
                .map_err(|e| (input, e)),
        );
    }

    Ok(planned)
}

impl<F: FileSystem> Compressor<F> {
    /// Compress every regular file under `input_dir` into a mirrored tree
    /// under `output_dir`.
    pub async fn compress_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        observer: &dyn BatchObserver,
    ) -> Result<BatchSummary> {
        self.process_directory(input_dir, output_dir, Mode::Compress, observer)
            .await
    }

    /// Decompress every regular file under `input_dir` into a mirrored tree
    /// under `output_dir`, stripping the configured suffix.
    pub async fn decompress_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        observer: &dyn BatchObserver,
    ) -> Result<BatchSummary> {
        self.process_directory(input_dir, output_dir, Mode::Decompress, observer)
            .await
    }

    /// Run `mode` over a whole directory tree as a best-effort batch.
    ///
    /// Files are processed one at a time in lexical traversal order. A
    /// failing file is reported to `observer`, recorded in the summary and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Only setup failures are returned: `output_dir` cannot be created, or
    /// `input_dir` is missing, not a directory or unreadable.
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        mode: Mode,
        observer: &dyn BatchObserver,
    ) -> Result<BatchSummary> {
        let start = Instant::now();
        info!(input = %input_dir.display(), output = %output_dir.display(), ?mode, "starting batch");

        let root = fs::metadata(input_dir)
            .await
            .map_err(|e| Error::io(input_dir, e))?;
        if !root.is_dir() {
            return Err(Error::io(
                input_dir,
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        self.fs.create_dir_all(output_dir).await?;

        let planned = {
            let input_root = input_dir.to_path_buf();
            let output_root = output_dir.to_path_buf();
            let suffix = self.config.suffix.clone();
            blocking(move || plan_tasks(&input_root, &output_root, mode, &suffix)).await??
        };

        let mut summary = BatchSummary::default();
        for plan in planned {
            let task = match plan {
                Ok(task) => task,
                Err((path, error)) => {
                    warn!(path = %path.display(), %error, "skipping file");
                    observer.file_failed(mode, &path, &error);
                    summary.record_failure(path, error.to_string());
                    continue;
                }
            };

            match self.run_task(&task, mode).await {
                Ok(stats) => {
                    observer.file_completed(mode, &task, &stats);
                    summary.record_success(&stats);
                }
                Err(error) => {
                    warn!(path = %task.input.display(), %error, "file failed");
                    observer.file_failed(mode, &task.input, &error);
                    summary.record_failure(task.input, error.to_string());
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch finished"
        );
        Ok(summary)
    }

    async fn run_task(&self, task: &FileTask, mode: Mode) -> Result<CompressionStats> {
        if let Some(parent) = task.output.parent() {
            self.fs.create_dir_all(parent).await?;
        }
        self.process_file(&task.input, &task.output, mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_appends_suffix() {
        let out = destination_for(
            Path::new("out"),
            Path::new("a/b/c.txt"),
            Mode::Compress,
            ".gz",
        )
        .unwrap();
        assert_eq!(out, Path::new("out/a/b/c.txt.gz"));
    }

    #[test]
    fn decompress_strips_suffix() {
        let out = destination_for(
            Path::new("restored"),
            Path::new("a/b/c.txt.gz"),
            Mode::Decompress,
            ".gz",
        )
        .unwrap();
        assert_eq!(out, Path::new("restored/a/b/c.txt"));
    }

    #[test]
    fn decompress_only_strips_a_trailing_suffix() {
        let out = destination_for(
            Path::new("r"),
            Path::new("archive.gz.backup.gz"),
            Mode::Decompress,
            ".gz",
        )
        .unwrap();
        assert_eq!(out, Path::new("r/archive.gz.backup"));
    }

    #[test]
    fn decompress_without_suffix_fails() {
        for name in ["notes.txt", ".gz", "dir.gz/plain"] {
            let err = destination_for(Path::new("r"), Path::new(name), Mode::Decompress, ".gz")
                .unwrap_err();
            assert!(matches!(err, Error::MissingSuffix { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn plan_is_lexical_and_skips_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("in");
        std::fs::create_dir_all(root.join("b/inner")).unwrap();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::write(root.join("z.txt"), "z").unwrap();
        std::fs::write(root.join("b/inner/y.txt"), "y").unwrap();
        std::fs::write(root.join("a/x.txt"), "x").unwrap();

        let out = dir.path().join("out");
        let planned = plan_tasks(&root, &out, Mode::Compress, ".gz").unwrap();
        let outputs: Vec<_> = planned
            .into_iter()
            .map(|p| p.unwrap().output)
            .collect();
        assert_eq!(
            outputs,
            vec![
                out.join("a/x.txt.gz"),
                out.join("b/inner/y.txt.gz"),
                out.join("z.txt.gz"),
            ]
        );
    }

    #[test]
    fn plan_excludes_nested_output_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("keep.txt"), "k").unwrap();
        std::fs::create_dir_all(root.join("packed")).unwrap();
        std::fs::write(root.join("packed/keep.txt.gz"), "old").unwrap();

        let planned = plan_tasks(root, &root.join("packed"), Mode::Compress, ".gz").unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].as_ref().unwrap().input, root.join("keep.txt"));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = plan_tasks(
            &dir.path().join("absent"),
            &dir.path().join("out"),
            Mode::Compress,
            ".gz",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));
    }
}
