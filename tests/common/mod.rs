#![allow(dead_code)]

use async_trait::async_trait;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gzpipe::{
    BatchObserver, CompressionStats, Error, FileSystem, FileTask, LocalFileSystem, Mode, Result,
};

/// A fixed, whole-second timestamp that survives a gzip round trip.
pub fn fixed_time() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_600_000_000)
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

/// Deterministic text with enough repetition to compress well.
pub fn sample_text(seed: usize, lines: usize) -> Vec<u8> {
    let words = [
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
    ];
    let mut out = String::new();
    for i in 0..lines {
        let n = (i * 7 + seed * 13) % words.len();
        out.push_str(&format!(
            "{} {} line {} of sample {}\n",
            words[n],
            words[(n + seed) % words.len()],
            i,
            seed
        ));
    }
    out.into_bytes()
}

/// All regular files under `root`, relative and sorted.
pub fn list_tree(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    files.sort();
    files
}

/// Delegates to the real disk and records every capability call.
#[derive(Default)]
pub struct RecordingFs {
    inner: LocalFileSystem,
    pub created: Mutex<Vec<PathBuf>>,
    pub modified: Mutex<Vec<(PathBuf, SystemTime)>>,
}

#[async_trait]
impl FileSystem for RecordingFs {
    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.created.lock().unwrap().push(path.to_path_buf());
        self.inner.create_dir_all(path).await
    }

    async fn set_modified(&self, path: &Path, modified: SystemTime) -> Result<()> {
        self.modified
            .lock()
            .unwrap()
            .push((path.to_path_buf(), modified));
        self.inner.set_modified(path, modified).await
    }
}

/// Collects batch events as strings, in the order they were reported.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl BatchObserver for RecordingObserver {
    fn file_completed(&self, mode: Mode, task: &FileTask, _stats: &CompressionStats) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{} {}", mode.verb(), task.input.display()));
    }

    fn file_failed(&self, _mode: Mode, input: &Path, _error: &Error) {
        self.events
            .lock()
            .unwrap()
            .push(format!("Failed {}", input.display()));
    }
}
