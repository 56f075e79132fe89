use flate2::bufread::GzDecoder;
use flate2::{GzBuilder, GzHeader};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;

use crate::config::CompressionLevel;
use crate::error::Error;

use super::header::{mtime_from_system_time, system_time_from_mtime};

const BUFFER_SIZE: usize = 64 * 1024;

/// Header metadata stored in (or recovered from) a gzip member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub name: String,
    pub modified: Option<SystemTime>,
}

/// Result of decoding one gzip stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub bytes_written: u64,
    pub file_name: Option<String>,
    /// `None` when the header carried no timestamp.
    pub modified: Option<SystemTime>,
}

/// Codec failures, before they are tied to a concrete input/output path.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("cannot start gzip container: {0}")]
    Init(String),

    #[error("invalid gzip data: {0}")]
    Format(String),

    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

impl CodecError {
    /// Attach the paths the codec was reading from and writing to.
    pub fn at(self, input: &Path, output: &Path) -> Error {
        match self {
            CodecError::Init(msg) => Error::CodecInit(msg),
            CodecError::Format(msg) => Error::CodecFormat(msg),
            CodecError::Read(e) => Error::io(input, e),
            CodecError::Write(e) => Error::io(output, e),
        }
    }
}

/// Compress everything from `source` into a gzip member written to `dest`.
///
/// The member header carries `metadata.name` as FNAME and
/// `metadata.modified` as MTIME. The encoder is finished and `dest` flushed
/// before returning, so the returned count is the full container length.
pub fn compress<R: Read, W: Write>(
    mut source: R,
    dest: W,
    level: CompressionLevel,
    metadata: &EntryMetadata,
) -> Result<u64, CodecError> {
    if metadata.name.as_bytes().contains(&0) {
        return Err(CodecError::Init(format!(
            "file name {:?} contains a NUL byte",
            metadata.name
        )));
    }

    let mtime = metadata.modified.map(mtime_from_system_time).unwrap_or(0);
    let mut encoder = GzBuilder::new()
        .filename(metadata.name.as_bytes())
        .mtime(mtime)
        .write(CountingWriter::new(dest), level.to_flate2());

    pump(&mut source, &mut encoder, CodecError::Read)?;

    let mut counter = encoder.finish().map_err(CodecError::Write)?;
    counter.flush().map_err(CodecError::Write)?;
    Ok(counter.count())
}

/// Decompress a gzip stream from `source` into `dest`.
///
/// Concatenated members are decoded one after another; the returned
/// metadata comes from the first member's header, even when that member
/// is empty.
pub fn decompress<R: Read, W: Write>(source: R, mut dest: W) -> Result<DecodeOutcome, CodecError> {
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, source);
    let mut first: Option<GzHeader> = None;
    let mut bytes_written = 0u64;

    loop {
        let header = {
            let mut member = GzDecoder::new(&mut reader);
            bytes_written += pump(&mut member, &mut dest, classify_decode_error)?;
            member.header().cloned()
        };

        if first.is_none() {
            first = Some(header.ok_or_else(|| CodecError::Format("missing gzip header".into()))?);
        }

        // Another member follows only if input remains after this trailer.
        if reader.fill_buf().map_err(CodecError::Read)?.is_empty() {
            break;
        }
    }
    dest.flush().map_err(CodecError::Write)?;

    let header = first.ok_or_else(|| CodecError::Format("missing gzip header".into()))?;
    Ok(DecodeOutcome {
        bytes_written,
        file_name: header
            .filename()
            .map(|name| String::from_utf8_lossy(name).into_owned()),
        modified: system_time_from_mtime(header.mtime()),
    })
}

/// Decoder-side errors: malformed input is a format problem, anything else
/// came from the underlying reader.
fn classify_decode_error(e: io::Error) -> CodecError {
    match e.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            CodecError::Format(e.to_string())
        }
        _ => CodecError::Read(e),
    }
}

fn pump<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    on_read_error: fn(io::Error) -> CodecError,
) -> Result<u64, CodecError> {
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(on_read_error(e)),
        };
        writer.write_all(&buf[..n]).map_err(CodecError::Write)?;
        total += n as u64;
    }

    Ok(total)
}

/// Counts the bytes that reach the wrapped writer.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
