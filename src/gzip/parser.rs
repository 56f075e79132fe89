//! Header and trailer inspection for gzip files.
//!
//! A gzip member starts with a 10-byte fixed header followed by optional
//! fields selected by the flag byte, and ends with an 8-byte trailer holding
//! the CRC32 and the uncompressed size modulo 2^32. Listing a file only needs
//! those two ends, so the deflate body is never inflated here.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::stats::CompressionStats;

use super::header::{FixedHeader, GzipHeader, Trailer, flags};

/// Smallest possible member: header plus trailer.
const MIN_CONTAINER_SIZE: u64 = (FixedHeader::SIZE + Trailer::SIZE) as u64;

/// What `list` shows for one gzip file.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub path: PathBuf,
    pub header: GzipHeader,
    pub trailer: Trailer,
    pub compressed_size: u64,
}

impl ContainerInfo {
    /// Uncompressed size as recorded in the trailer (modulo 4 GiB).
    ///
    /// Only the final trailer is read, so for concatenated members this is
    /// the size of the last member alone, as with `gzip -l`.
    pub fn uncompressed_size(&self) -> u64 {
        self.trailer.isize as u64
    }

    /// Sizes expressed as compression statistics of the original data.
    pub fn stats(&self) -> CompressionStats {
        CompressionStats::new(self.uncompressed_size(), self.compressed_size, Duration::ZERO)
    }
}

/// Reads the header and trailer of a gzip file.
pub struct ContainerParser<R> {
    reader: R,
    path: PathBuf,
    size: u64,
}

impl<R: Read + Seek> ContainerParser<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            reader,
            path: path.into(),
            size,
        }
    }

    /// Parse the member header at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodecFormat`] when the header is malformed or the
    /// file ends inside it.
    pub fn read_header(&mut self) -> Result<GzipHeader> {
        let mut buf = [0u8; FixedHeader::SIZE];
        self.reader.read_exact(&mut buf).map_err(|e| self.fail(e))?;
        let fixed = FixedHeader::from_bytes(&buf)?;

        let mut extra_len = 0;
        if fixed.has(flags::FEXTRA) {
            extra_len = self
                .reader
                .read_u16::<LittleEndian>()
                .map_err(|e| self.fail(e))?;
            self.skip(extra_len as u64)?;
        }

        let file_name = if fixed.has(flags::FNAME) {
            Some(self.read_cstring()?)
        } else {
            None
        };

        let comment = if fixed.has(flags::FCOMMENT) {
            Some(self.read_cstring()?)
        } else {
            None
        };

        let header_crc = if fixed.has(flags::FHCRC) {
            Some(
                self.reader
                    .read_u16::<LittleEndian>()
                    .map_err(|e| self.fail(e))?,
            )
        } else {
            None
        };

        Ok(GzipHeader {
            fixed,
            extra_len,
            file_name,
            comment,
            header_crc,
        })
    }

    /// Read the trailer from the last 8 bytes of the file (the last member's
    /// trailer when members are concatenated).
    pub fn read_trailer(&mut self) -> Result<Trailer> {
        self.reader
            .seek(SeekFrom::End(-(Trailer::SIZE as i64)))
            .map_err(|e| self.fail(e))?;
        let mut buf = [0u8; Trailer::SIZE];
        self.reader.read_exact(&mut buf).map_err(|e| self.fail(e))?;
        Trailer::from_bytes(&buf)
    }

    pub fn parse(mut self) -> Result<ContainerInfo> {
        if self.size < MIN_CONTAINER_SIZE {
            return Err(Error::CodecFormat(format!(
                "{} is too short to be a gzip file",
                self.path.display()
            )));
        }

        let header = self.read_header()?;
        let trailer = self.read_trailer()?;

        Ok(ContainerInfo {
            path: self.path,
            header,
            trailer,
            compressed_size: self.size,
        })
    }

    /// Read a zero-terminated Latin-1 string (FNAME / FCOMMENT).
    fn read_cstring(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.reader.read_u8().map_err(|e| self.fail(e))?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok(bytes.into_iter().map(char::from).collect())
    }

    fn skip(&mut self, len: u64) -> Result<()> {
        let result = {
            let mut limited = (&mut self.reader).take(len);
            io::copy(&mut limited, &mut io::sink())
        };
        let copied = result.map_err(|e| self.fail(e))?;
        if copied < len {
            return Err(Error::CodecFormat("truncated extra field".into()));
        }
        Ok(())
    }

    fn fail(&self, e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::CodecFormat("truncated gzip header".into())
        } else {
            Error::io(&self.path, e)
        }
    }
}

/// Inspect the gzip file at `path` without decompressing it.
pub async fn inspect(path: &Path) -> Result<ContainerInfo> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        let size = file.metadata().map_err(|e| Error::io(&path, e))?.len();
        ContainerParser::new(BufReader::new(file), path, size).parse()
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, GzBuilder};
    use std::io::{Cursor, Write};

    fn parse(bytes: Vec<u8>) -> Result<ContainerInfo> {
        let size = bytes.len() as u64;
        ContainerParser::new(Cursor::new(bytes), "mem.gz", size).parse()
    }

    #[test]
    fn reads_name_comment_and_sizes() {
        let mut encoder = GzBuilder::new()
            .filename("notes.txt")
            .comment("hello")
            .mtime(1_700_000_000)
            .write(Vec::new(), Compression::default());
        encoder.write_all(&[b'a'; 1000]).unwrap();
        let bytes = encoder.finish().unwrap();
        let len = bytes.len() as u64;

        let info = parse(bytes).unwrap();
        assert_eq!(info.header.file_name.as_deref(), Some("notes.txt"));
        assert_eq!(info.header.comment.as_deref(), Some("hello"));
        assert_eq!(info.header.fixed.mtime, 1_700_000_000);
        assert_eq!(info.uncompressed_size(), 1000);
        assert_eq!(info.compressed_size, len);
    }

    #[test]
    fn skips_extra_field() {
        let mut encoder = GzBuilder::new()
            .extra(vec![1, 2, 3, 4])
            .filename("x")
            .write(Vec::new(), Compression::fast());
        encoder.write_all(b"data").unwrap();
        let info = parse(encoder.finish().unwrap()).unwrap();
        assert_eq!(info.header.extra_len, 4);
        assert_eq!(info.header.file_name.as_deref(), Some("x"));
        assert_eq!(info.header.modified(), None);
    }

    #[test]
    fn concatenated_members_report_the_last_trailer() {
        let mut bytes = Vec::new();
        for (name, body) in [("one", vec![b'x'; 500]), ("two", vec![b'y'; 20])] {
            let mut encoder = GzBuilder::new()
                .filename(name)
                .write(Vec::new(), Compression::default());
            encoder.write_all(&body).unwrap();
            bytes.extend(encoder.finish().unwrap());
        }

        let info = parse(bytes).unwrap();
        assert_eq!(info.header.file_name.as_deref(), Some("one"));
        assert_eq!(info.uncompressed_size(), 20);
    }

    #[test]
    fn rejects_short_and_foreign_input() {
        assert!(matches!(parse(vec![0x1f, 0x8b]), Err(Error::CodecFormat(_))));
        assert!(matches!(parse(vec![b'P'; 64]), Err(Error::CodecFormat(_))));
    }

    #[test]
    fn unterminated_name_is_a_format_error() {
        let mut bytes = vec![0x1f, 0x8b, 8, flags::FNAME, 0, 0, 0, 0, 0, 3];
        bytes.extend_from_slice(b"never-ends-without-a-nul");
        let size = bytes.len() as u64;
        let mut parser = ContainerParser::new(Cursor::new(bytes), "mem.gz", size);
        assert!(matches!(parser.read_header(), Err(Error::CodecFormat(_))));
    }
}
