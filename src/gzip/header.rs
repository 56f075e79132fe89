use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// gzip member magic bytes
pub const GZIP_MAGIC: &[u8] = b"\x1f\x8b";

/// The only compression method defined by RFC 1952
pub const METHOD_DEFLATE: u8 = 8;

/// Header flag bits (FLG byte)
pub mod flags {
    pub const FTEXT: u8 = 0x01;
    pub const FHCRC: u8 = 0x02;
    pub const FEXTRA: u8 = 0x04;
    pub const FNAME: u8 = 0x08;
    pub const FCOMMENT: u8 = 0x10;
    pub const RESERVED: u8 = 0xE0;
}

/// Fixed part of a gzip member header - 10 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub method: u8,
    pub flags: u8,
    pub mtime: u32,
    pub extra_flags: u8,
    pub os: u8,
}

impl FixedHeader {
    pub const SIZE: usize = 10;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::CodecFormat("truncated gzip header".into()));
        }

        if &data[0..2] != GZIP_MAGIC {
            return Err(Error::CodecFormat("not in gzip format".into()));
        }

        let method = data[2];
        if method != METHOD_DEFLATE {
            return Err(Error::CodecFormat(format!(
                "unknown compression method {}",
                method
            )));
        }

        let flag_bits = data[3];
        if flag_bits & flags::RESERVED != 0 {
            return Err(Error::CodecFormat(format!(
                "reserved header flags set (0x{:02x})",
                flag_bits
            )));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let mtime = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::CodecFormat("truncated gzip header".into()))?;

        Ok(Self {
            method,
            flags: flag_bits,
            mtime,
            extra_flags: data[8],
            os: data[9],
        })
    }

    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

/// Fully parsed gzip member header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    pub fixed: FixedHeader,
    pub extra_len: u16,
    pub file_name: Option<String>,
    pub comment: Option<String>,
    pub header_crc: Option<u16>,
}

impl GzipHeader {
    /// Modification time, or `None` when the header carries 0.
    pub fn modified(&self) -> Option<SystemTime> {
        system_time_from_mtime(self.fixed.mtime)
    }

    /// Name of the operating system recorded in the OS byte.
    pub fn os_name(&self) -> &'static str {
        match self.fixed.os {
            0 => "FAT",
            3 => "Unix",
            7 => "Macintosh",
            10 => "TOPS-20",
            11 => "NTFS",
            255 => "unknown",
            _ => "other",
        }
    }
}

/// gzip member trailer - 8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    pub crc32: u32,
    /// Uncompressed size modulo 2^32
    pub isize: u32,
}

impl Trailer {
    pub const SIZE: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::CodecFormat("truncated gzip trailer".into()));
        }

        let mut cursor = Cursor::new(data);
        let truncated = |_| Error::CodecFormat("truncated gzip trailer".into());

        Ok(Self {
            crc32: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            isize: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
        })
    }
}

/// Convert a filesystem time to a gzip MTIME. Times that do not fit in
/// unsigned 32-bit seconds since the epoch become 0 ("no timestamp").
pub fn mtime_from_system_time(time: SystemTime) -> u32 {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u32::try_from(d.as_secs()).ok())
        .unwrap_or(0)
}

pub fn system_time_from_mtime(mtime: u32) -> Option<SystemTime> {
    if mtime == 0 {
        return None;
    }
    Some(UNIX_EPOCH + Duration::from_secs(mtime as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(bytes: [u8; 10]) -> Result<FixedHeader> {
        FixedHeader::from_bytes(&bytes)
    }

    #[test]
    fn parses_fixed_header() {
        let header = fixed([0x1f, 0x8b, 8, flags::FNAME, 0x10, 0x20, 0x30, 0x40, 2, 3]).unwrap();
        assert_eq!(header.mtime, 0x4030_2010);
        assert!(header.has(flags::FNAME));
        assert!(!header.has(flags::FCOMMENT));
        assert_eq!(header.extra_flags, 2);
        assert_eq!(header.os, 3);
    }

    #[test]
    fn rejects_bad_magic_method_and_flags() {
        assert!(matches!(
            fixed([b'P', b'K', 8, 0, 0, 0, 0, 0, 0, 3]),
            Err(Error::CodecFormat(_))
        ));
        assert!(matches!(
            fixed([0x1f, 0x8b, 7, 0, 0, 0, 0, 0, 0, 3]),
            Err(Error::CodecFormat(_))
        ));
        assert!(matches!(
            fixed([0x1f, 0x8b, 8, 0x20, 0, 0, 0, 0, 0, 3]),
            Err(Error::CodecFormat(_))
        ));
        assert!(matches!(
            FixedHeader::from_bytes(&[0x1f, 0x8b, 8]),
            Err(Error::CodecFormat(_))
        ));
    }

    #[test]
    fn mtime_conversions() {
        let t = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        assert_eq!(mtime_from_system_time(t), 1_600_000_000);
        assert_eq!(system_time_from_mtime(1_600_000_000), Some(t));
        assert_eq!(system_time_from_mtime(0), None);

        let before_epoch = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(mtime_from_system_time(before_epoch), 0);
        let too_late = UNIX_EPOCH + Duration::from_secs(u32::MAX as u64 + 1);
        assert_eq!(mtime_from_system_time(too_late), 0);
    }

    #[test]
    fn names_the_recording_os() {
        let mut header = GzipHeader {
            fixed: fixed([0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 3]).unwrap(),
            extra_len: 0,
            file_name: None,
            comment: None,
            header_crc: None,
        };
        assert_eq!(header.os_name(), "Unix");
        header.fixed.os = 11;
        assert_eq!(header.os_name(), "NTFS");
        header.fixed.os = 42;
        assert_eq!(header.os_name(), "other");
    }

    #[test]
    fn parses_trailer() {
        let trailer = Trailer::from_bytes(&[1, 0, 0, 0, 0x00, 0x01, 0, 0]).unwrap();
        assert_eq!(trailer.crc32, 1);
        assert_eq!(trailer.isize, 256);
    }
}
