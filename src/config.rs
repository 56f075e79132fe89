//! Immutable pipeline configuration.

use flate2::Compression;

/// Suffix appended to compressed outputs and stripped on decompression.
pub const DEFAULT_SUFFIX: &str = ".gz";

/// Codec effort level, always within `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 9;
    pub const DEFAULT: CompressionLevel = CompressionLevel(6);

    /// Build a level, falling back to [`CompressionLevel::DEFAULT`] when
    /// `value` is outside `1..=9`.
    pub fn new(value: i64) -> Self {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            CompressionLevel(value as u32)
        } else {
            Self::DEFAULT
        }
    }

    /// Like [`CompressionLevel::new`], but reports whether the value was accepted.
    pub fn checked(value: i64) -> Option<Self> {
        (Self::MIN as i64..=Self::MAX as i64)
            .contains(&value)
            .then_some(CompressionLevel(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn to_flate2(self) -> Compression {
        Compression::new(self.0)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a pipeline operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

impl Mode {
    /// Past-tense verb used in progress lines.
    pub fn verb(self) -> &'static str {
        match self {
            Mode::Compress => "Compressed",
            Mode::Decompress => "Decompressed",
        }
    }
}

/// Settings shared by every call on a [`Compressor`](crate::Compressor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub level: CompressionLevel,
    pub suffix: String,
}

impl PipelineConfig {
    pub fn with_level(self, level: CompressionLevel) -> Self {
        Self { level, ..self }
    }

    pub fn with_suffix(self, suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..self
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::DEFAULT,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}
