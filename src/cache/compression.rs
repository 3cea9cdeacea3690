//! Snapshot compression selected by file extension
//!
//! `.zst` and `.lz4` snapshots need the `compression` feature; any other
//! extension is plain JSON.

use crate::{Error, Result};
use std::path::Path;

/// Compression algorithm of a cache snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain JSON
    #[default]
    None,
    /// LZ4 frame with prepended size
    Lz4,
    /// ZSTD, level 3
    Zstd,
}

impl Compression {
    /// Algorithm for `path`, by extension.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("lz4") => Self::Lz4,
            Some("zst" | "zstd") => Self::Zstd,
            _ => Self::None,
        }
    }

    /// Get algorithm name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// Compress data using this algorithm
    ///
    /// # Errors
    /// Returns error if compression fails or the algorithm was not compiled in
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            #[cfg(feature = "compression")]
            Self::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            #[cfg(feature = "compression")]
            Self::Zstd => zstd::encode_all(data, 3)
                .map_err(|e| Error::Cache(format!("ZSTD compression failed: {e}"))),
            #[cfg(not(feature = "compression"))]
            Self::Lz4 | Self::Zstd => Err(self.unavailable()),
        }
    }

    /// Decompress data using this algorithm
    ///
    /// # Errors
    /// Returns error if decompression fails (e.g., corrupted data) or the
    /// algorithm was not compiled in
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            #[cfg(feature = "compression")]
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::Cache(format!("LZ4 decompression failed: {e}"))),
            #[cfg(feature = "compression")]
            Self::Zstd => zstd::decode_all(data)
                .map_err(|e| Error::Cache(format!("ZSTD decompression failed: {e}"))),
            #[cfg(not(feature = "compression"))]
            Self::Lz4 | Self::Zstd => Err(self.unavailable()),
        }
    }

    #[cfg(not(feature = "compression"))]
    fn unavailable(self) -> Error {
        Error::Cache(format!(
            "{} snapshots need the `compression` feature",
            self.as_str()
        ))
    }
}
