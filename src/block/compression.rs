//! # Page Compression
//!
//! Compression codec applied to each page's record bytes as one unit. The
//! codec is chosen per block at write time and recorded by name in the block
//! metadata; readers resolve the name before decoding any page.

use std::fmt;
use std::io;

/// Compression codec for page payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Pages stored raw
    None,
    /// LZ4 with a size-prepended frame
    Lz4,
    /// Snappy raw format
    Snappy,
    /// Zstandard at the default level
    Zstd,
}

impl Compression {
    /// Codec applied by writers when none is chosen explicitly
    pub const DEFAULT: Compression = Compression::Snappy;

    /// Canonical codec name stored in block metadata
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Lz4 => "lz4",
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
        }
    }

    /// Resolve a codec from its metadata name
    pub fn from_name(name: &str) -> Option<Compression> {
        match name {
            "none" => Some(Compression::None),
            "lz4" => Some(Compression::Lz4),
            "snappy" => Some(Compression::Snappy),
            "zstd" => Some(Compression::Zstd),
            _ => None,
        }
    }

    /// Compress a page's record bytes
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            Compression::Snappy => {
                let mut encoder = snap::raw::Encoder::new();
                encoder
                    .compress_vec(data)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
            }
            Compression::Zstd => zstd::stream::encode_all(data, 0),
        }
    }

    /// Decompress a page's record bytes
    pub fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
            Compression::Snappy => {
                let mut decoder = snap::raw::Decoder::new();
                decoder
                    .decompress_vec(data)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
            }
            Compression::Zstd => zstd::stream::decode_all(data),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
