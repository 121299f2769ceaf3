use alloc::string::String;

use thiserror::Error;

/// Fatal errors raised while decoding a FITS buffer.
///
/// Degraded input (unparseable cards, missing `END`, unknown extension kinds)
/// never surfaces here; it is recorded in the decoded entries instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A keyword needed to size a known-kind entry is absent.
    #[error("missing required keyword {keyword} in entry at offset {offset}")]
    MissingKeyword { keyword: String, offset: usize },

    /// A sizing keyword is present but does not hold a usable integer.
    #[error("invalid value for keyword {keyword} in entry at offset {offset}")]
    InvalidKeywordValue { keyword: String, offset: usize },

    /// `BITPIX / 8` produced a negative data size.
    #[error("negative data size {size} (BITPIX = {bitpix}) in entry at offset {offset}")]
    NegativeDataSize { offset: usize, bitpix: i64, size: i64 },

    /// The element count or byte size does not fit in 64 bits.
    #[error("data size overflow in entry at offset {offset}")]
    DataSizeOverflow { offset: usize },

    /// The data segment's meaningful bytes run past the end of the buffer.
    #[error(
        "unexpected end of buffer at offset {offset}: needed {needed} bytes, {available} available"
    )]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Unrecognized BITPIX value for sample decoding.
    #[error("invalid BITPIX value: {0}")]
    InvalidBitpix(i64),

    /// Sample decoding was requested on an entry that holds no image.
    #[error("entry is not an image")]
    NotAnImage,

    /// The decoded samples could not be arranged into the declared shape.
    #[error("invalid image shape: {0}")]
    Shape(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
