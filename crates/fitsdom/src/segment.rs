//! Entry segmentation: splitting a buffer into entries and sizing each data
//! segment from its header.

use alloc::format;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::{debug, warn};

use crate::block::{copy_padded, padded_byte_len, BLOCK_SIZE, CARD_SIZE};
use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::header::{scan_header, HeaderEnd, Param};
use crate::options::DecodeOptions;
use crate::value::Value;

/// Keyword that opens every extension header, also used as the block magic
/// when searching for the end of an unresolved entry.
pub const XTENSION_KEYWORD: &str = "XTENSION";

/// Sizing inputs and result for a known-kind entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    pub bitpix: i64,
    /// `BITPIX / 8` under the active [`DecodeOptions`]; may be negative.
    pub element_byte_size: i64,
    /// Product of `NAXIS1..NAXISn`, or 0 when `NAXIS = 0`.
    pub element_count: i64,
    /// `element_count * element_byte_size`, before block padding.
    pub raw_size: i64,
}

fn first_param<'a>(header: &'a [Param], name: &str) -> Option<&'a Param> {
    header.iter().find(|p| p.name == name)
}

fn required_integer(header: &[Param], keyword: &str, offset: usize) -> Result<i64> {
    let param = first_param(header, keyword).ok_or_else(|| Error::MissingKeyword {
        keyword: keyword.into(),
        offset,
    })?;
    param
        .value
        .as_ref()
        .and_then(Value::as_integer)
        .ok_or_else(|| Error::InvalidKeywordValue {
            keyword: keyword.into(),
            offset,
        })
}

/// Decide the kind of an entry from its position and `XTENSION` keyword.
///
/// The first entry in a buffer is always [`EntryKind::Primary`].
pub fn resolve_kind(header: &[Param], is_first: bool) -> EntryKind {
    if is_first {
        return EntryKind::Primary;
    }
    match first_param(header, XTENSION_KEYWORD).and_then(|p| p.value.as_ref()) {
        Some(Value::String(xtension)) => EntryKind::from_xtension(xtension),
        _ => EntryKind::Unresolved,
    }
}

/// Compute the data layout of a known-kind entry from `BITPIX`, `NAXIS` and
/// `NAXIS1..NAXISn`.
///
/// `offset` is the entry's start offset and only feeds error reporting. The
/// returned `raw_size` keeps the sign of `BITPIX / 8`; it is up to the caller
/// to reject a negative size.
pub fn data_layout(header: &[Param], offset: usize, options: &DecodeOptions) -> Result<DataLayout> {
    let bitpix = required_integer(header, "BITPIX", offset)?;
    let naxis = required_integer(header, "NAXIS", offset)?;
    if naxis < 0 {
        return Err(Error::InvalidKeywordValue {
            keyword: "NAXIS".into(),
            offset,
        });
    }

    let element_byte_size = options.element_byte_size(bitpix);
    let mut element_count: i64 = if naxis == 0 { 0 } else { 1 };
    for i in 1..=naxis {
        let keyword = format!("NAXIS{i}");
        let dim = required_integer(header, &keyword, offset)?;
        if dim < 0 {
            return Err(Error::InvalidKeywordValue { keyword, offset });
        }
        element_count = element_count
            .checked_mul(dim)
            .ok_or(Error::DataSizeOverflow { offset })?;
    }

    let raw_size = element_count
        .checked_mul(element_byte_size)
        .ok_or(Error::DataSizeOverflow { offset })?;

    Ok(DataLayout {
        bitpix,
        element_byte_size,
        element_count,
        raw_size,
    })
}

/// Locate the next block starting with `XTENSION`, probing `from` and every
/// block boundary after it.
///
/// Returns the offset of that block, or the buffer length when none is found.
/// Only entries whose size cannot be derived from keywords use this.
pub fn find_next_xtension(buf: &[u8], from: usize) -> usize {
    let magic = XTENSION_KEYWORD.as_bytes();
    let mut candidate = from;
    while candidate < buf.len() {
        if buf.get(candidate..candidate + magic.len()) == Some(magic) {
            return candidate;
        }
        candidate += BLOCK_SIZE;
    }
    buf.len().max(from)
}

fn known_raw_len(header: &[Param], offset: usize, options: &DecodeOptions) -> Result<usize> {
    let layout = data_layout(header, offset, options)?;
    usize::try_from(layout.raw_size).map_err(|_| Error::NegativeDataSize {
        offset,
        bitpix: layout.bitpix,
        size: layout.raw_size,
    })
}

/// Decode the entry starting at `offset`.
///
/// Returns the entry and the offset at which the next entry starts. At least
/// one full card must remain in `buf` after `offset`.
pub fn decode_entry(
    buf: &[u8],
    offset: usize,
    is_first: bool,
    options: &DecodeOptions,
) -> Result<(Entry, usize)> {
    let available = buf.len().saturating_sub(offset);
    if available < CARD_SIZE {
        return Err(Error::UnexpectedEof {
            offset,
            needed: CARD_SIZE,
            available,
        });
    }

    let scan = scan_header(buf, offset);
    if scan.end == HeaderEnd::Truncated {
        warn!(
            "header at offset {offset} has no END card; {} cards read up to the end of the buffer",
            scan.params.len()
        );
    }

    let kind = resolve_kind(&scan.params, is_first);
    let data_offset = offset + scan.byte_len;

    let raw_len = if kind.is_known() {
        known_raw_len(&scan.params, offset, options)?
    } else {
        let boundary = find_next_xtension(buf, data_offset);
        debug!("unresolved entry at offset {offset}: data runs to {boundary}");
        boundary - data_offset
    };

    let raw_end = data_offset
        .checked_add(raw_len)
        .ok_or(Error::DataSizeOverflow { offset })?;
    if raw_end > buf.len() {
        return Err(Error::UnexpectedEof {
            offset: data_offset,
            needed: raw_len,
            available: buf.len().saturating_sub(data_offset),
        });
    }

    let data = copy_padded(buf, data_offset, padded_byte_len(raw_len));
    let next = data_offset + data.len();
    debug!(
        "entry at offset {offset}: {kind}, header {} bytes, data {} bytes ({raw_len} meaningful)",
        scan.byte_len,
        data.len()
    );

    let entry = Entry {
        kind,
        header: scan.params,
        start_offset: offset,
        header_byte_len: scan.byte_len,
        data,
        raw_data_len: raw_len,
        termination: scan.end,
    };
    Ok((entry, next))
}

/// Iterator over the entries of a buffer, in a single forward pass.
///
/// Yields nothing for a buffer shorter than one block. After the first error
/// the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    buf: &'a [u8],
    offset: usize,
    options: DecodeOptions,
    failed: bool,
}

impl<'a> Segmenter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecodeOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecodeOptions) -> Self {
        Segmenter {
            buf,
            offset: 0,
            options,
            failed: false,
        }
    }

    /// Offset at which the next entry will be decoded.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.buf.len() < BLOCK_SIZE || self.offset >= self.buf.len() {
            return None;
        }
        let remaining = self.buf.len() - self.offset;
        if remaining < CARD_SIZE {
            warn!(
                "ignoring {remaining} trailing bytes at offset {}: shorter than one card",
                self.offset
            );
            self.offset = self.buf.len();
            return None;
        }

        match decode_entry(self.buf, self.offset, self.offset == 0, &self.options) {
            Ok((entry, next)) => {
                self.offset = next;
                Some(Ok(entry))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Segmenter<'_> {}

/// Decode every entry of `buf`, stopping at the first fatal error.
pub fn decode_all(buf: &[u8], options: &DecodeOptions) -> Result<Vec<Entry>> {
    Segmenter::with_options(buf, *options).collect()
}
