//! Block and card geometry, plus the rounding helpers every size and offset
//! in a FITS buffer goes through.

use alloc::vec;
use alloc::vec::Vec;

/// FITS block size in bytes. Headers and data segments are whole blocks.
pub const BLOCK_SIZE: usize = 2880;

/// FITS card (keyword record) size in bytes.
pub const CARD_SIZE: usize = 80;

/// Number of cards that fit in a single block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Padding byte for data blocks that run past the end of the input.
pub const DATA_PAD_BYTE: u8 = 0x00;

/// Rounds a header or data length up to whole blocks.
///
/// An empty segment stays empty; it does not occupy a block.
pub const fn padded_byte_len(num_bytes: usize) -> usize {
    num_bytes.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Copies `len` bytes of `src` starting at `start` into a new buffer.
///
/// Any part of the requested range that lies beyond the end of `src` is
/// filled with [`DATA_PAD_BYTE`]. Callers are expected to have checked that
/// the meaningful prefix is present; only trailing padding may be missing.
pub fn copy_padded(src: &[u8], start: usize, len: usize) -> Vec<u8> {
    let mut out = vec![DATA_PAD_BYTE; len];
    if start < src.len() {
        let available = (src.len() - start).min(len);
        out[..available].copy_from_slice(&src[start..start + available]);
    }
    out
}
