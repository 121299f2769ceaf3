//! Image sample decoding for Primary and IMAGE entries.
//!
//! FITS stores samples big-endian. The raw bytes are collected into an
//! aligned typed buffer and then swapped to native order in place.

use alloc::format;
use alloc::vec::Vec;

use bytemuck::pod_collect_to_vec;

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};

/// Image samples extracted from an entry, typed by BITPIX.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ImageData {
    pub fn len(&self) -> usize {
        match self {
            ImageData::U8(v) => v.len(),
            ImageData::I16(v) => v.len(),
            ImageData::I32(v) => v.len(),
            ImageData::I64(v) => v.len(),
            ImageData::F32(v) => v.len(),
            ImageData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            ImageData::U8(v) => v.get(index).map(|&x| x as f64),
            ImageData::I16(v) => v.get(index).map(|&x| x as f64),
            ImageData::I32(v) => v.get(index).map(|&x| x as f64),
            ImageData::I64(v) => v.get(index).map(|&x| x as f64),
            ImageData::F32(v) => v.get(index).map(|&x| x as f64),
            ImageData::F64(v) => v.get(index).copied(),
        }
    }

    /// All samples widened to `f64`, in storage order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get_f64(i)).collect()
    }
}

fn ensure_image(entry: &Entry) -> Result<()> {
    match entry.kind {
        EntryKind::Primary | EntryKind::ImageExtension => Ok(()),
        _ => Err(Error::NotAnImage),
    }
}

fn image_keyword(entry: &Entry, keyword: &str) -> Result<i64> {
    let param = entry.param(keyword).ok_or_else(|| Error::MissingKeyword {
        keyword: keyword.into(),
        offset: entry.start_offset,
    })?;
    param
        .value
        .as_ref()
        .and_then(|v| v.as_integer())
        .ok_or_else(|| Error::InvalidKeywordValue {
            keyword: keyword.into(),
            offset: entry.start_offset,
        })
}

fn axis_len(entry: &Entry, keyword: &str) -> Result<usize> {
    usize::try_from(image_keyword(entry, keyword)?).map_err(|_| Error::InvalidKeywordValue {
        keyword: keyword.into(),
        offset: entry.start_offset,
    })
}

/// Returns the axis lengths `NAXIS1..NAXISn` of an image entry.
pub fn image_dimensions(entry: &Entry) -> Result<Vec<usize>> {
    ensure_image(entry)?;
    let naxis = axis_len(entry, "NAXIS")?;
    (1..=naxis)
        .map(|i| axis_len(entry, &format!("NAXIS{i}")))
        .collect()
}

/// Number of bytes per sample for a BITPIX value.
pub fn bytes_per_sample(bitpix: i64) -> Result<usize> {
    match bitpix {
        8 => Ok(1),
        16 => Ok(2),
        32 | -32 => Ok(4),
        64 | -64 => Ok(8),
        other => Err(Error::InvalidBitpix(other)),
    }
}

/// Decode the samples of a Primary or IMAGE entry.
///
/// Only the meaningful prefix of the data segment is decoded; block padding
/// is skipped.
pub fn read_image_data(entry: &Entry) -> Result<ImageData> {
    ensure_image(entry)?;
    let bitpix = image_keyword(entry, "BITPIX")?;
    let bpp = bytes_per_sample(bitpix)?;
    let dims = image_dimensions(entry)?;
    let count: usize = if dims.is_empty() {
        0
    } else {
        dims.iter().product()
    };

    let needed = count * bpp;
    let raw = entry.raw_data();
    if raw.len() < needed {
        return Err(Error::UnexpectedEof {
            offset: entry.data_offset(),
            needed,
            available: raw.len(),
        });
    }
    let raw = &raw[..needed];

    match bitpix {
        8 => Ok(ImageData::U8(raw.to_vec())),
        16 => {
            let mut samples: Vec<i16> = pod_collect_to_vec(raw);
            for v in &mut samples {
                *v = i16::from_be(*v);
            }
            Ok(ImageData::I16(samples))
        }
        32 => {
            let mut samples: Vec<i32> = pod_collect_to_vec(raw);
            for v in &mut samples {
                *v = i32::from_be(*v);
            }
            Ok(ImageData::I32(samples))
        }
        64 => {
            let mut samples: Vec<i64> = pod_collect_to_vec(raw);
            for v in &mut samples {
                *v = i64::from_be(*v);
            }
            Ok(ImageData::I64(samples))
        }
        -32 => {
            let mut samples: Vec<f32> = pod_collect_to_vec(raw);
            for v in &mut samples {
                *v = f32::from_bits(u32::from_be(v.to_bits()));
            }
            Ok(ImageData::F32(samples))
        }
        -64 => {
            let mut samples: Vec<f64> = pod_collect_to_vec(raw);
            for v in &mut samples {
                *v = f64::from_bits(u64::from_be(v.to_bits()));
            }
            Ok(ImageData::F64(samples))
        }
        other => Err(Error::InvalidBitpix(other)),
    }
}

/// Decode an image entry into an `f64` array shaped `[NAXISn, .., NAXIS1]`,
/// so the last axis is the fastest-varying one.
#[cfg(feature = "array")]
pub fn read_image_array(entry: &Entry) -> Result<ndarray::ArrayD<f64>> {
    use alloc::string::ToString;

    let samples = read_image_data(entry)?.to_f64_vec();
    let mut shape = image_dimensions(entry)?;
    if shape.is_empty() {
        shape.push(0);
    }
    shape.reverse();
    ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&shape), samples)
        .map_err(|e| Error::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_SIZE;
    use crate::header::{parse_card_text, HeaderEnd};
    use alloc::vec;

    fn image_entry(kind: EntryKind, cards: &[&str], raw: &[u8]) -> Entry {
        let mut data = raw.to_vec();
        data.resize(BLOCK_SIZE, 0);
        Entry {
            kind,
            header: cards.iter().map(|c| parse_card_text(c)).collect(),
            start_offset: 0,
            header_byte_len: BLOCK_SIZE,
            data,
            raw_data_len: raw.len(),
            termination: HeaderEnd::Terminated,
        }
    }

    #[test]
    fn dimensions_of_2d_image() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = 8", "NAXIS   = 2", "NAXIS1  = 3", "NAXIS2  = 2"],
            &[0; 6],
        );
        assert_eq!(image_dimensions(&e).unwrap(), vec![3, 2]);
    }

    #[test]
    fn u8_samples() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = 8", "NAXIS   = 2", "NAXIS1  = 2", "NAXIS2  = 2"],
            &[1, 2, 3, 4],
        );
        assert_eq!(read_image_data(&e).unwrap(), ImageData::U8(vec![1, 2, 3, 4]));
    }

    #[test]
    fn i16_samples_are_big_endian() {
        let e = image_entry(
            EntryKind::ImageExtension,
            &["BITPIX  = 16", "NAXIS   = 1", "NAXIS1  = 3"],
            &[0x01, 0x02, 0xFF, 0xFE, 0x00, 0x10],
        );
        assert_eq!(
            read_image_data(&e).unwrap(),
            ImageData::I16(vec![0x0102, -2, 16])
        );
    }

    #[test]
    fn i32_samples() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = 32", "NAXIS   = 1", "NAXIS1  = 1"],
            &[0x00, 0x01, 0x00, 0x00],
        );
        assert_eq!(read_image_data(&e).unwrap(), ImageData::I32(vec![65536]));
    }

    #[test]
    fn f32_samples() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = -32", "NAXIS   = 1", "NAXIS1  = 2"],
            &[
                0x3F, 0x80, 0x00, 0x00, // 1.0
                0xC0, 0x00, 0x00, 0x00, // -2.0
            ],
        );
        let data = read_image_data(&e).unwrap();
        assert_eq!(data, ImageData::F32(vec![1.0, -2.0]));
        assert_eq!(data.get_f64(1), Some(-2.0));
    }

    #[test]
    fn f64_samples() {
        let bytes = 0.5f64.to_be_bytes();
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = -64", "NAXIS   = 1", "NAXIS1  = 1"],
            &bytes,
        );
        assert_eq!(read_image_data(&e).unwrap(), ImageData::F64(vec![0.5]));
    }

    #[test]
    fn zero_axes_is_empty() {
        let e = image_entry(EntryKind::Primary, &["BITPIX  = 16", "NAXIS   = 0"], &[]);
        let data = read_image_data(&e).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn table_is_not_an_image() {
        let e = image_entry(
            EntryKind::BinaryTableExtension,
            &["BITPIX  = 8", "NAXIS   = 0"],
            &[],
        );
        assert_eq!(read_image_data(&e).unwrap_err(), Error::NotAnImage);
    }

    #[test]
    fn unsupported_bitpix() {
        let e = image_entry(EntryKind::Primary, &["BITPIX  = 12", "NAXIS   = 0"], &[]);
        assert_eq!(read_image_data(&e).unwrap_err(), Error::InvalidBitpix(12));
    }

    #[test]
    fn short_raw_data() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = 16", "NAXIS   = 1", "NAXIS1  = 4"],
            &[0, 1],
        );
        assert!(matches!(
            read_image_data(&e).unwrap_err(),
            Error::UnexpectedEof { needed: 8, available: 2, .. }
        ));
    }

    #[cfg(feature = "array")]
    #[test]
    fn array_is_row_major() {
        let e = image_entry(
            EntryKind::Primary,
            &["BITPIX  = 8", "NAXIS   = 2", "NAXIS1  = 3", "NAXIS2  = 2"],
            &[1, 2, 3, 4, 5, 6],
        );
        let arr = read_image_array(&e).unwrap();
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 0]], 4.0);
        assert_eq!(arr[[0, 2]], 3.0);
    }
}
