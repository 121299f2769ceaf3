use alloc::vec::Vec;
use core::fmt;

use crate::header::{HeaderEnd, Param};
use crate::value::FromValue;

/// The kind of a decoded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// The first entry in the buffer.
    Primary,
    /// `XTENSION = 'IMAGE'`.
    ImageExtension,
    /// `XTENSION = 'TABLE'`.
    AsciiTableExtension,
    /// `XTENSION = 'BINTABLE'`.
    BinaryTableExtension,
    /// An extension with a missing, non-string, or unrecognized `XTENSION`.
    Unresolved,
}

impl EntryKind {
    /// Map an `XTENSION` value to an extension kind.
    pub fn from_xtension(xtension: &str) -> Self {
        match xtension {
            "IMAGE" => EntryKind::ImageExtension,
            "TABLE" => EntryKind::AsciiTableExtension,
            "BINTABLE" => EntryKind::BinaryTableExtension,
            _ => EntryKind::Unresolved,
        }
    }

    /// Returns `true` if the data size of this kind is derived from
    /// `BITPIX`/`NAXIS` keywords.
    pub fn is_known(&self) -> bool {
        !matches!(self, EntryKind::Unresolved)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Primary => "Primary",
            EntryKind::ImageExtension => "ImageExtension",
            EntryKind::AsciiTableExtension => "AsciiTableExtension",
            EntryKind::BinaryTableExtension => "BinaryTableExtension",
            EntryKind::Unresolved => "Unresolved",
        };
        f.write_str(name)
    }
}

/// One Primary record or extension: its header cards and data segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub kind: EntryKind,
    /// Header records in card order. Duplicate names are kept.
    pub header: Vec<Param>,
    /// Byte offset of the first header card.
    pub start_offset: usize,
    /// Header length in bytes, a multiple of the block size.
    pub header_byte_len: usize,
    /// Data segment, padded to a multiple of the block size.
    pub data: Vec<u8>,
    /// Length of the meaningful (unpadded) prefix of `data`.
    pub raw_data_len: usize,
    /// Whether the header ended with an `END` card.
    pub termination: HeaderEnd,
}

impl Entry {
    /// Byte offset where the data segment begins.
    pub fn data_offset(&self) -> usize {
        self.start_offset + self.header_byte_len
    }

    /// Byte offset just past this entry, where the next one begins.
    pub fn end_offset(&self) -> usize {
        self.data_offset() + self.data.len()
    }

    /// The meaningful bytes of the data segment, without block padding.
    pub fn raw_data(&self) -> &[u8] {
        &self.data[..self.raw_data_len]
    }

    /// First header record named `name`.
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.header.iter().find(|p| p.name == name)
    }

    /// All header records named `name`, in card order.
    pub fn params_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Param> + 'a {
        self.header.iter().filter(move |p| p.name == name)
    }

    /// Returns `true` if any header record is named `name`.
    pub fn param_exists(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Value of the first record named `name`, converted to `T`.
    ///
    /// Only the first match is considered: if it has no value, or a value of
    /// another type, the result is `None` even when a later duplicate would
    /// convert.
    pub fn param_value<T: FromValue>(&self, name: &str) -> Option<T> {
        self.param(name)?.value.as_ref().and_then(T::from_value)
    }
}
