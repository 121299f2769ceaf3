use alloc::vec::Vec;

use log::debug;

use crate::block::BLOCK_SIZE;
use crate::entry::{Entry, EntryKind};
use crate::error::Result;
use crate::options::DecodeOptions;
use crate::segment::decode_all;

/// All entries decoded from one FITS buffer, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitsDataModel {
    entries: Vec<Entry>,
}

impl FitsDataModel {
    /// Decode `buf` with default options.
    ///
    /// A buffer shorter than one block decodes to an empty model.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &DecodeOptions::default())
    }

    /// Decode `buf` with explicit options.
    pub fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Self> {
        if buf.len() < BLOCK_SIZE {
            debug!("buffer of {} bytes is shorter than one block", buf.len());
            return Ok(Self::default());
        }
        let entries = decode_all(buf, options)?;
        Ok(FitsDataModel { entries })
    }

    /// First entry of the given kind.
    pub fn find_by_kind(&self, kind: EntryKind) -> Option<&Entry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// The Primary entry, if any.
    pub fn primary(&self) -> Option<&Entry> {
        self.find_by_kind(EntryKind::Primary)
    }

    /// Returns the entry at the given index, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a FitsDataModel {
    type Item = &'a Entry;
    type IntoIter = core::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
