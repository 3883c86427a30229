//! On-disk layout of one table
//!
//! ```text
//! [word]  bucket index length in bytes
//! [..]    bucket index: one word per slot, offset of that slot's record
//!         relative to the start of the bucket list
//! [word]  bucket list length in bytes
//! [..]    bucket records: [word count][count words: blob offsets]
//! [word]  string blob length in bytes
//! [..]    string blob: (key NUL, value NUL) pairs
//! ```
//!
//! Every word is a native-width unsigned integer in host byte order. A
//! table is only portable between hosts that agree on both.

use std::ops::Range;

/// Size in bytes of one length, offset, or count field
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Shortest possible table: the three section length fields
pub(crate) const MIN_TABLE_LEN: usize = 3 * WORD_SIZE;

/// Byte size of one bucket record holding `count` entries
#[inline(always)]
pub(crate) fn record_len(count: usize) -> usize {
    WORD_SIZE * (1 + count)
}

/// Read the word starting at byte `at`, if it's entirely in bounds.
#[inline]
pub(crate) fn read_word(bytes: &[u8], at: usize) -> Option<usize> {
    let end = at.checked_add(WORD_SIZE)?;
    let field = bytes.get(at..end)?;
    Some(usize::from_ne_bytes(field.try_into().ok()?))
}

/// Sequential writer filling a preallocated table buffer
pub(crate) struct TableWriter<'a> {
    /// Destination buffer, sized exactly for the table
    out: &'a mut [u8],
    /// Next byte to write
    pos: usize,
}

impl<'a> TableWriter<'a> {
    /// Start writing at the beginning of `out`.
    pub(crate) fn new(out: &'a mut [u8]) -> Self {
        Self { out, pos: 0 }
    }

    /// Append one word.
    ///
    /// Panics if the buffer is too short, which means the caller sized it
    /// wrong.
    #[inline]
    pub(crate) fn word(&mut self, value: usize) {
        self.bytes(&value.to_ne_bytes());
    }

    /// Append raw bytes.
    #[inline]
    pub(crate) fn bytes(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        self.out[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }

    /// Number of bytes written so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential reader that splits a table buffer into its sections
pub(crate) struct SectionReader<'a> {
    /// Whole table buffer
    bytes: &'a [u8],
    /// Next byte to read
    pos: usize,
}

impl<'a> SectionReader<'a> {
    /// Start reading at the beginning of `bytes`.
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read a length word and return the byte range of the section after it.
    ///
    /// Returns `None` if either the length field or the section it
    /// describes runs past the end of the buffer.
    pub(crate) fn section(&mut self) -> Option<Range<usize>> {
        let len = read_word(self.bytes, self.pos)?;
        let start = self.pos + WORD_SIZE;
        let end = start.checked_add(len)?;
        if end > self.bytes.len() {
            return None;
        }
        self.pos = end;
        Some(start..end)
    }
}
