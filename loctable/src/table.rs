//! Table loader
//!
//! A [`LocTable`] owns the bytes of one table file and nothing else. Loading
//! reads the file in one go, then records where its three sections start and
//! end; nothing is parsed or copied beyond that. Lookups hash the key, read
//! one bucket record, and compare the stored keys in that bucket one by one.
//!
//! Every view a lookup hands out borrows the table, so no view can outlive
//! the buffer it points into. A malformed table is never trusted: every
//! offset read from the file is bounds-checked, and anything out of range
//! reads as a miss.

use crate::err::Error;
use crate::format::{read_word, SectionReader, MIN_TABLE_LEN, WORD_SIZE};
use crate::hash::{fnv1a, slot};
use std::ops::Range;
use std::path::Path;

/// A loaded localization table for one language
///
/// An empty table, whether from [`LocTable::empty`], a truncated file, or
/// [`LocTable::release`], answers every lookup with `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocTable {
    /// The whole table file
    buffer: Vec<u8>,
    /// Bucket index section: one record offset per slot
    index: Range<usize>,
    /// Bucket list section: the records themselves
    buckets: Range<usize>,
    /// String blob section: key/value pairs
    blob: Range<usize>,
}

impl LocTable {
    /// A table with no buckets and no data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a table file.
    ///
    /// Failing to read the file is an error. A file that reads fine but is
    /// too short or inconsistent to be a table gives an empty table; check
    /// [`Self::is_valid`] if the difference matters.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let buffer = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let table = Self::from_bytes(buffer);
        if !table.is_valid() {
            tracing::warn!(path = %path.display(), "not a usable table, loaded as empty");
        }
        Ok(table)
    }

    /// Take ownership of a table's bytes and locate its sections.
    ///
    /// Gives an empty table if the bytes don't describe one.
    pub fn from_bytes(buffer: Vec<u8>) -> Self {
        match locate_sections(&buffer) {
            Some([index, buckets, blob]) => Self {
                buffer,
                index,
                buckets,
                blob,
            },
            None => Self::empty(),
        }
    }

    /// Check whether this table has at least one bucket to look in.
    pub fn is_valid(&self) -> bool {
        self.bucket_count() > 0
    }

    /// Number of hash buckets.
    pub fn bucket_count(&self) -> usize {
        self.index.len() / WORD_SIZE
    }

    /// The raw table bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Look up the localized value for a canonical key.
    ///
    /// Returns `None` when the key isn't in the table. That's the expected
    /// answer for untranslated or misspelled keys, not an error.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let bucket_count = self.bucket_count();
        if bucket_count == 0 {
            return None;
        }
        let blob = self.blob();
        self.chain(slot(fnv1a(key), bucket_count))?
            .find_map(|offset| value_if_key_matches(blob, offset, key))
    }

    /// Look up a UTF-8 key and return the value if it's UTF-8 as well.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        std::str::from_utf8(self.get(key.as_bytes())?).ok()
    }

    /// Drop the table bytes, leaving an empty table behind.
    pub fn release(&mut self) {
        *self = Self::empty();
    }

    /// Iterate over every `(key, value)` pair in storage order.
    ///
    /// Storage order is the order of the source rows.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            blob: self.blob(),
            pos: 0,
        }
    }

    /// Summarize bucket occupancy.
    ///
    /// Malformed bucket records are skipped.
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            bucket_count: self.bucket_count(),
            entries: 0,
            occupied_buckets: 0,
            longest_chain: 0,
            blob_bytes: self.blob.len(),
        };
        for bucket in 0..stats.bucket_count {
            let Some(len) = self.chain(bucket).map(Iterator::count) else {
                continue;
            };
            stats.entries += len;
            stats.longest_chain = stats.longest_chain.max(len);
            if len > 0 {
                stats.occupied_buckets += 1;
            }
        }
        stats
    }

    /// The bucket index section.
    fn bucket_index(&self) -> &[u8] {
        &self.buffer[self.index.clone()]
    }

    /// The bucket list section.
    fn bucket_list(&self) -> &[u8] {
        &self.buffer[self.buckets.clone()]
    }

    /// The string blob section.
    fn blob(&self) -> &[u8] {
        &self.buffer[self.blob.clone()]
    }

    /// Blob offsets chained in one bucket.
    ///
    /// Returns `None` if the bucket's record doesn't fit in the bucket list.
    fn chain(&self, bucket: usize) -> Option<impl Iterator<Item = usize> + '_> {
        let list = self.bucket_list();
        let record = read_word(self.bucket_index(), bucket.checked_mul(WORD_SIZE)?)?;
        let count = read_word(list, record)?;
        let start = record.checked_add(WORD_SIZE)?;
        let end = count
            .checked_mul(WORD_SIZE)
            .and_then(|len| start.checked_add(len))?;
        let offsets = list.get(start..end)?;
        Some(
            offsets
                .chunks_exact(WORD_SIZE)
                .filter_map(|word| word.try_into().ok().map(usize::from_ne_bytes)),
        )
    }
}

/// Bucket occupancy of a loaded table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TableStats {
    /// Number of hash buckets
    pub bucket_count: usize,
    /// Number of entries across all buckets
    pub entries: usize,
    /// Buckets holding at least one entry
    pub occupied_buckets: usize,
    /// Entries in the fullest bucket
    pub longest_chain: usize,
    /// Size of the string blob in bytes
    pub blob_bytes: usize,
}

/// Iterator over the `(key, value)` pairs of a [`LocTable`]
///
/// Stops at the first entry that isn't properly terminated.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    /// The string blob being walked
    blob: &'a [u8],
    /// Offset of the next entry
    pos: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = entry_at(self.blob, self.pos)?;
        self.pos += key.len() + value.len() + 2;
        Some((key, value))
    }
}

/// Walk the three sections of a table buffer.
///
/// Trailing bytes after the blob are ignored. A table needs a whole number
/// of index words and at least one bucket.
fn locate_sections(buffer: &[u8]) -> Option<[Range<usize>; 3]> {
    if buffer.len() < MIN_TABLE_LEN {
        return None;
    }
    let mut reader = SectionReader::new(buffer);
    let index = reader.section()?;
    let buckets = reader.section()?;
    let blob = reader.section()?;
    if index.is_empty() || index.len() % WORD_SIZE != 0 {
        return None;
    }
    Some([index, buckets, blob])
}

/// Read the value of the entry at `offset` if its stored key is `key`.
///
/// The value's terminator is only searched for once the key has matched.
fn value_if_key_matches<'a>(blob: &'a [u8], offset: usize, key: &[u8]) -> Option<&'a [u8]> {
    let rest = blob.get(offset..)?;
    let key_end = key.len();
    if rest.get(..key_end)? != key || rest.get(key_end) != Some(&0) {
        return None;
    }
    let rest = &rest[key_end + 1..];
    let value_end = rest.iter().position(|&b| b == 0)?;
    Some(&rest[..value_end])
}

/// Read the NUL-terminated key and value starting at `offset` in `blob`.
fn entry_at(blob: &[u8], offset: usize) -> Option<(&[u8], &[u8])> {
    let rest = blob.get(offset..)?;
    let key_end = rest.iter().position(|&b| b == 0)?;
    let (key, rest) = (&rest[..key_end], &rest[key_end + 1..]);
    let value_end = rest.iter().position(|&b| b == 0)?;
    Some((key, &rest[..value_end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_needs_both_terminators() {
        assert_eq!(entry_at(b"k\0v\0", 0), Some((&b"k"[..], &b"v"[..])));
        assert_eq!(entry_at(b"k\0v", 0), None);
        assert_eq!(entry_at(b"k\0v\0", 4), None);
        assert_eq!(entry_at(b"k\0v\0", 9), None);
    }

    #[test]
    fn key_compared_before_value_is_read() {
        let blob = b"ab\0x\0abc\0unterminated";
        assert_eq!(value_if_key_matches(blob, 0, b"ab"), Some(&b"x"[..]));
        assert_eq!(value_if_key_matches(blob, 0, b"a"), None);
        assert_eq!(value_if_key_matches(blob, 0, b"abc"), None);
        assert_eq!(value_if_key_matches(blob, 5, b"ab"), None);
        // A matching key with no value terminator is still a miss.
        assert_eq!(value_if_key_matches(blob, 5, b"abc"), None);
        assert_eq!(value_if_key_matches(blob, 99, b"ab"), None);
        assert_eq!(value_if_key_matches(b"k", 0, b"k"), None);
    }

    #[test]
    fn too_short_for_header() {
        assert!(!LocTable::from_bytes(vec![]).is_valid());
        assert!(!LocTable::from_bytes(vec![0; MIN_TABLE_LEN - 1]).is_valid());
        // Three zero lengths: well formed, but no buckets to look in.
        assert!(!LocTable::from_bytes(vec![0; MIN_TABLE_LEN]).is_valid());
    }
}
