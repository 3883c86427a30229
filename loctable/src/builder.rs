//! Table encoder
//!
//! A build reads the source text twice. The first pass only counts: how many
//! rows there are, and exactly how many blob bytes each language will need.
//! The row count fixes the bucket count, which has to be known before any
//! key can be placed. The second pass hashes each canonical key, copies the
//! unescaped key and value into every language's blob, and records where each
//! entry starts. The bucket chains are then grouped by counting and every
//! language's table is serialized.
//!
//! Bucket assignment depends only on the canonical key, so it's shared by all
//! languages. Blob offsets are not: each language has its own blob.
//!
//! Everything, the output tables included, is carved from a single
//! [`Arena`].

mod buckets;

use crate::arena::{Arena, DEFAULT_ARENA_RESERVE};
use crate::err::Error;
use crate::format::{record_len, TableWriter, MIN_TABLE_LEN, WORD_SIZE};
use crate::hash::{fnv1a, slot};
use crate::source::{unescape_into, unescaped_len, SourceReader};
use crate::MAX_LANGUAGES;
use arrayvec::ArrayVec;
use buckets::BucketChains;

/// Default ratio of buckets to rows
///
/// Keeping buckets sparse makes nearly every lookup a single comparison.
pub const DEFAULT_BUCKET_MULTIPLIER: usize = 8;

/// Builder for encoding source text into localization tables
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableBuilder {
    /// Buckets per row when the bucket count is derived
    bucket_multiplier: usize,
    /// Lower bound for a derived bucket count
    min_buckets: usize,
    /// Explicit bucket count, overriding the derived one
    bucket_count: Option<usize>,
    /// Bytes of address space reserved by [`Self::encode`]
    arena_reserve: usize,
}

impl TableBuilder {
    /// Create a new [`TableBuilder`] with default settings.
    pub fn new() -> Self {
        Self {
            bucket_multiplier: DEFAULT_BUCKET_MULTIPLIER,
            min_buckets: 1,
            bucket_count: None,
            arena_reserve: DEFAULT_ARENA_RESERVE,
        }
    }

    /// Set how many buckets to allocate per row. Zero is treated as one.
    pub fn bucket_multiplier(&mut self, multiplier: usize) -> &mut Self {
        self.bucket_multiplier = multiplier.max(1);
        self
    }

    /// Set a lower bound for the derived bucket count.
    pub fn min_buckets(&mut self, min_buckets: usize) -> &mut Self {
        self.min_buckets = min_buckets;
        self
    }

    /// Use a fixed bucket count instead of deriving one from the row count.
    ///
    /// The count is rounded up to a power of two. `None` restores the
    /// derived count.
    pub fn bucket_count(&mut self, bucket_count: Option<usize>) -> &mut Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Set the arena reservation used by [`Self::encode`] and
    /// [`crate::generate`].
    pub fn arena_reserve(&mut self, bytes: usize) -> &mut Self {
        self.arena_reserve = bytes;
        self
    }

    /// Arena reservation, in bytes, for a build run by this builder.
    pub fn reserve(&self) -> usize {
        self.arena_reserve
    }

    /// Bucket count these settings choose for `rows` rows.
    ///
    /// Always a power of two, and never zero.
    pub fn buckets_for_rows(&self, rows: usize) -> usize {
        let wanted = match self.bucket_count {
            Some(count) => count,
            None => rows
                .saturating_mul(self.bucket_multiplier)
                .max(self.min_buckets),
        };
        wanted
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(1 << (usize::BITS - 1))
    }

    /// Encode `source` into one table per language, inside `arena`.
    ///
    /// `language_count` is the number of columns per row, the canonical key
    /// column included. The returned tables borrow the arena.
    pub fn build<'a>(
        &self,
        arena: &'a Arena,
        source: &[u8],
        language_count: usize,
    ) -> Result<EncodedTables<'a>, Error> {
        check_language_count(language_count)?;
        let census = Census::take(source, language_count);
        let row_count = census.rows;
        let bucket_count = self.buckets_for_rows(row_count);
        tracing::debug!(
            rows = row_count,
            bucket_count,
            languages = language_count,
            "counted source rows"
        );

        // Second pass: place keys and fill the blobs.
        let slots = arena.allocate_slice::<usize>(row_count)?;
        let offsets = arena.allocate_slice::<usize>(row_count.saturating_mul(language_count))?;
        let mut blobs = ArrayVec::<&mut [u8], MAX_LANGUAGES>::new();
        for &size in &census.blob_sizes {
            blobs.push(arena.allocate(size)?);
        }
        let mut filled = ArrayVec::<usize, MAX_LANGUAGES>::new();
        filled.extend(std::iter::repeat(0).take(language_count));

        let mut reader = SourceReader::new(source);
        for (row_index, row_slot) in slots.iter_mut().enumerate() {
            let Some(row) = reader.next_row(language_count) else {
                break;
            };
            // The hash covers the key exactly as scanned, still escaped.
            *row_slot = slot(fnv1a(row[0]), bucket_count);
            for (language, (blob, used)) in blobs.iter_mut().zip(filled.iter_mut()).enumerate() {
                offsets[language * row_count + row_index] = *used;
                *used = append_terminated(blob, *used, row[0]);
                *used = append_terminated(blob, *used, row[language]);
            }
        }

        let chains = BucketChains::build(arena, slots, bucket_count)?;
        tracing::debug!(longest_chain = chains.longest(), "grouped bucket chains");

        let mut tables = ArrayVec::new();
        for (language, blob) in blobs.into_iter().enumerate() {
            let blob: &[u8] = blob;
            let offsets = &offsets[language * row_count..(language + 1) * row_count];
            let table = serialize(arena, &chains, offsets, blob)?;
            tracing::debug!(language, bytes = table.len(), "encoded table");
            tables.push(table);
        }

        Ok(EncodedTables {
            tables,
            row_count,
            bucket_count,
        })
    }

    /// Encode `source` into one owned table per language.
    ///
    /// Reserves a private arena of the configured size for the duration of
    /// the build.
    pub fn encode(&self, source: &[u8], language_count: usize) -> Result<Vec<Vec<u8>>, Error> {
        check_language_count(language_count)?;
        let arena = Arena::new(self.arena_reserve)?;
        let tables = self.build(&arena, source, language_count)?;
        Ok(tables.iter().map(<[u8]>::to_vec).collect())
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tables produced by one [`TableBuilder::build`], one per language column
#[derive(Debug, Clone)]
pub struct EncodedTables<'a> {
    /// Serialized tables, indexed by language column
    tables: ArrayVec<&'a [u8], MAX_LANGUAGES>,
    /// Number of rows encoded
    row_count: usize,
    /// Number of buckets in every table
    bucket_count: usize,
}

impl<'a> EncodedTables<'a> {
    /// Number of source rows encoded into each table.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of buckets in each table.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Number of tables, one per language column.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if no tables were produced.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Serialized table for one language column.
    pub fn table(&self, language: usize) -> Option<&'a [u8]> {
        self.tables.get(language).copied()
    }

    /// Iterate over the serialized tables in language column order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.tables.iter().copied()
    }
}

/// Results of the counting pass over the source text
struct Census {
    /// Rows before the end of data
    rows: usize,
    /// Exact blob size each language column will need
    blob_sizes: ArrayVec<usize, MAX_LANGUAGES>,
}

impl Census {
    /// Count rows and blob bytes without copying anything.
    fn take(source: &[u8], language_count: usize) -> Self {
        let mut blob_sizes: ArrayVec<usize, MAX_LANGUAGES> =
            std::iter::repeat(0).take(language_count).collect();
        let mut rows = 0;
        let mut reader = SourceReader::new(source);
        while let Some(row) = reader.next_row(language_count) {
            let key_len = unescaped_len(row[0]) + 1;
            for (size, value) in blob_sizes.iter_mut().zip(&row) {
                *size += key_len + unescaped_len(value) + 1;
            }
            rows += 1;
        }
        Self { rows, blob_sizes }
    }
}

/// Reject language counts a build can't handle.
pub(crate) fn check_language_count(language_count: usize) -> Result<(), Error> {
    match language_count {
        0 => Err(Error::NoLanguages),
        n if n > MAX_LANGUAGES => Err(Error::TooManyLanguages {
            requested: n,
            max: MAX_LANGUAGES,
        }),
        _ => Ok(()),
    }
}

/// Unescape `value` into `blob` at `at`, then NUL-terminate it.
///
/// Returns the offset just past the terminator.
fn append_terminated(blob: &mut [u8], at: usize, value: &[u8]) -> usize {
    let end = at + unescape_into(&mut blob[at..], value);
    blob[end] = 0;
    end + 1
}

/// Write one language's table into a fresh arena region.
///
/// `offsets[row]` is where that row's entry starts in `blob`.
fn serialize<'a>(
    arena: &'a Arena,
    chains: &BucketChains<'_>,
    offsets: &[usize],
    blob: &[u8],
) -> Result<&'a [u8], Error> {
    let bucket_count = chains.bucket_count();
    let index_len = bucket_count * WORD_SIZE;
    let list_len = (bucket_count + offsets.len()) * WORD_SIZE;
    let total = MIN_TABLE_LEN + index_len + list_len + blob.len();
    let out = arena.allocate(total)?;

    let mut writer = TableWriter::new(&mut *out);
    writer.word(index_len);
    let mut record = 0;
    for bucket in 0..bucket_count {
        writer.word(record);
        record += record_len(chains.item_range(bucket).len());
    }
    writer.word(list_len);
    for bucket in 0..bucket_count {
        let items = chains.items(bucket);
        writer.word(items.len());
        for &row in items {
            writer.word(offsets[row]);
        }
    }
    writer.word(blob.len());
    writer.bytes(blob);
    debug_assert_eq!(writer.position(), total);

    Ok(out)
}
