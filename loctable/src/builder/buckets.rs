//! Entry chains for each hash bucket
//!
//! Every row lands in exactly one bucket, and a bucket may hold any number
//! of rows. Growing one list per bucket an element at a time would be
//! quadratic when many keys share a slot. Instead the chains are built in one
//! counting pass: count rows per bucket, turn the counts into start offsets,
//! then drop each row into the next free position of its bucket. Walking the
//! rows in source order keeps each chain in source order too.
//!
//! All three arrays are carved from the build [`Arena`] and live exactly as
//! long as it does.

use crate::arena::Arena;
use crate::err::ArenaError;
use std::ops::Range;

/// Row numbers grouped by bucket
///
/// Bucket B's valid item range is `starts[B] .. starts[B + 1]`, an index
/// range into `rows`.
pub(crate) struct BucketChains<'a> {
    /// Start of each bucket's run in `rows`, followed by one end marker
    starts: &'a [usize],
    /// Row numbers, grouped by bucket and in source order within a bucket
    rows: &'a [usize],
}

impl<'a> BucketChains<'a> {
    /// Group rows by bucket, given the bucket each row hashed to.
    ///
    /// Panics if any slot is `>= bucket_count`.
    pub(crate) fn build(
        arena: &'a Arena,
        slots: &[usize],
        bucket_count: usize,
    ) -> Result<Self, ArenaError> {
        let starts = arena.allocate_slice_zeroed::<usize>(bucket_count + 1)?;
        for &slot in slots {
            starts[slot + 1] += 1;
        }
        for bucket in 0..bucket_count {
            starts[bucket + 1] += starts[bucket];
        }

        let next = arena.allocate_slice::<usize>(bucket_count)?;
        next.copy_from_slice(&starts[..bucket_count]);
        let rows = arena.allocate_slice::<usize>(slots.len())?;
        for (row, &slot) in slots.iter().enumerate() {
            rows[next[slot]] = row;
            next[slot] += 1;
        }

        Ok(Self { starts, rows })
    }

    /// Number of buckets, empty ones included.
    pub(crate) fn bucket_count(&self) -> usize {
        self.starts.len() - 1
    }

    /// Look up the valid item range for a particular bucket.
    ///
    /// Panics if the bucket index is out of range.
    #[inline(always)]
    pub(crate) fn item_range(&self, bucket: usize) -> Range<usize> {
        self.starts[bucket]..self.starts[bucket + 1]
    }

    /// Rows chained in one bucket, in source order.
    ///
    /// Panics if the bucket index is out of range.
    #[inline(always)]
    pub(crate) fn items(&self, bucket: usize) -> &'a [usize] {
        &self.rows[self.item_range(bucket)]
    }

    /// Length of the longest chain.
    pub(crate) fn longest(&self) -> usize {
        (0..self.bucket_count())
            .map(|bucket| self.item_range(bucket).len())
            .max()
            .unwrap_or(0)
    }
}
