//! 32-bit FNV-1a, the hash that places canonical keys into buckets
//!
//! The encoder and the loader must agree on this function bit for bit, since
//! the bucket a key lands in is never stored, only recomputed.

/// FNV-1a 32-bit offset basis
pub(crate) const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime multiplier
pub(crate) const FNV_PRIME: u32 = 16_777_619;

/// Hash a byte string with 32-bit FNV-1a.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Map a hash onto one of `bucket_count` slots.
///
/// Panics if `bucket_count` is zero.
#[inline(always)]
pub(crate) fn slot(hash: u32, bucket_count: usize) -> usize {
    (hash as usize) % bucket_count
}
