//! Bump allocator over a single reserved block of address space
//!
//! Building a table needs many scratch structures whose final size is only
//! known part way through the build: the source text, per-language string
//! blobs, per-row bucket assignments, and the serialized output. Rather than
//! allocate each from the heap, a build run reserves one large anonymous
//! mapping up front and carves every structure out of it with a forward-only
//! cursor. Nothing is freed individually; dropping the [`Arena`] releases the
//! whole reservation at once.
//!
//! The reservation is address space, not memory. Pages are committed lazily
//! as the cursor crosses into them, a whole page at a time. Growing past the
//! reservation is not supported: the request fails with
//! [`ArenaError::Exhausted`] and the caller decides whether to abort.
//!
//! Allocation takes `&self` and hands back `&mut [u8]` regions that borrow
//! the arena. That lets a caller hold many live regions at once (for example
//! the source text and every output blob) while the borrow checker still
//! guarantees that no region outlives the mapping. Regions never overlap,
//! because the cursor only moves forward and padding is never reused.
//!
//! The cursor lives in a [`Cell`], so an [`Arena`] is not [`Sync`]. Parallel
//! builds need one arena per worker.

use crate::err::ArenaError;
use memmap2::MmapMut;
use std::cell::Cell;
use std::ptr::NonNull;
use std::sync::Arc;

/// Alignment of every region returned by an [`Arena`], in bytes
pub const ARENA_ALIGNMENT: usize = 16;

/// Default reservation for one table build, 1 GiB of address space
pub const DEFAULT_ARENA_RESERVE: usize = 1 << 30;

/// Page size to assume when the platform can't tell us
const FALLBACK_PAGE_SIZE: usize = 4096;

/// Round `value` up to a multiple of `align`, or `None` on overflow.
///
/// `align` must be a power of two.
#[inline(always)]
fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Ask the platform for its virtual memory page size.
fn system_page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions and only reads system state.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if let Ok(size) = usize::try_from(size) {
            if size.is_power_of_two() {
                return size;
            }
        }
    }
    FALLBACK_PAGE_SIZE
}

/// A reserved region of address space with a monotonic allocation cursor
#[derive(Debug)]
pub struct Arena {
    /// Anonymous mapping that owns the whole reservation
    ///
    /// Only touched again to commit pages and, on drop, to unmap.
    #[cfg_attr(not(unix), allow(dead_code))]
    map: MmapMut,
    /// Start of the mapping
    ///
    /// Captured once at construction so that handing out a region never
    /// needs a reference to the whole mapping, which would alias regions
    /// that are already borrowed.
    base: NonNull<u8>,
    /// Size of the reservation in bytes, a whole number of pages
    reserved: usize,
    /// Platform page size, the unit of commit
    page_size: usize,
    /// Offset of the first byte not yet handed out
    pos: Cell<usize>,
    /// Offset of the first byte that hasn't been committed
    committed: Cell<usize>,
}

// SAFETY: All regions handed out borrow the arena, so none can be alive while
//         the arena itself is moved to another thread. The raw `base` pointer
//         refers to memory owned by `map`, which moves along with it.
unsafe impl Send for Arena {}

impl Arena {
    /// Reserve `reserve` bytes of address space, rounded up to whole pages.
    ///
    /// Only the first page is committed up front. A reservation of zero
    /// still reserves one page.
    pub fn new(reserve: usize) -> Result<Self, ArenaError> {
        let page_size = system_page_size();
        let reserved = align_up(reserve.max(1), page_size).ok_or_else(|| ArenaError::Reserve {
            size: reserve,
            source: Arc::new(std::io::ErrorKind::OutOfMemory.into()),
        })?;
        let mut map = MmapMut::map_anon(reserved).map_err(|e| ArenaError::Reserve {
            size: reserved,
            source: Arc::new(e),
        })?;
        let base = NonNull::from(&mut map[..]).cast::<u8>();
        tracing::trace!(reserved, page_size, "reserved arena");
        Ok(Self {
            map,
            base,
            reserved,
            page_size,
            pos: Cell::new(0),
            committed: Cell::new(page_size.min(reserved)),
        })
    }

    /// Size of the reservation in bytes.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Bytes committed so far, always a whole number of pages.
    pub fn committed(&self) -> usize {
        self.committed.get()
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.pos.get()
    }

    /// Page size this arena commits in.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Carve out a new region of exactly `size` bytes.
    ///
    /// The region is aligned to [`ARENA_ALIGNMENT`]. Its contents are
    /// unspecified; use [`Self::allocate_zeroed`] when they matter.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        let (_, start) = self.carve(size)?;
        // SAFETY: `carve` reserved `start .. start + size` for us alone.
        Ok(unsafe { self.region(start, size) })
    }

    /// Carve out a new region of exactly `size` bytes, filled with zeroes.
    ///
    /// The alignment padding in front of the region is zeroed as well.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_zeroed(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        let (padded_start, start) = self.carve(size)?;
        let padding = start - padded_start;
        // SAFETY: `carve` reserved `padded_start .. start + size` for us alone,
        //         and the padding in front of `start` is never handed out.
        let padded = unsafe { self.region(padded_start, padding + size) };
        padded.fill(0);
        Ok(&mut padded[padding..])
    }

    /// Carve out an array of `len` plain-old-data items.
    ///
    /// Contents are unspecified. Panics if `T` needs more than
    /// [`ARENA_ALIGNMENT`] alignment.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_slice<T: bytemuck::Pod>(&self, len: usize) -> Result<&mut [T], ArenaError> {
        let bytes = self.slice_bytes::<T>(len)?;
        Ok(bytemuck::cast_slice_mut(self.allocate(bytes)?))
    }

    /// Carve out an array of `len` plain-old-data items, all zero.
    ///
    /// Panics if `T` needs more than [`ARENA_ALIGNMENT`] alignment.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_slice_zeroed<T: bytemuck::Pod>(
        &self,
        len: usize,
    ) -> Result<&mut [T], ArenaError> {
        let bytes = self.slice_bytes::<T>(len)?;
        Ok(bytemuck::cast_slice_mut(self.allocate_zeroed(bytes)?))
    }

    /// Byte size of an array of `len` items of type `T`.
    fn slice_bytes<T>(&self, len: usize) -> Result<usize, ArenaError> {
        assert!(std::mem::align_of::<T>() <= ARENA_ALIGNMENT);
        len.checked_mul(std::mem::size_of::<T>())
            .ok_or(ArenaError::Exhausted {
                requested: usize::MAX,
                used: self.used(),
                reserved: self.reserved,
            })
    }

    /// Advance the cursor past `size` aligned bytes.
    ///
    /// Returns the cursor position before alignment and the aligned start
    /// of the new region. On failure the cursor doesn't move.
    fn carve(&self, size: usize) -> Result<(usize, usize), ArenaError> {
        let pos = self.pos.get();
        let exhausted = || ArenaError::Exhausted {
            requested: size,
            used: pos,
            reserved: self.reserved,
        };
        let start = align_up(pos, ARENA_ALIGNMENT).ok_or_else(exhausted)?;
        let end = start.checked_add(size).ok_or_else(exhausted)?;
        if end > self.reserved {
            return Err(exhausted());
        }
        if end > self.committed.get() {
            self.commit_to(end)?;
        }
        self.pos.set(end);
        Ok((pos, start))
    }

    /// Commit whole pages until at least `end` bytes are committed.
    fn commit_to(&self, end: usize) -> Result<(), ArenaError> {
        let committed = self.committed.get();
        let target = align_up(end, self.page_size)
            .unwrap_or(self.reserved)
            .min(self.reserved);
        #[cfg(unix)]
        self.map
            .advise_range(memmap2::Advice::WillNeed, committed, target - committed)
            .map_err(|e| ArenaError::Commit(Arc::new(e)))?;
        tracing::trace!(from = committed, to = target, "committed arena pages");
        self.committed.set(target);
        Ok(())
    }

    /// Borrow `len` bytes at `offset` as a new mutable slice.
    ///
    /// # Safety
    ///
    /// The range must lie inside the reservation and must not overlap any
    /// range that was handed out before. [`Self::carve`] guarantees both,
    /// since it only moves forward.
    #[allow(clippy::mut_from_ref)]
    unsafe fn region(&self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset + len <= self.reserved);
        // SAFETY: The caller promises the range is in bounds and exclusively
        //         ours. The mapping stays alive as long as `&self` does.
        unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(offset), len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 16), Some(0));
        assert_eq!(align_up(1, 16), Some(16));
        assert_eq!(align_up(16, 16), Some(16));
        assert_eq!(align_up(17, 16), Some(32));
        assert_eq!(align_up(usize::MAX, 16), None);
    }

    #[test]
    fn page_size_is_power_of_two() {
        assert!(system_page_size().is_power_of_two());
    }
}
