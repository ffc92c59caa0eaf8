use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::ptr::NonNull;

use crate::allocator::{dangling, Allocator, DefaultAllocator};
use crate::error::AllocError;

/// Alignment of the region an arena acquires from its parent.
pub const ARENA_ALIGN: usize = 16;

/// Bump allocator over a single region acquired from a parent allocator.
///
/// Allocation advances a cursor through the region and fails once the
/// region is used up; the arena never grows. Individual deallocation is a
/// no-op. The whole region goes back to the parent in one call when the
/// arena is dropped, and since every container borrows the arena for its
/// whole lifetime, nothing allocated from it can still be alive by then.
pub struct ArenaAllocator<'p, P: Allocator = DefaultAllocator> {
    base: NonNull<u8>,
    region: Layout,
    cursor: Cell<usize>,
    parent: &'p P,
}

impl<'p, P: Allocator> ArenaAllocator<'p, P> {
    /// Acquires a region of `capacity` bytes from `parent`.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::CapacityOverflow` if `capacity` is not a valid
    /// allocation size, or whatever error the parent reports.
    pub fn new(capacity: usize, parent: &'p P) -> Result<Self, AllocError> {
        let region = Layout::from_size_align(capacity, ARENA_ALIGN)
            .map_err(|_| AllocError::CapacityOverflow)?;
        let base = parent.allocate(region)?;
        tracing::debug!(capacity, "arena acquired region from parent");

        Ok(Self {
            base,
            region,
            cursor: Cell::new(0),
            parent,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.size()
    }

    /// Bytes handed out so far, alignment padding included.
    #[must_use]
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    #[must_use]
    pub fn parent(&self) -> &'p P {
        self.parent
    }

    /// Rewinds the bump cursor, making the whole region available again.
    ///
    /// Needs exclusive access, so no container can still be using memory
    /// handed out before the reset.
    pub fn reset(&mut self) {
        tracing::trace!(used = self.used(), "arena reset");
        self.cursor.set(0);
    }

    #[allow(clippy::as_conversions)]
    fn padding_for(&self, offset: usize, align: usize) -> usize {
        let addr = (self.base.as_ptr() as usize).wrapping_add(offset);
        addr.wrapping_neg() & (align - 1)
    }
}

impl<P: Allocator> Allocator for ArenaAllocator<'_, P> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        let cursor = self.cursor.get();
        let padding = self.padding_for(cursor, layout.align());
        let requested = padding
            .checked_add(layout.size())
            .ok_or(AllocError::CapacityOverflow)?;
        let available = self.remaining();

        if requested > available {
            tracing::debug!(requested, available, "arena exhausted");
            return Err(AllocError::OutOfMemory {
                requested,
                available,
            });
        }

        self.cursor.set(cursor + requested);
        // SAFETY: cursor + padding + size <= capacity, so the pointer stays
        // inside the region and is therefore non-null
        let ptr = unsafe { self.base.as_ptr().add(cursor + padding) };
        Ok(unsafe { NonNull::new_unchecked(ptr) })
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // Reclaimed in bulk when the arena goes away
    }
}

impl<P: Allocator> Drop for ArenaAllocator<'_, P> {
    fn drop(&mut self) {
        tracing::debug!(
            capacity = self.capacity(),
            used = self.used(),
            "arena released region to parent"
        );
        // SAFETY: base/region is exactly what the parent handed out in new()
        unsafe { self.parent.deallocate(self.base, self.region) }
    }
}

impl<P: Allocator> fmt::Debug for ArenaAllocator<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::DEFAULT_ALLOCATOR;

    #[test]
    fn test_arena_initialization() {
        let arena = ArenaAllocator::new(128, &DEFAULT_ALLOCATOR).unwrap();

        assert_eq!(arena.capacity(), 128);
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.remaining(), 128);
    }

    #[test]
    fn test_bump_respects_alignment() {
        let arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();

        let a = arena.allocate(Layout::from_size_align(3, 1).unwrap()).unwrap();
        let b = arena.allocate(Layout::from_size_align(8, 8).unwrap()).unwrap();

        assert_eq!(b.as_ptr() as usize % 8, 0);
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 8);
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_second_allocation_exhausts_arena() {
        let arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();

        let first = arena.allocate_bytes(40).unwrap();
        let second = arena.allocate_bytes(40);

        assert_eq!(
            second,
            Err(AllocError::OutOfMemory {
                requested: 48,
                available: 24,
            })
        );
        // The first region is untouched by the failure
        unsafe {
            first.as_ptr().write_bytes(7, 40);
            assert_eq!(*first.as_ptr().add(39), 7);
        }
        assert_eq!(arena.used(), 40);
    }

    #[test]
    fn test_exact_fit_then_nothing_left() {
        let arena = ArenaAllocator::new(32, &DEFAULT_ALLOCATOR).unwrap();

        arena.allocate_bytes(32).unwrap();
        assert_eq!(arena.remaining(), 0);
        assert!(arena.allocate_bytes(1).is_err());
        // Zero-size requests still succeed
        assert!(arena.allocate_bytes(0).is_ok());
    }

    #[test]
    fn test_deallocate_is_noop() {
        let arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();

        let ptr = arena.allocate_bytes(16).unwrap();
        unsafe { arena.deallocate_bytes(ptr, 16) };

        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_reset_reclaims_everything() {
        let mut arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();

        arena.allocate_bytes(48).unwrap();
        arena.reset();

        assert_eq!(arena.used(), 0);
        assert!(arena.allocate_bytes(48).is_ok());
    }

    #[test]
    fn test_nested_arena_draws_from_parent_arena() {
        let outer = ArenaAllocator::new(256, &DEFAULT_ALLOCATOR).unwrap();
        {
            let inner = ArenaAllocator::new(100, &outer).unwrap();
            assert_eq!(outer.used(), 100);
            assert!(inner.allocate_bytes(64).is_ok());
        }
        // Releasing into an arena is a no-op
        assert_eq!(outer.used(), 100);
        assert!(ArenaAllocator::new(200, &outer).is_err());
    }

    #[test]
    fn test_distinct_arenas_are_distinct_pools() {
        let a = ArenaAllocator::new(16, &DEFAULT_ALLOCATOR).unwrap();
        let b = ArenaAllocator::new(16, &DEFAULT_ALLOCATOR).unwrap();

        assert!(a.is_same(&a));
        assert!(!a.is_same(&b));
    }
}
