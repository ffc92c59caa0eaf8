use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::AllocError;

/// Alignment used by the size-only convenience methods.
///
/// Matches what the platform heap guarantees for any fundamental type.
pub const DEFAULT_ALIGN: usize = 16;

/// Shared instance of the system heap allocator.
pub static DEFAULT_ALLOCATOR: DefaultAllocator = DefaultAllocator;

/// Capability that hands out and reclaims raw memory regions.
///
/// One allocator is typically referenced by many containers at once, so the
/// methods take `&self` and implementations keep their mutable state in
/// `Cell`s. Nothing here is thread-safe.
pub trait Allocator {
    /// Returns a region of at least `layout.size()` bytes aligned to
    /// `layout.align()`.
    ///
    /// A zero-size request never touches the backing store and yields an
    /// aligned dangling pointer.
    ///
    /// # Errors
    ///
    /// Returns `AllocError::OutOfMemory` when a bounded allocator has no room
    /// left, or `AllocError::Exhausted` when the system heap refuses.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a region previously returned by [`Allocator::allocate`].
    ///
    /// Releasing a zero-size region is always a no-op.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this same allocator with
    /// the same `layout`, and must not be used after this call.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Whether `other` hands out memory from the same pool as `self`.
    ///
    /// Containers built against different pools must not exchange memory.
    fn is_same(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }

    /// Allocates `size` bytes with [`DEFAULT_ALIGN`] alignment.
    ///
    /// # Errors
    ///
    /// Same as [`Allocator::allocate`], plus `AllocError::CapacityOverflow`
    /// when `size` cannot describe a valid allocation.
    fn allocate_bytes(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let layout =
            Layout::from_size_align(size, DEFAULT_ALIGN).map_err(|_| AllocError::CapacityOverflow)?;
        self.allocate(layout)
    }

    /// Releases a region obtained from [`Allocator::allocate_bytes`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate_bytes(size)` on this same
    /// allocator, and must not be used after this call.
    unsafe fn deallocate_bytes(&self, ptr: NonNull<u8>, size: usize) {
        // allocate_bytes already validated this pair
        if let Ok(layout) = Layout::from_size_align(size, DEFAULT_ALIGN) {
            unsafe { self.deallocate(ptr, layout) }
        }
    }
}

/// Aligned, non-null pointer that must never be dereferenced.
///
/// Stands in for zero-size regions.
#[must_use]
#[allow(clippy::as_conversions)]
pub fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: alignment is always a non-zero power of two
    unsafe { NonNull::new_unchecked(layout.align() as *mut u8) }
}

/// Allocator that delegates straight to the system heap.
///
/// Stateless, so every instance is interchangeable with every other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAllocator;

impl Allocator for DefaultAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        // SAFETY: the layout has a non-zero size
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::Exhausted {
            size: layout.size(),
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: forwarded from the caller's contract
            unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    fn is_same(&self, _other: &Self) -> bool {
        true
    }
}
