use core::alloc::Layout;
use core::fmt;
use core::mem::size_of;
use core::ptr::{self, NonNull};
use core::slice;

use junealloc::{AllocError, Allocator, DefaultAllocator};

use crate::error::{JuneError, Result};
use crate::growth::{self, End, Span};

/// Number of element slots a new buffer starts with.
pub const INITIAL_CAPACITY: usize = 8;

/// A double-ended growable buffer over an injected allocator.
///
/// One contiguous allocation holds the live elements somewhere inside it:
/// `[head, head + len)` out of `[0, capacity)`. Pushing at either end is
/// amortized O(1); when an end runs out of room the buffer either
/// reallocates or slides the live region over to reuse slack from the other
/// end (see [`growth`](crate::growth)).
///
/// Elements are plain `Copy` data moved around bytewise and never dropped.
pub struct GrowBuf<'a, T: Copy, A: Allocator = DefaultAllocator> {
    ptr: NonNull<T>,
    capacity: usize,
    head: usize,
    len: usize,
    alloc: &'a A,
}

impl<'a, T: Copy, A: Allocator> GrowBuf<'a, T, A> {
    /// Creates an empty buffer with room for [`INITIAL_CAPACITY`] elements.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator cannot provide the
    /// initial region.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn new_in(alloc: &'a A) -> Result<Self> {
        Self::with_capacity_in(INITIAL_CAPACITY, alloc)
    }

    /// Creates an empty buffer with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator cannot provide the region.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Result<Self> {
        assert!(
            size_of::<T>() != 0,
            "GrowBuf does not support zero-sized element types"
        );
        let ptr = Self::allocate_slots(alloc, capacity)?;
        Ok(Self {
            ptr,
            capacity,
            head: 0,
            len: 0,
            alloc,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total element slots in the current allocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots before the first live element.
    #[must_use]
    pub fn front_slack(&self) -> usize {
        self.span().front_slack()
    }

    /// Free slots after the last live element.
    #[must_use]
    pub fn back_slack(&self) -> usize {
        self.span().back_slack()
    }

    #[must_use]
    pub fn allocator(&self) -> &'a A {
        self.alloc
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [head, head + len) is initialized and inside the allocation
        unsafe { slice::from_raw_parts(self.slot(self.head), self.len) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and &mut self gives exclusive access
        unsafe { slice::from_raw_parts_mut(self.slot(self.head), self.len) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Copies out the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::IndexOutOfBounds` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.as_slice()
            .get(index)
            .copied()
            .ok_or(JuneError::IndexOutOfBounds {
                index,
                length: self.len,
            })
    }

    /// Overwrites the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::IndexOutOfBounds` if `index >= len()`; the buffer
    /// is left unchanged.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let length = self.len;
        let slot = self
            .as_mut_slice()
            .get_mut(index)
            .ok_or(JuneError::IndexOutOfBounds { index, length })?;
        *slot = value;
        Ok(())
    }

    /// Appends an element, growing the buffer if the back is full.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if growth was needed and the allocator
    /// refused; the buffer is left unchanged.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.back_slack() == 0 {
            self.grow(End::Back)?;
        }
        // SAFETY: back_slack() > 0, so head + len < capacity
        unsafe { self.slot(self.head + self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Appends an element only if no growth is needed.
    ///
    /// # Errors
    ///
    /// Hands `value` back if the back of the buffer is full.
    pub fn push_back_within_capacity(&mut self, value: T) -> core::result::Result<(), T> {
        if self.back_slack() == 0 {
            return Err(value);
        }
        // SAFETY: back_slack() > 0, so head + len < capacity
        unsafe { self.slot(self.head + self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element.
    ///
    /// Returns `None` if the buffer is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was the last live element
        Some(unsafe { self.slot(self.head + self.len).read() })
    }

    /// Prepends an element, growing or recentering if the front is full.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if growth was needed and the allocator
    /// refused; the buffer is left unchanged.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        if self.head == 0 {
            self.grow(End::Front)?;
        }
        self.head -= 1;
        // SAFETY: head was > 0, so the slot before it is inside the allocation
        unsafe { self.slot(self.head).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the first element.
    ///
    /// Returns `None` if the buffer is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: the slot is the first live element
        let value = unsafe { self.slot(self.head).read() };
        self.head += 1;
        self.len -= 1;
        Some(value)
    }

    /// Removes the element at `index`, shifting later elements left.
    ///
    /// The first and last positions are O(1).
    ///
    /// # Errors
    ///
    /// Returns `JuneError::IndexOutOfBounds` if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> Result<T> {
        let out_of_bounds = JuneError::IndexOutOfBounds {
            index,
            length: self.len,
        };
        if index >= self.len {
            return Err(out_of_bounds);
        }
        if index == 0 {
            return self.pop_front().ok_or(out_of_bounds);
        }
        if index == self.len - 1 {
            return self.pop_back().ok_or(out_of_bounds);
        }

        let at = self.head + index;
        // SAFETY: at and everything after it up to head + len are live
        let value = unsafe { self.slot(at).read() };
        unsafe { ptr::copy(self.slot(at + 1), self.slot(at), self.len - index - 1) };
        self.len -= 1;
        Ok(value)
    }

    /// Removes the element at `index` by moving the last element into its
    /// place. Does not preserve order.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::IndexOutOfBounds` if `index >= len()`.
    pub fn swap_remove(&mut self, index: usize) -> Result<T> {
        let length = self.len;
        let slice = self.as_mut_slice();
        if index >= slice.len() {
            return Err(JuneError::IndexOutOfBounds { index, length });
        }
        slice.swap(index, length - 1);
        self.pop_back()
            .ok_or(JuneError::IndexOutOfBounds { index, length })
    }

    /// Appends all of `values`, growing at most once.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused; the buffer is
    /// left unchanged.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.reserve_back(values.len())?;
        // SAFETY: back_slack() >= values.len() now, and values cannot alias
        // the buffer because we hold it mutably
        unsafe {
            ptr::copy_nonoverlapping(
                values.as_ptr(),
                self.slot(self.head + self.len),
                values.len(),
            );
        }
        self.len += values.len();
        Ok(())
    }

    /// Ensures `capacity() >= min_elements`, reallocating at most once.
    ///
    /// The target is the first capacity reached by repeated growth steps, so
    /// reserving keeps the same capacity sequence as pushing.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused or the size
    /// overflowed; the buffer is left unchanged.
    pub fn reserve(&mut self, min_elements: usize) -> Result<()> {
        if self.capacity >= min_elements {
            return Ok(());
        }
        let target = growth::reserved_capacity(self.capacity, size_of::<T>(), min_elements)
            .ok_or(AllocError::CapacityOverflow)?;
        tracing::trace!(
            old_capacity = self.capacity,
            new_capacity = target,
            "reserving buffer"
        );
        self.relocate(target, 0)
    }

    /// Ensures `back_slack() >= additional`.
    ///
    /// Slides the live region to the front of the allocation when the total
    /// slack suffices, otherwise reserves like [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused or the size
    /// overflowed; the buffer is left unchanged.
    pub fn reserve_back(&mut self, additional: usize) -> Result<()> {
        if self.back_slack() >= additional {
            return Ok(());
        }
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        if needed <= self.capacity {
            self.move_live(0);
            Ok(())
        } else {
            self.reserve(needed)
        }
    }

    /// Reallocates to exactly `len()` slots, dropping slack at both ends.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused; the buffer is
    /// left unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.capacity == self.len {
            return Ok(());
        }
        tracing::debug!(
            old_capacity = self.capacity,
            new_capacity = self.len,
            "shrinking buffer to fit"
        );
        self.relocate(self.len, 0)
    }

    /// Shortens the buffer to `len` elements; no-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Forgets all elements and moves all slack to the back. Keeps the
    /// allocation.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Overwrites every live element with `value`.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Copies the live elements into a new buffer from the same allocator.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn try_clone(&self) -> Result<Self> {
        let mut clone = Self::with_capacity_in(self.capacity, self.alloc)?;
        clone.extend_from_slice(self.as_slice())?;
        Ok(clone)
    }

    fn span(&self) -> Span {
        Span {
            capacity: self.capacity,
            head: self.head,
            len: self.len,
        }
    }

    fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.capacity);
        // SAFETY: offset is at most one past the end of the allocation
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    fn grow(&mut self, end: End) -> Result<()> {
        let plan = growth::plan(self.span(), size_of::<T>(), end)
            .ok_or(AllocError::CapacityOverflow)?;

        if plan.reallocate {
            tracing::trace!(
                old_capacity = self.capacity,
                new_capacity = plan.capacity,
                len = self.len,
                ?end,
                "reallocating buffer"
            );
            self.relocate(plan.capacity, plan.head)
        } else {
            tracing::trace!(
                capacity = self.capacity,
                from = self.head,
                to = plan.head,
                len = self.len,
                ?end,
                "recentering buffer"
            );
            self.move_live(plan.head);
            Ok(())
        }
    }

    /// Slides the live region to `head` within the current allocation.
    fn move_live(&mut self, head: usize) {
        debug_assert!(head + self.len <= self.capacity);
        // SAFETY: both ranges lie inside the allocation; ptr::copy handles
        // the overlap
        unsafe { ptr::copy(self.slot(self.head), self.slot(head), self.len) };
        self.head = head;
    }

    /// Moves the live region into a fresh allocation of `capacity` slots,
    /// starting at `head`, and releases the old one.
    fn relocate(&mut self, capacity: usize, head: usize) -> Result<()> {
        debug_assert!(head + self.len <= capacity);
        let ptr = Self::allocate_slots(self.alloc, capacity)?;
        // SAFETY: the new allocation is distinct from the old one and has
        // room for len elements at head
        unsafe { ptr::copy_nonoverlapping(self.slot(self.head), ptr.as_ptr().add(head), self.len) };
        self.release();
        self.ptr = ptr;
        self.capacity = capacity;
        self.head = head;
        Ok(())
    }

    fn layout_for(capacity: usize) -> Result<Layout> {
        Ok(Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?)
    }

    fn allocate_slots(alloc: &A, capacity: usize) -> Result<NonNull<T>> {
        if capacity == 0 {
            return Ok(NonNull::dangling());
        }
        let layout = Self::layout_for(capacity)?;
        Ok(alloc.allocate(layout)?.cast())
    }

    fn release(&mut self) {
        if self.capacity == 0 {
            return;
        }
        // The layout was valid when the region was allocated
        if let Ok(layout) = Self::layout_for(self.capacity) {
            // SAFETY: ptr/layout is exactly what allocate_slots handed out
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        }
    }
}

impl<T: Copy, A: Allocator> Drop for GrowBuf<'_, T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<'b, T: Copy, A: Allocator> IntoIterator for &'b GrowBuf<'_, T, A> {
    type Item = &'b T;
    type IntoIter = slice::Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Copy + fmt::Debug, A: Allocator> fmt::Debug for GrowBuf<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
