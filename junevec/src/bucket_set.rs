use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;
use core::slice;

use junealloc::{AllocError, Allocator, DefaultAllocator};

use crate::error::{JuneError, Result};
use crate::growbuf::GrowBuf;
use crate::iter::BucketSetIter;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over a byte span.
///
/// A ready-made hash function for plain-data elements hashed by their bytes.
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Hash set with a fixed number of buckets.
///
/// Each bucket is a [`GrowBuf`]; an element lives in bucket
/// `hash_fn(element) % bucket_count` and is found by a linear scan of that
/// bucket. The bucket count is fixed at construction and the set never
/// rehashes: keeping the load factor reasonable is up to the caller.
///
/// `hash_fn` must be a pure function of the element's value, and must agree
/// with `Eq`: equal elements hash equally.
pub struct BucketSet<'a, T, H, A = DefaultAllocator>
where
    T: Copy + Eq,
    H: Fn(&T) -> u64,
    A: Allocator,
{
    buckets: BucketArray<'a, T, A>,
    len: usize,
    hash_fn: H,
}

impl<'a, T, H, A> BucketSet<'a, T, H, A>
where
    T: Copy + Eq,
    H: Fn(&T) -> u64,
    A: Allocator,
{
    /// Creates a set with `bucket_count` empty buckets.
    ///
    /// The bucket array and every bucket come from `alloc`. If any of them
    /// cannot be allocated, whatever was already acquired is released before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::InvalidConfiguration` if `bucket_count` is 0, or
    /// `JuneError::Alloc` if the allocator refused.
    pub fn new_in(bucket_count: usize, hash_fn: H, alloc: &'a A) -> Result<Self> {
        if bucket_count == 0 {
            return Err(JuneError::InvalidConfiguration {
                parameter: "bucket_count",
                value: bucket_count,
            });
        }

        let mut buckets = BucketArray::with_slots(bucket_count, alloc)?;
        while buckets.initialized < bucket_count {
            buckets.push(GrowBuf::new_in(alloc)?);
        }

        Ok(Self {
            buckets,
            len: 0,
            hash_fn,
        })
    }

    /// Number of elements across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.as_slice().len()
    }

    /// Occupancy of bucket `index`, or `None` if there is no such bucket.
    #[must_use]
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.as_slice().get(index).map(GrowBuf::len)
    }

    /// Average bucket occupancy.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.bucket_count() as f64
    }

    #[must_use]
    pub fn allocator(&self) -> &'a A {
        self.buckets.alloc
    }

    /// Bucket an element belongs to.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bucket_index(&self, value: &T) -> usize {
        ((self.hash_fn)(value) % self.bucket_count() as u64) as usize
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.bucket(value).iter().any(|stored| stored == value)
    }

    /// Inserts `value` unless an equal element is already present.
    ///
    /// Returns `true` if the value was inserted and `false` if it was
    /// already present, in which case the set is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the target bucket had to grow and the
    /// allocator refused; the set is left unchanged.
    pub fn add(&mut self, value: T) -> Result<bool> {
        if self.contains(&value) {
            return Ok(false);
        }
        let index = self.bucket_index(&value);
        self.buckets.as_mut_slice()[index].push_back(value)?;
        self.len += 1;
        Ok(true)
    }

    /// Removes the element equal to `value`.
    ///
    /// Returns `false` if no such element was present. The last element of
    /// the bucket takes the removed element's place.
    pub fn remove(&mut self, value: &T) -> bool {
        let index = self.bucket_index(value);
        let bucket = &mut self.buckets.as_mut_slice()[index];
        let Some(position) = bucket.iter().position(|stored| stored == value) else {
            return false;
        };
        if bucket.swap_remove(position).is_err() {
            return false;
        }
        self.len -= 1;
        true
    }

    /// Empties every bucket, keeping their allocations.
    pub fn clear(&mut self) {
        for bucket in self.buckets.as_mut_slice() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Iterates over all elements, bucket by bucket.
    #[must_use]
    pub fn iter(&self) -> BucketSetIter<'_, 'a, T, A> {
        BucketSetIter::new(self.buckets.as_slice(), self.len)
    }

    fn bucket(&self, value: &T) -> &GrowBuf<'a, T, A> {
        &self.buckets.as_slice()[self.bucket_index(value)]
    }
}

impl<'s, 'a, T, H, A> IntoIterator for &'s BucketSet<'a, T, H, A>
where
    T: Copy + Eq,
    H: Fn(&T) -> u64,
    A: Allocator,
{
    type Item = &'s T;
    type IntoIter = BucketSetIter<'s, 'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, H, A> fmt::Debug for BucketSet<'_, T, H, A>
where
    T: Copy + Eq + fmt::Debug,
    H: Fn(&T) -> u64,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Array of buckets in one allocation from the set's allocator.
///
/// Only the first `initialized` slots hold buckets; dropping the array drops
/// those and then releases the whole allocation, so a set that fails half
/// way through construction leaks nothing.
struct BucketArray<'a, T: Copy, A: Allocator> {
    ptr: NonNull<GrowBuf<'a, T, A>>,
    slots: usize,
    initialized: usize,
    alloc: &'a A,
}

impl<'a, T: Copy, A: Allocator> BucketArray<'a, T, A> {
    fn layout_for(slots: usize) -> Result<Layout> {
        Ok(Layout::array::<GrowBuf<'a, T, A>>(slots).map_err(|_| AllocError::CapacityOverflow)?)
    }

    fn with_slots(slots: usize, alloc: &'a A) -> Result<Self> {
        let ptr = alloc.allocate(Self::layout_for(slots)?)?.cast();
        Ok(Self {
            ptr,
            slots,
            initialized: 0,
            alloc,
        })
    }

    fn push(&mut self, bucket: GrowBuf<'a, T, A>) {
        assert!(self.initialized < self.slots, "bucket array is full");
        // SAFETY: the slot is inside the allocation and not yet initialized
        unsafe { self.ptr.as_ptr().add(self.initialized).write(bucket) };
        self.initialized += 1;
    }

    fn as_slice(&self) -> &[GrowBuf<'a, T, A>] {
        // SAFETY: the first `initialized` slots hold live buckets
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.initialized) }
    }

    fn as_mut_slice(&mut self) -> &mut [GrowBuf<'a, T, A>] {
        // SAFETY: as above, with exclusive access through &mut self
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.initialized) }
    }
}

impl<T: Copy, A: Allocator> Drop for BucketArray<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: exactly the initialized buckets are dropped, once
        unsafe {
            core::ptr::drop_in_place(core::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.initialized,
            ));
        }
        if let Ok(layout) = Self::layout_for(self.slots) {
            // SAFETY: ptr/layout is what with_slots obtained from alloc
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        }
    }
}
