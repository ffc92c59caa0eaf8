use core::slice;

use junealloc::Allocator;

use crate::growbuf::GrowBuf;

/// Iterator over the elements of a [`BucketSet`](crate::BucketSet)
///
/// Walks the buckets in index order and each bucket front to back.
/// This iterator implements `Clone`.
pub struct BucketSetIter<'s, 'a, T: Copy, A: Allocator> {
    buckets: slice::Iter<'s, GrowBuf<'a, T, A>>,
    current: slice::Iter<'s, T>,
    remaining: usize,
}

impl<'s, 'a, T: Copy, A: Allocator> BucketSetIter<'s, 'a, T, A> {
    pub(crate) fn new(buckets: &'s [GrowBuf<'a, T, A>], len: usize) -> Self {
        Self {
            buckets: buckets.iter(),
            current: Default::default(),
            remaining: len,
        }
    }
}

impl<T: Copy, A: Allocator> Clone for BucketSetIter<'_, '_, T, A> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'s, T: Copy, A: Allocator> Iterator for BucketSetIter<'s, '_, T, A> {
    type Item = &'s T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                self.remaining -= 1;
                return Some(value);
            }
            self.current = self.buckets.next()?.as_slice().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Copy, A: Allocator> ExactSizeIterator for BucketSetIter<'_, '_, T, A> {}
