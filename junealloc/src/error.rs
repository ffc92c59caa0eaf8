use thiserror::Error;

/// Error types for allocator operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum AllocError {
    /// A bounded allocator has no room left for the request
    #[error("Out of memory: requested {requested} bytes, but only {available} bytes available")]
    OutOfMemory {
        /// Number of bytes requested, including alignment padding
        requested: usize,
        /// Number of bytes still free in the allocator
        available: usize,
    },
    /// The system heap could not satisfy the request
    #[error("Allocation exhausted: the system heap refused {size} bytes")]
    Exhausted {
        /// Number of bytes requested
        size: usize,
    },
    /// Size arithmetic overflowed the range allowed for a single allocation
    #[error("Capacity overflow: requested size exceeds isize::MAX bytes")]
    CapacityOverflow,
}
