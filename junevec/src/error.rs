use junealloc::AllocError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, JuneError>;

/// Error types for container operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum JuneError {
    /// Index is beyond the current number of live elements
    #[error("Index out of bounds: index {index} is beyond length {length}")]
    IndexOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Number of live elements
        length: usize,
    },
    /// Half-open range is empty, reversed or reaches past the stored bytes
    #[error("Invalid range: [{from}, {to}) does not fit in {length} stored bytes")]
    InvalidRange {
        /// Inclusive start of the range
        from: usize,
        /// Exclusive end of the range
        to: usize,
        /// Number of stored bytes, terminator included
        length: usize,
    },
    /// Operands were built against different allocators
    #[error("Allocator mismatch: operands do not share an allocator")]
    AllocatorMismatch,
    /// Invalid construction parameter
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
    /// The allocator could not satisfy a growth request
    #[error("Allocation failed: {0}")]
    Alloc(#[from] AllocError),
    /// A formatting implementation reported an error
    #[error("Formatting failed")]
    Format,
}
