#![no_std]

//! `junevec`: double-ended growable buffer, byte string and fixed-bucket hash
//! set, all built against an injected [`Allocator`].
//!
//! Every allocation, reallocation and release goes through the allocator the
//! container was created with; the containers never touch the system heap on
//! their own. With an [`ArenaAllocator`] that makes memory bounded, so every
//! growth path reports allocation failure as an ordinary error.
//!
//! # Performance Characteristics
//!
//! ## `GrowBuf`
//! - `push_back()`, `push_front()`: amortized O(1)
//! - `pop_back()`, `pop_front()`: O(1), never reallocate
//! - `get()`, `set()`: O(1), bounds-checked
//! - `erase()`: O(1) at either end, O(n) in the interior
//! - `clear()`: O(1), keeps the allocation
//!
//! The live elements sit anywhere inside one allocation. When an end runs
//! out of room, the buffer reallocates to 1.5x only if less than half of the
//! allocation is free; otherwise it slides the live elements over and reuses
//! the slack left behind by pops at the other end. Deque-style workloads
//! therefore settle into a single allocation.
//!
//! ## `BucketSet`
//! - `contains()`, `add()`, `remove()`: O(occupancy of one bucket)
//! - The bucket count is fixed at construction; there is no rehashing.
//!
//! # Deque Interface
//!
//! ```
//! # use junevec::{GrowBuf, DEFAULT_ALLOCATOR};
//! let mut buf: GrowBuf<'_, i32> = GrowBuf::new_in(&DEFAULT_ALLOCATOR).unwrap();
//!
//! buf.push_back(1).unwrap();
//! buf.push_front(0).unwrap();
//! buf.push_back(2).unwrap();
//!
//! assert_eq!(buf.as_slice(), &[0, 1, 2]);
//! assert_eq!(buf.pop_front(), Some(0));
//! assert_eq!(buf.pop_back(), Some(2));
//! assert_eq!(buf.get(0), Ok(1));
//! assert!(buf.get(1).is_err());
//! ```
//!
//! # Strings
//!
//! [`JuneString`] keeps a NUL after its content at all times, so it can be
//! handed to C as-is, while its length stays explicit:
//!
//! ```
//! # use junevec::{JuneString, DEFAULT_ALLOCATOR};
//! let hello = JuneString::from_str_in("Hello, ", &DEFAULT_ALLOCATOR).unwrap();
//! let world = JuneString::from_str_in("world!", &DEFAULT_ALLOCATOR).unwrap();
//!
//! let greeting = hello.concatenate(&world).unwrap();
//! assert_eq!(greeting, "Hello, world!");
//! assert_eq!(greeting.len(), 13);
//! assert_eq!(greeting.as_bytes_with_nul().last(), Some(&0));
//!
//! assert_eq!(greeting.substring(0, 5).unwrap(), "Hello");
//! ```
//!
//! # Bounded Memory
//!
//! ```
//! # use junevec::{ArenaAllocator, GrowBuf, JuneError, DEFAULT_ALLOCATOR};
//! let arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();
//! let mut buf: GrowBuf<'_, u32, _> = GrowBuf::new_in(&arena).unwrap();
//!
//! let mut pushed = 0;
//! while buf.push_back(pushed).is_ok() {
//!     pushed += 1;
//! }
//! // The failed push left the buffer intact
//! assert_eq!(buf.len(), pushed as usize);
//! assert!(matches!(buf.push_back(0), Err(JuneError::Alloc(_))));
//! ```
//!
//! ## `no_std` Compatibility
//!
//! This crate needs only `core` and `alloc`. Enable the optional `std` feature
//! to have [`JuneError`] implement `std::error::Error`:
//! ```toml
//! [dependencies]
//! junevec = { version = "0.1", features = ["std"] }
//! ```

mod bucket_set;
mod error;
mod growbuf;
pub mod growth;
mod iter;
mod string;

pub use bucket_set::{fnv1a, BucketSet};
pub use error::{JuneError, Result};
pub use growbuf::{GrowBuf, INITIAL_CAPACITY};
pub use iter::BucketSetIter;
pub use string::JuneString;

pub use junealloc::{
    AllocError, Allocator, ArenaAllocator, DefaultAllocator, DEFAULT_ALLOCATOR,
};
