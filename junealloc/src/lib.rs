#![no_std]

//! `junealloc`: a pluggable allocator capability for runtime-agnostic containers.
//!
//! Every container in the June collections goes through an [`Allocator`] for
//! all of its memory. The allocator is injected at construction time and
//! borrowed for the container's lifetime; nothing reaches for a global heap
//! behind the caller's back.
//!
//! Two implementations are provided:
//!
//! - [`DefaultAllocator`]: forwards to the system heap. Stateless.
//! - [`ArenaAllocator`]: bump-allocates from one region acquired from a parent
//!   allocator, ignores individual releases and hands the region back in one
//!   call when dropped.
//!
//! # Bounded memory
//!
//! An arena never grows, so running out of memory is an ordinary, recoverable
//! outcome:
//!
//! ```
//! # use junealloc::{Allocator, AllocError, ArenaAllocator, DEFAULT_ALLOCATOR};
//! let arena = ArenaAllocator::new(64, &DEFAULT_ALLOCATOR).unwrap();
//!
//! let first = arena.allocate_bytes(40);
//! assert!(first.is_ok());
//!
//! // Only 24 bytes remain, and the next 16-aligned slot needs 48
//! assert!(matches!(
//!     arena.allocate_bytes(40),
//!     Err(AllocError::OutOfMemory { .. })
//! ));
//! ```
//!
//! # Concurrency
//!
//! Allocators mutate internal state through `&self` without locking. They are
//! meant to be shared by many containers on one thread; `ArenaAllocator` is
//! `!Sync` accordingly.
//!
//! ## `no_std` Compatibility
//!
//! This crate needs only `core` and `alloc`. Enable the optional `std` feature
//! to have [`AllocError`] implement `std::error::Error`:
//! ```toml
//! [dependencies]
//! junealloc = { version = "0.1", features = ["std"] }
//! ```

extern crate alloc;

mod allocator;
mod arena;
mod error;

pub use allocator::{dangling, Allocator, DefaultAllocator, DEFAULT_ALIGN, DEFAULT_ALLOCATOR};
pub use arena::{ArenaAllocator, ARENA_ALIGN};
pub use error::AllocError;
