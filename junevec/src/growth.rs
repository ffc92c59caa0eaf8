//! Growth policy of [`GrowBuf`](crate::GrowBuf).
//!
//! Pure arithmetic over a buffer's `(capacity, head, len)` in element units.
//! The buffer asks for a [`GrowthPlan`] when one end of its live region runs
//! into the allocation boundary, then carries the plan out in memory.
//!
//! - If less than half of the allocation is slack (or there is no slack at
//!   all), the plan reallocates to `capacity * 1.5` bytes rounded up to the
//!   next element boundary strictly above it.
//! - Otherwise the plan keeps the allocation and only moves the live region,
//!   so slack freed by pops at one end can be reused at the other.

/// Which end of the live region needs room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Front,
    Back,
}

/// Placement of a live region inside its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub capacity: usize,
    pub head: usize,
    pub len: usize,
}

impl Span {
    #[must_use]
    pub fn slack(&self) -> usize {
        self.capacity - self.len
    }

    #[must_use]
    pub fn front_slack(&self) -> usize {
        self.head
    }

    #[must_use]
    pub fn back_slack(&self) -> usize {
        self.capacity - self.head - self.len
    }
}

/// Target capacity and live-region offset after a growth step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPlan {
    pub capacity: usize,
    pub head: usize,
    /// `false` means the live region only moves within the current allocation
    pub reallocate: bool,
}

/// Capacity after one reallocation step, or `None` on overflow.
///
/// Always at least one element larger than `capacity`.
#[must_use]
pub fn grown_capacity(capacity: usize, elem_size: usize) -> Option<usize> {
    let bytes = capacity.checked_mul(elem_size)?;
    let grown = bytes.checked_add(bytes / 2)?;
    (grown / elem_size).checked_add(1)
}

#[must_use]
pub fn should_reallocate(span: Span, elem_size: usize) -> bool {
    let capacity_bytes = span.capacity * elem_size;
    let slack_bytes = span.slack() * elem_size;
    slack_bytes == 0 || slack_bytes < capacity_bytes / 2
}

/// Plans the growth step that frees room at `end`.
///
/// Room at the back puts the live region at the start of the allocation.
/// Room at the front centers it, with the odd slot going to the front, so
/// alternating front/back pushes keep finding room at both ends.
#[must_use]
pub fn plan(span: Span, elem_size: usize, end: End) -> Option<GrowthPlan> {
    let (capacity, reallocate) = if should_reallocate(span, elem_size) {
        (grown_capacity(span.capacity, elem_size)?, true)
    } else {
        (span.capacity, false)
    };

    let head = match end {
        End::Back => 0,
        End::Front => (capacity - span.len).div_ceil(2),
    };

    Some(GrowthPlan {
        capacity,
        head,
        reallocate,
    })
}

/// Smallest capacity reachable by repeated reallocation steps that holds
/// `min_elements`.
///
/// Recentering never changes capacity, so only the reallocation step counts.
#[must_use]
pub fn reserved_capacity(capacity: usize, elem_size: usize, min_elements: usize) -> Option<usize> {
    let mut target = capacity;
    while target < min_elements {
        target = grown_capacity(target, elem_size)?;
    }
    Some(target)
}
