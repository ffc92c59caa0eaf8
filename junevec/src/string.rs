use core::ffi::CStr;
use core::fmt::{self, Write};

use junealloc::{AllocError, Allocator, DefaultAllocator};

use crate::error::{JuneError, Result};
use crate::growbuf::{GrowBuf, INITIAL_CAPACITY};

/// Byte string stored in a [`GrowBuf`] with a trailing NUL.
///
/// The last live byte of the buffer is always `0` and is not counted by
/// [`len`](Self::len). Content may contain embedded NULs; the length is
/// tracked explicitly, never derived from the terminator. Every mutation
/// lifts the terminator off, runs the buffer operation and puts the
/// terminator back before returning.
pub struct JuneString<'a, A: Allocator = DefaultAllocator> {
    buf: GrowBuf<'a, u8, A>,
}

impl<'a, A: Allocator> JuneString<'a, A> {
    /// Creates an empty string.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn new_in(alloc: &'a A) -> Result<Self> {
        let mut buf = GrowBuf::new_in(alloc)?;
        buf.push_back(0)?;
        Ok(Self { buf })
    }

    /// Creates a string holding a copy of `bytes`, embedded NULs included.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn from_bytes_in(bytes: &[u8], alloc: &'a A) -> Result<Self> {
        let stored = Self::stored_size(bytes.len())?;
        let mut buf = GrowBuf::with_capacity_in(stored.max(INITIAL_CAPACITY), alloc)?;
        buf.extend_from_slice(bytes)?;
        buf.push_back(0)?;
        Ok(Self { buf })
    }

    /// Creates a string from the bytes of a C string, without its NUL.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn from_cstr_in(s: &CStr, alloc: &'a A) -> Result<Self> {
        Self::from_bytes_in(s.to_bytes(), alloc)
    }

    /// Creates a string from UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn from_str_in(s: &str, alloc: &'a A) -> Result<Self> {
        Self::from_bytes_in(s.as_bytes(), alloc)
    }

    /// Renders `args` into a new string sized to exactly fit the output.
    ///
    /// Formats twice: once to measure, once into a buffer of
    /// `measured + 1` bytes. Usually called through [`june_format!`].
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Format` if a formatting implementation failed, or
    /// `JuneError::Alloc` if the allocator refused.
    pub fn format_in(alloc: &'a A, args: fmt::Arguments<'_>) -> Result<Self> {
        let mut measure = Measure(0);
        measure.write_fmt(args).map_err(|_| JuneError::Format)?;

        let mut buf = GrowBuf::with_capacity_in(Self::stored_size(measure.0)?, alloc)?;
        buf.push_back(0)?;
        let mut rendered = Self { buf };
        rendered.write_fmt(args).map_err(|_| JuneError::Format)?;
        Ok(rendered)
    }

    /// Number of content bytes, terminator excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte slots in the underlying buffer, terminator slot included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[must_use]
    pub fn allocator(&self) -> &'a A {
        self.buf.allocator()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let stored = self.buf.as_slice();
        &stored[..stored.len() - 1]
    }

    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// Views the content as a C string, if it has no embedded NUL.
    #[must_use]
    pub fn to_cstr(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul()).ok()
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused; the string is
    /// left unchanged.
    pub fn push_back(&mut self, byte: u8) -> Result<()> {
        self.push_bytes(&[byte])
    }

    /// Appends a span of bytes.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused; the string is
    /// left unchanged.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        // Room for the bytes is made while the terminator is still in place,
        // so nothing below can fail half way
        self.buf.reserve_back(bytes.len())?;
        self.without_terminator(|buf| buf.extend_from_slice(bytes))
    }

    /// Removes the last content byte.
    ///
    /// Returns `None` if the string is empty.
    pub fn pop_back(&mut self) -> Option<u8> {
        self.without_terminator(GrowBuf::pop_back)
    }

    /// Ensures room for `total_capacity` bytes, terminator included.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn reserve(&mut self, total_capacity: usize) -> Result<()> {
        self.buf.reserve(total_capacity)
    }

    /// Releases all slack, keeping the terminator.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.buf.shrink_to_fit()
    }

    pub fn clear(&mut self) {
        self.without_terminator(GrowBuf::clear);
    }

    /// New string holding `self` followed by `other`.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::AllocatorMismatch` if the two strings were built
    /// against different allocators, or `JuneError::Alloc` if the allocator
    /// refused.
    pub fn concatenate(&self, other: &JuneString<'_, A>) -> Result<Self> {
        if !self.allocator().is_same(other.allocator()) {
            tracing::debug!("rejected concatenation across allocators");
            return Err(JuneError::AllocatorMismatch);
        }

        let total = self
            .len()
            .checked_add(other.len())
            .ok_or(AllocError::CapacityOverflow)?;
        let stored = Self::stored_size(total)?;
        let mut buf = GrowBuf::with_capacity_in(stored.max(INITIAL_CAPACITY), self.allocator())?;
        buf.extend_from_slice(self.as_bytes())?;
        buf.extend_from_slice(other.as_bytes_with_nul())?;
        Ok(Self { buf })
    }

    /// New string holding the stored bytes in `[from, to)`.
    ///
    /// The range is checked against the stored bytes, terminator slot
    /// included, so `to` may be at most `len() + 1`.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::InvalidRange` if `from >= to` or `to` is past the
    /// terminator slot, or `JuneError::Alloc` if the allocator refused.
    pub fn substring(&self, from: usize, to: usize) -> Result<Self> {
        let stored = self.as_bytes_with_nul();
        let invalid = JuneError::InvalidRange {
            from,
            to,
            length: stored.len(),
        };
        if from >= to {
            return Err(invalid);
        }
        let bytes = stored.get(from..to).ok_or(invalid)?;
        Self::from_bytes_in(bytes, self.allocator())
    }

    /// Copies the string into a new one from the same allocator.
    ///
    /// # Errors
    ///
    /// Returns `JuneError::Alloc` if the allocator refused.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            buf: self.buf.try_clone()?,
        })
    }

    fn stored_size(content: usize) -> Result<usize> {
        Ok(content.checked_add(1).ok_or(AllocError::CapacityOverflow)?)
    }

    fn without_terminator<R>(&mut self, op: impl FnOnce(&mut GrowBuf<'a, u8, A>) -> R) -> R {
        let terminator = self.buf.pop_back();
        debug_assert_eq!(terminator, Some(0), "string lost its terminator");

        let result = op(&mut self.buf);

        // Lifting the terminator freed a slot at the back, and none of the
        // operations above consume more back room than they were given
        let restored = self.buf.push_back_within_capacity(0);
        debug_assert!(restored.is_ok(), "no room to restore the terminator");
        result
    }
}

/// Counts rendered bytes without storing them.
struct Measure(usize);

impl Write for Measure {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

impl<A: Allocator> Write for JuneString<'_, A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<A: Allocator, B: Allocator> PartialEq<JuneString<'_, B>> for JuneString<'_, A> {
    fn eq(&self, other: &JuneString<'_, B>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> Eq for JuneString<'_, A> {}

impl<A: Allocator> PartialEq<[u8]> for JuneString<'_, A> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl<A: Allocator> PartialEq<str> for JuneString<'_, A> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> PartialEq<&str> for JuneString<'_, A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> fmt::Display for JuneString<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl<A: Allocator> fmt::Debug for JuneString<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}

/// Formats into a [`JuneString`] built against the given allocator.
///
/// ```
/// # use junevec::{june_format, DEFAULT_ALLOCATOR};
/// let s = june_format!(&DEFAULT_ALLOCATOR, "{}-{:03}", "id", 7).unwrap();
/// assert_eq!(s, "id-007");
/// assert_eq!(s.capacity(), 7);
/// ```
#[macro_export]
macro_rules! june_format {
    ($alloc:expr, $($arg:tt)*) => {
        $crate::JuneString::format_in($alloc, ::core::format_args!($($arg)*))
    };
}
