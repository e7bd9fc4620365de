//! Backing storage variants.

use std::fmt;
use std::ptr::NonNull;

/// Read-only view over memory owned by someone else.
///
/// A static buffer never writes through, frees, or hands out ownership of
/// this memory.
#[derive(Clone, Copy)]
pub struct StaticBytes {
    base: NonNull<u8>,
    len: usize,
}

// Safety: the view is read-only and the owner guarantees the memory outlives it.
unsafe impl Send for StaticBytes {}
unsafe impl Sync for StaticBytes {}

impl StaticBytes {
    /// Views memory that lives for the rest of the program.
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            base: NonNull::from(bytes).cast(),
            len: bytes.len(),
        }
    }

    /// Views `len` bytes starting at `base`.
    ///
    /// Returns `None` if `base` is null.
    ///
    /// # Safety
    ///
    /// `base` must be valid for reads of `len` bytes, and the memory must
    /// neither be mutated nor freed while any buffer viewing it is alive.
    pub unsafe fn from_raw(base: *const u8, len: usize) -> Option<Self> {
        let base = NonNull::new(base as *mut u8)?;
        Some(Self { base, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // Safety: upheld by the constructors.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }
}

impl fmt::Debug for StaticBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticBytes")
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

/// Where the content of a buffer created from existing memory comes from.
#[derive(Debug, Clone, Copy)]
pub enum MemSource<'a> {
    /// Copy the bytes into newly allocated dynamic storage.
    Copy(&'a [u8]),
    /// Wrap the memory as a static, read-only view.
    Static(StaticBytes),
}

impl MemSource<'static> {
    /// Picks the variant from an `is_static` flag.
    pub fn new(bytes: &'static [u8], is_static: bool) -> Self {
        if is_static {
            MemSource::Static(StaticBytes::from_static(bytes))
        } else {
            MemSource::Copy(bytes)
        }
    }
}

/// Mode of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufMode {
    Dynamic,
    Static,
}

/// Tagged storage of a buffer.
///
/// Dynamic storage is either empty (after a detach) or holds its byte
/// count plus one, the extra byte keeping content NUL-terminated. Content
/// sits at `block[start..start + len]`, bytes before `start` were shrunk
/// away.
pub(crate) enum Storage {
    Dynamic {
        block: Vec<u8>,
        start: usize,
        len: usize,
    },
    Static(StaticBytes),
}

impl Storage {
    pub(crate) fn mode(&self) -> BufMode {
        match self {
            Storage::Dynamic { .. } => BufMode::Dynamic,
            Storage::Static(_) => BufMode::Static,
        }
    }
}
