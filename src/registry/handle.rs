//! Buffer handles.

use std::fmt;

/// Opaque identifier of a buffer in a [`Registry`](super::Registry).
///
/// The low 32 bits hold the slot index plus one, the high 32 bits the
/// generation of the slot when the buffer was created. Zero is never
/// handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufHandle(u64);

impl BufHandle {
    /// The handle that never refers to a buffer.
    pub const INVALID: BufHandle = BufHandle(0);

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | (u64::from(index) + 1))
    }

    /// Rebuilds a handle from its integer form.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Integer form of the handle, suitable for crossing an FFI boundary.
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// Slot index, or `None` for handles that cannot name a slot.
    pub(crate) fn index(self) -> Option<usize> {
        let low = (self.0 & u64::from(u32::MAX)) as u32;
        low.checked_sub(1).map(|i| i as usize)
    }

    pub(crate) fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl Default for BufHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for BufHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "buf#{}.{}", index, self.generation()),
            None => f.write_str("buf#invalid"),
        }
    }
}
