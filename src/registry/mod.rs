//! Handle-Based Buffer Registry
//!
//! Maps opaque [`BufHandle`]s to live [`Buf`]s.
//!
//! # Handles
//!
//! Buffers live in a slot table. A handle names a slot together with the
//! generation the slot had when the buffer was created; freeing a buffer
//! bumps the generation, so stale handles keep failing with
//! [`BufError::InvalidHandle`] even after the slot is reused.
//!
//! ```text
//!  handle (u64) = generation << 32 | (index + 1)
//!
//!  slots: [ gen 1: Buf ][ gen 3: free ][ gen 1: Buf ] ...
//! ```
//!
//! A slot whose generation runs out is retired rather than reused.
//!
//! # Example
//!
//! ```rust
//! use xmlbuf::registry::Registry;
//!
//! let mut registry = Registry::default();
//! let handle = registry.create(10).unwrap();
//! registry.add(handle, b"Hello").unwrap();
//!
//! let detached = registry.detach(handle).unwrap();
//! assert_eq!(detached.as_bytes(), b"Hello");
//!
//! assert!(registry.free(handle));
//! assert!(!registry.free(handle));
//! ```

mod handle;
mod shared;

pub use handle::BufHandle;
pub use shared::{configure_global, global, BufManager, SharedRegistry};

use std::ffi::CStr;
use std::mem;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::buf::{
    Allocator, Buf, BufError, BufPolicy, BufResult, Detached, MemSource, SystemAllocator,
};
use crate::config::XmlBufConfig;

#[derive(Debug)]
struct Slot {
    generation: u32,
    buf: Option<Buf>,
}

/// Table of live buffers addressed by handle.
///
/// Buffers created here share the registry's policy and allocator.
#[derive(Debug)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    policy: BufPolicy,
    alloc: Arc<dyn Allocator>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(&XmlBufConfig::default())
    }
}

impl Registry {
    /// Creates a registry using the system allocator.
    pub fn new(config: &XmlBufConfig) -> Self {
        Self::with_allocator(config.policy(), Arc::new(SystemAllocator))
    }

    /// Creates a registry drawing storage from `alloc`.
    pub fn with_allocator(policy: BufPolicy, alloc: Arc<dyn Allocator>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            policy,
            alloc,
        }
    }

    pub fn policy(&self) -> &BufPolicy {
        &self.policy
    }

    /// Number of live buffers.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Returns true if `handle` refers to a live buffer.
    pub fn contains(&self, handle: BufHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Resolves a handle.
    pub fn get(&self, handle: BufHandle) -> BufResult<&Buf> {
        handle
            .index()
            .and_then(|index| self.slots.get(index))
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.buf.as_ref())
            .ok_or(BufError::InvalidHandle)
    }

    /// Resolves a handle for mutation.
    pub fn get_mut(&mut self, handle: BufHandle) -> BufResult<&mut Buf> {
        handle
            .index()
            .and_then(|index| self.slots.get_mut(index))
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.buf.as_mut())
            .ok_or(BufError::InvalidHandle)
    }

    fn insert(&mut self, buf: Buf) -> BufResult<BufHandle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                // The top index would spill into the generation bits.
                let index = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|&index| index < u32::MAX)
                    .ok_or(BufError::AllocationFailure {
                        requested: mem::size_of::<Slot>(),
                    })?;
                self.slots.push(Slot {
                    generation: 1,
                    buf: None,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.buf = Some(buf);
        self.live += 1;
        Ok(BufHandle::new(index, slot.generation))
    }

    /// Creates an empty buffer with room for at least `hint` bytes.
    pub fn create(&mut self, hint: usize) -> BufResult<BufHandle> {
        let buf = Buf::with_policy(hint, self.policy, self.alloc.clone())?;
        let handle = self.insert(buf)?;
        trace!(handle = %handle, hint, "create");
        Ok(handle)
    }

    /// Creates a buffer from existing memory. See [`Buf::from_mem`].
    pub fn create_mem(&mut self, mem: Option<MemSource<'_>>) -> BufResult<BufHandle> {
        let buf = Buf::from_mem(mem, self.policy, self.alloc.clone())?;
        let len = buf.len();
        let handle = self.insert(buf)?;
        trace!(handle = %handle, len, "create_mem");
        Ok(handle)
    }

    /// Frees a buffer, releasing its storage.
    ///
    /// Returns false, doing nothing, if the handle is not live.
    pub fn free(&mut self, handle: BufHandle) -> bool {
        let Some(index) = handle.index() else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.generation != handle.generation() {
            return false;
        }
        let Some(buf) = slot.buf.take() else {
            return false;
        };

        slot.generation += 1;
        if slot.generation < u32::MAX {
            self.free.push(index as u32);
        }
        self.live -= 1;

        debug!(handle = %handle, len = buf.len(), capacity = buf.capacity(), "freed buffer");
        true
    }

    pub fn empty(&mut self, handle: BufHandle) -> BufResult<()> {
        trace!(handle = %handle, "empty");
        self.get_mut(handle)?.empty()
    }

    pub fn grow(&mut self, handle: BufHandle, extra: usize) -> BufResult<()> {
        trace!(handle = %handle, extra, "grow");
        self.get_mut(handle)?.grow(extra)
    }

    pub fn add(&mut self, handle: BufHandle, data: &[u8]) -> BufResult<()> {
        trace!(handle = %handle, len = data.len(), "add");
        self.get_mut(handle)?.add(data)
    }

    pub fn cat(&mut self, handle: BufHandle, data: &CStr) -> BufResult<()> {
        trace!(handle = %handle, "cat");
        self.get_mut(handle)?.cat(data)
    }

    pub fn add_len(&mut self, handle: BufHandle, n: usize) -> BufResult<()> {
        trace!(handle = %handle, n, "add_len");
        self.get_mut(handle)?.add_len(n)
    }

    pub fn shrink(&mut self, handle: BufHandle, n: usize) -> BufResult<usize> {
        trace!(handle = %handle, n, "shrink");
        self.get_mut(handle)?.shrink(n)
    }

    pub fn detach(&mut self, handle: BufHandle) -> BufResult<Detached> {
        trace!(handle = %handle, "detach");
        self.get_mut(handle)?.detach()
    }

    /// See [`Buf::detach_with`].
    pub fn detach_with<T>(
        &mut self,
        handle: BufHandle,
        f: impl FnOnce(&[u8]) -> Option<T>,
    ) -> BufResult<T> {
        trace!(handle = %handle, "detach_with");
        self.get_mut(handle)?.detach_with(f)
    }

    /// Spare bytes past the content; 0 for a handle that is not live.
    pub fn available(&self, handle: BufHandle) -> usize {
        self.get(handle).map(Buf::available).unwrap_or(0)
    }

    pub fn is_empty(&self, handle: BufHandle) -> BufResult<bool> {
        self.get(handle).map(Buf::is_empty)
    }

    pub fn len(&self, handle: BufHandle) -> BufResult<usize> {
        self.get(handle).map(Buf::len)
    }

    /// Runs `f` over the content.
    pub fn with_content<R>(&self, handle: BufHandle, f: impl FnOnce(&[u8]) -> R) -> BufResult<R> {
        self.get(handle).map(|buf| f(buf.as_bytes()))
    }

    /// Copies the content out.
    pub fn to_vec(&self, handle: BufHandle) -> BufResult<Vec<u8>> {
        self.with_content(handle, <[u8]>::to_vec)
    }

    /// Runs `f` over the spare space. Pair with [`Registry::add_len`].
    pub fn with_spare<R>(
        &mut self,
        handle: BufHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> BufResult<R> {
        let spare = self.get_mut(handle)?.spare_mut()?;
        Ok(f(spare))
    }
}

#[cfg(test)]
mod tests;
