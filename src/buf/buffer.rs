//! The buffer type.

use std::ffi::CStr;
use std::fmt;
use std::mem;
use std::sync::Arc;

use tracing::{debug, warn};

use super::alloc::{Allocator, SystemAllocator};
use super::detached::Detached;
use super::error::{BufError, BufResult};
use super::policy::{BufPolicy, DetachPolicy};
use super::storage::{BufMode, MemSource, StaticBytes, Storage};

/// A growable byte buffer, or a read-only view over external memory.
///
/// Dynamic buffers own their storage, obtained from an [`Allocator`], and
/// keep their content NUL-terminated. Static buffers wrap memory owned by
/// the caller; every mutating method rejects them with
/// [`BufError::NotPermitted`].
///
/// All methods are all-or-nothing: on error the buffer is unchanged.
///
/// # Example
///
/// ```rust
/// use std::ffi::CStr;
/// use xmlbuf::Buf;
///
/// let mut buf = Buf::new(10).unwrap();
/// buf.add(b"Hello").unwrap();
/// buf.cat(CStr::from_bytes_with_nul(b", World!\0").unwrap()).unwrap();
/// assert_eq!(buf.as_bytes(), b"Hello, World!");
///
/// let detached = buf.detach().unwrap();
/// assert_eq!(detached.as_bytes(), b"Hello, World!");
/// assert!(buf.is_empty());
/// ```
pub struct Buf {
    storage: Storage,
    policy: BufPolicy,
    alloc: Arc<dyn Allocator>,
}

fn block_capacity(block: &[u8]) -> usize {
    block.len().saturating_sub(1)
}

fn allocate(alloc: &dyn Allocator, size: usize) -> BufResult<Vec<u8>> {
    alloc.allocate(size).ok_or_else(|| {
        warn!(requested = size, "buffer allocation failed");
        BufError::AllocationFailure { requested: size }
    })
}

fn dynamic(storage: &mut Storage) -> BufResult<(&mut Vec<u8>, &mut usize, &mut usize)> {
    match storage {
        Storage::Dynamic { block, start, len } => Ok((block, start, len)),
        Storage::Static(_) => Err(BufError::NotPermitted),
    }
}

impl Buf {
    /// Creates an empty dynamic buffer with default policy and the system
    /// allocator.
    pub fn new(hint: usize) -> BufResult<Self> {
        Self::with_policy(hint, BufPolicy::default(), Arc::new(SystemAllocator))
    }

    /// Creates an empty dynamic buffer holding at least `hint` bytes.
    pub fn with_policy(hint: usize, policy: BufPolicy, alloc: Arc<dyn Allocator>) -> BufResult<Self> {
        let capacity = policy.initial_capacity(hint)?;
        let block = allocate(alloc.as_ref(), capacity + 1)?;

        debug!(hint, capacity, "created dynamic buffer");
        Ok(Self {
            storage: Storage::Dynamic {
                block,
                start: 0,
                len: 0,
            },
            policy,
            alloc,
        })
    }

    /// Creates a buffer from existing memory.
    ///
    /// `None` stands for absent memory and fails with
    /// [`BufError::MalformedInput`].
    pub fn from_mem(
        mem: Option<MemSource<'_>>,
        policy: BufPolicy,
        alloc: Arc<dyn Allocator>,
    ) -> BufResult<Self> {
        match mem.ok_or(BufError::MalformedInput)? {
            MemSource::Static(view) => {
                debug!(len = view.len(), "created static buffer");
                Ok(Self {
                    storage: Storage::Static(view),
                    policy,
                    alloc,
                })
            }
            MemSource::Copy(bytes) => {
                let len = bytes.len();
                let capacity = policy.initial_capacity(len)?;
                let mut block = allocate(alloc.as_ref(), capacity + 1)?;
                block[..len].copy_from_slice(bytes);

                debug!(len, capacity, "created dynamic buffer from memory");
                Ok(Self {
                    storage: Storage::Dynamic {
                        block,
                        start: 0,
                        len,
                    },
                    policy,
                    alloc,
                })
            }
        }
    }

    /// Creates a dynamic buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> BufResult<Self> {
        Self::from_mem(
            Some(MemSource::Copy(bytes)),
            BufPolicy::default(),
            Arc::new(SystemAllocator),
        )
    }

    /// Creates a static buffer viewing `bytes`.
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            storage: Storage::Static(StaticBytes::from_static(bytes)),
            policy: BufPolicy::default(),
            alloc: Arc::new(SystemAllocator),
        }
    }

    pub fn mode(&self) -> BufMode {
        self.storage.mode()
    }

    pub fn is_static(&self) -> bool {
        self.mode() == BufMode::Static
    }

    pub fn policy(&self) -> &BufPolicy {
        &self.policy
    }

    /// Number of content bytes.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Dynamic { len, .. } => *len,
            Storage::Static(view) => view.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of storage for content from its current start. A static
    /// buffer reports its length.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Dynamic { block, start, .. } => block_capacity(block) - start,
            Storage::Static(view) => view.len(),
        }
    }

    /// True while a dynamic buffer owns a storage block. Detach leaves the
    /// buffer without one until the next grow.
    pub fn has_storage(&self) -> bool {
        matches!(&self.storage, Storage::Dynamic { block, .. } if !block.is_empty())
    }

    /// Bytes that can be added without reallocating.
    pub fn available(&self) -> usize {
        self.capacity() - self.len()
    }

    /// The content.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Dynamic { block, start, len } => &block[*start..*start + *len],
            Storage::Static(view) => view.as_slice(),
        }
    }

    /// The content followed by its NUL terminator.
    ///
    /// Returns `None` for static buffers, whose memory past the content is
    /// not ours to inspect.
    pub fn as_bytes_with_nul(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Dynamic { block, .. } if block.is_empty() => Some(b"\0"),
            Storage::Dynamic { block, start, len } => Some(&block[*start..=*start + *len]),
            Storage::Static(_) => None,
        }
    }

    /// Resets the length to zero, keeping the storage for reuse.
    pub fn empty(&mut self) -> BufResult<()> {
        let (block, start, len) = dynamic(&mut self.storage)?;
        *start = 0;
        *len = 0;
        if let Some(first) = block.first_mut() {
            *first = 0;
        }
        Ok(())
    }

    /// Ensures at least `extra` bytes are available past the content.
    pub fn grow(&mut self, extra: usize) -> BufResult<()> {
        let (block, start, len) = dynamic(&mut self.storage)?;
        let total = block_capacity(block);
        let capacity = total - *start;
        if extra <= capacity - *len {
            return Ok(());
        }

        // Space shrunk off the front is enough once content moves back.
        if extra <= total - *len {
            block.copy_within(*start..=*start + *len, 0);
            debug!(moved = *len, reclaimed = *start, "compacted buffer");
            *start = 0;
            return Ok(());
        }

        let next = match self.policy.next_capacity(*len, capacity, extra) {
            Ok(next) => next,
            Err(e) => {
                warn!(len = *len, extra, error = %e, "grow refused");
                return Err(e);
            }
        };

        let mut fresh = allocate(self.alloc.as_ref(), next + 1)?;
        fresh[..*len].copy_from_slice(&block[*start..*start + *len]);
        *start = 0;
        let old = mem::replace(block, fresh);
        self.alloc.release(old);

        debug!(from = capacity, to = next, len = *len, "grew buffer");
        Ok(())
    }

    /// Appends `data`, growing first if needed.
    pub fn add(&mut self, data: &[u8]) -> BufResult<()> {
        if self.is_static() {
            return Err(BufError::NotPermitted);
        }
        if data.is_empty() {
            return Ok(());
        }
        if data.len() > self.available() {
            self.grow(data.len())?;
        }

        let (block, start, len) = dynamic(&mut self.storage)?;
        let end = *start + *len;
        block[end..end + data.len()].copy_from_slice(data);
        *len += data.len();
        block[*start + *len] = 0;
        Ok(())
    }

    /// Appends the bytes of `data` up to its terminator.
    pub fn cat(&mut self, data: &CStr) -> BufResult<()> {
        self.add(data.to_bytes())
    }

    /// Scratch space between the end of the content and the end of the
    /// storage. Bytes written here become content through [`Buf::add_len`].
    pub fn spare_mut(&mut self) -> BufResult<&mut [u8]> {
        let (block, start, len) = dynamic(&mut self.storage)?;
        let total = block_capacity(block);
        Ok(&mut block[*start + *len..total])
    }

    /// Extends the content over `n` bytes already written into the spare
    /// space.
    pub fn add_len(&mut self, n: usize) -> BufResult<()> {
        let (block, start, len) = dynamic(&mut self.storage)?;
        let available = block_capacity(block) - *start - *len;
        if n > available {
            return Err(BufError::OutOfBounds {
                requested: n,
                available,
            });
        }
        if n == 0 {
            return Ok(());
        }

        *len += n;
        block[*start + *len] = 0;
        Ok(())
    }

    /// Drops `n` bytes from the front of the content without moving the
    /// rest. The space is reclaimed by a later [`Buf::grow`] or
    /// [`Buf::empty`].
    pub fn shrink(&mut self, n: usize) -> BufResult<usize> {
        let (_, start, len) = dynamic(&mut self.storage)?;
        if n > *len {
            return Err(BufError::OutOfBounds {
                requested: n,
                available: *len,
            });
        }
        if n == 0 {
            return Ok(0);
        }

        *start += n;
        *len -= n;
        Ok(n)
    }

    fn check_detach(&self) -> BufResult<()> {
        match &self.storage {
            Storage::Static(_) => Err(BufError::NotPermitted),
            Storage::Dynamic { len: 0, .. } if self.policy.detach == DetachPolicy::RejectEmpty => {
                Err(BufError::NothingToDetach)
            }
            Storage::Dynamic { .. } => Ok(()),
        }
    }

    /// Transfers the content to the caller.
    ///
    /// The storage itself changes hands, so nothing is allocated. The
    /// buffer is left alive with no content and no capacity.
    pub fn detach(&mut self) -> BufResult<Detached> {
        self.check_detach()?;

        let (block, start, len) = dynamic(&mut self.storage)?;
        let mut taken = if block.is_empty() {
            allocate(self.alloc.as_ref(), 1)?
        } else {
            if *start > 0 {
                block.copy_within(*start..=*start + *len, 0);
            }
            mem::take(block)
        };
        taken.truncate(*len + 1);

        debug!(bytes = *len, "detached buffer content");
        *start = 0;
        *len = 0;
        Ok(Detached::from_block_with_nul(taken))
    }

    /// Detaches by handing the NUL-terminated content to `f`, which produces
    /// the caller's own copy.
    ///
    /// If `f` returns `None` the detach fails with
    /// [`BufError::AllocationFailure`] and the buffer keeps its content.
    pub fn detach_with<T>(&mut self, f: impl FnOnce(&[u8]) -> Option<T>) -> BufResult<T> {
        self.check_detach()?;

        let with_nul = self.as_bytes_with_nul().ok_or(BufError::NotPermitted)?;
        let requested = with_nul.len();
        let out = f(with_nul).ok_or_else(|| {
            warn!(requested, "detach copy failed");
            BufError::AllocationFailure { requested }
        })?;

        let (block, start, len) = dynamic(&mut self.storage)?;
        debug!(bytes = *len, "detached buffer content");
        *start = 0;
        *len = 0;
        self.alloc.release(mem::take(block));
        Ok(out)
    }
}

impl Drop for Buf {
    fn drop(&mut self) {
        if let Storage::Dynamic { block, .. } = &mut self.storage {
            if !block.is_empty() {
                self.alloc.release(mem::take(block));
            }
        }
    }
}

impl fmt::Debug for Buf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buf")
            .field("mode", &self.mode())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
