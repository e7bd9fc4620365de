//! Growable Byte Buffers
//!
//! The core buffer type, independent of any handle table.
//!
//! # Modes
//!
//! ```text
//! Dynamic: [ consumed | content ... | 0 | spare ... ]   owned, growable
//!                      ^ start       ^ start + len  ^ end of block
//!
//! Static:  [ content ... ]                  borrowed view, read-only
//! ```
//!
//! Dynamic storage always keeps a NUL byte right after the content, so the
//! content can be detached as a C string without a fresh allocation.
//!
//! # Growth
//!
//! When an append does not fit, capacity doubles if it already exceeds the
//! request, otherwise it becomes `len + extra + growth_headroom`. Both paths
//! are capped by [`BufPolicy::limit`].
//!
//! Shrinking from the front only moves a start offset. The space it frees
//! is reclaimed by compacting when a later grow needs it, or by `empty`.

mod alloc;
mod buffer;
mod detached;
mod error;
mod policy;
mod storage;

pub use alloc::{Allocator, BudgetAllocator, SystemAllocator};
pub use buffer::Buf;
pub use detached::Detached;
pub use error::{BufError, BufResult, ErrorKind};
pub use policy::{BufPolicy, DetachPolicy, DEFAULT_GROWTH_HEADROOM, DEFAULT_MIN_CAPACITY, MAX_CAPACITY};
pub use storage::{BufMode, MemSource, StaticBytes};
