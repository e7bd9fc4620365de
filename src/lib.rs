//! Xmlbuf - Growable Byte Buffers for Markup Processing
//!
//! The byte buffer underneath a parser and serializer: growable storage with
//! a read-only static mode, ownership-transferring detach, and opaque handles
//! that never alias a freed buffer.
//!
//! # Features
//!
//! - **Dynamic buffers**: amortized growth, content kept NUL-terminated
//! - **Static buffers**: zero-copy views over caller memory, never mutated
//! - **Detach**: hand the content to the caller without destroying the buffer
//! - **Generation-tagged handles**: stale handles fail instead of aliasing
//! - **Pluggable allocation**: storage comes from an [`Allocator`]
//! - **C interface**: the `xmlBuf*` functions over a process-wide registry
//!
//! # Layers
//!
//! ```text
//! C caller ──► ffi::xmlBuf*  ──┐
//!                              ▼
//! Rust caller ──► BufManager ──► SharedRegistry (Mutex)
//!                                      │
//! Rust caller ──► Registry ◄───────────┘   handle -> Buf
//!                    │
//!                    ▼
//!                   Buf ──► Allocator
//! ```
//!
//! # Example
//!
//! ```rust
//! use xmlbuf::{BufError, MemSource, Registry};
//!
//! let mut registry = Registry::default();
//!
//! let buf = registry.create(10).unwrap();
//! registry.add(buf, b"<doc/>").unwrap();
//! assert_eq!(registry.detach(buf).unwrap(), b"<doc/>");
//! assert_eq!(registry.is_empty(buf), Ok(true));
//!
//! let view = registry.create_mem(Some(MemSource::new(b"fixed", true))).unwrap();
//! assert_eq!(registry.add(view, b"!"), Err(BufError::NotPermitted));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod buf;
pub mod config;
#[cfg(target_pointer_width = "64")]
pub mod ffi;
pub mod registry;

pub use buf::{
    Allocator, BudgetAllocator, Buf, BufError, BufMode, BufPolicy, BufResult, Detached,
    DetachPolicy, ErrorKind, MemSource, StaticBytes, SystemAllocator,
};
pub use config::{ConfigError, ConfigResult, XmlBufConfig};
pub use registry::{configure_global, global, BufHandle, BufManager, Registry, SharedRegistry};

/// Version of the xmlbuf crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
