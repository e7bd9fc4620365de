//! Process-wide registry.

use std::ffi::CStr;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use super::{BufHandle, Registry};
use crate::buf::{BufResult, Detached, MemSource};
use crate::config::{ConfigError, ConfigResult, XmlBufConfig};

/// A [`Registry`] behind a lock, shareable across threads.
#[derive(Debug)]
pub struct SharedRegistry {
    inner: Mutex<Registry>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Mutex::new(registry),
        }
    }

    /// Runs `f` with exclusive access to the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut registry = self.inner.lock();
        f(&mut registry)
    }
}

static GLOBAL: OnceCell<SharedRegistry> = OnceCell::new();

/// The process-wide registry, created with default settings on first use
/// unless [`configure_global`] ran earlier.
pub fn global() -> &'static SharedRegistry {
    GLOBAL.get_or_init(|| {
        debug!("initializing global buffer registry with defaults");
        SharedRegistry::new(Registry::default())
    })
}

/// Sets the configuration of the process-wide registry.
///
/// Must run before the registry is first used.
pub fn configure_global(config: &XmlBufConfig) -> ConfigResult<()> {
    config.validate()?;
    GLOBAL
        .set(SharedRegistry::new(Registry::new(config)))
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    debug!(?config, "configured global buffer registry");
    Ok(())
}

/// Buffer operations on the process-wide registry.
pub struct BufManager;

impl BufManager {
    /// Create an empty buffer and return its handle
    pub fn create(hint: usize) -> BufResult<BufHandle> {
        global().with(|r| r.create(hint))
    }

    /// Create a buffer from existing memory
    pub fn create_mem(mem: Option<MemSource<'_>>) -> BufResult<BufHandle> {
        global().with(|r| r.create_mem(mem))
    }

    /// Free a buffer; false if the handle was not live
    pub fn free(handle: BufHandle) -> bool {
        global().with(|r| r.free(handle))
    }

    pub fn empty(handle: BufHandle) -> BufResult<()> {
        global().with(|r| r.empty(handle))
    }

    pub fn grow(handle: BufHandle, extra: usize) -> BufResult<()> {
        global().with(|r| r.grow(handle, extra))
    }

    pub fn add(handle: BufHandle, data: &[u8]) -> BufResult<()> {
        global().with(|r| r.add(handle, data))
    }

    pub fn cat(handle: BufHandle, data: &CStr) -> BufResult<()> {
        global().with(|r| r.cat(handle, data))
    }

    pub fn add_len(handle: BufHandle, n: usize) -> BufResult<()> {
        global().with(|r| r.add_len(handle, n))
    }

    pub fn shrink(handle: BufHandle, n: usize) -> BufResult<usize> {
        global().with(|r| r.shrink(handle, n))
    }

    pub fn detach(handle: BufHandle) -> BufResult<Detached> {
        global().with(|r| r.detach(handle))
    }

    pub fn available(handle: BufHandle) -> usize {
        global().with(|r| r.available(handle))
    }

    pub fn is_empty(handle: BufHandle) -> BufResult<bool> {
        global().with(|r| r.is_empty(handle))
    }

    pub fn len(handle: BufHandle) -> BufResult<usize> {
        global().with(|r| r.len(handle))
    }

    /// Copy the content of a buffer
    pub fn to_vec(handle: BufHandle) -> BufResult<Vec<u8>> {
        global().with(|r| r.to_vec(handle))
    }

    /// Check if a handle refers to a live buffer
    pub fn exists(handle: BufHandle) -> bool {
        global().with(|r| r.contains(handle))
    }
}
