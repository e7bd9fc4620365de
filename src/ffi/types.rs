//! C-side types.

use std::os::raw::{c_int, c_uchar};

use tracing::debug;

use crate::buf::BufResult;
use crate::registry::BufHandle;

/// Byte type of buffer content.
pub type XmlChar = c_uchar;

/// Buffer handle as seen from C. Zero is the invalid handle.
pub type XmlBufPtr = usize;

pub(crate) fn handle(raw: XmlBufPtr) -> BufHandle {
    BufHandle::from_raw(raw as u64)
}

pub(crate) fn raw(handle: BufHandle) -> XmlBufPtr {
    handle.into_raw() as XmlBufPtr
}

/// Maps a fallible call onto the 0 / -1 convention.
pub(crate) fn status(op: &'static str, buf: XmlBufPtr, result: BufResult<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            debug!(op, buf, error = %e, "buffer call failed");
            e.code()
        }
    }
}

/// Handle of a successful creation, or the invalid handle.
pub(crate) fn created(op: &'static str, result: BufResult<BufHandle>) -> XmlBufPtr {
    match result {
        Ok(h) => raw(h),
        Err(e) => {
            debug!(op, error = %e, "buffer creation failed");
            raw(BufHandle::INVALID)
        }
    }
}
