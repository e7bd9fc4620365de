//! C Interface
//!
//! Exposes the process-wide registry to C callers with the conventions of
//! the libxml2 `xmlBuf` API.
//!
//! # Conventions
//!
//! ```text
//! handle            size_t, 0 = invalid
//! status            0 on success, -1 on failure
//! xmlBufIsEmpty     1 empty, 0 not empty, -1 invalid handle
//! xmlBufAvail/Use   0 for an invalid handle
//! xmlBufDetach      malloc'd NUL-terminated copy (release with free), or NULL
//! ```
//!
//! Pointers returned by `xmlBufContent` and `xmlBufEnd` stay valid until
//! the next call that mutates or frees the same buffer.
//!
//! # Example
//!
//! ```c
//! size_t buf = xmlBufCreate(10);
//! xmlBufAdd(buf, (const xmlChar *) "Hello", 5);
//! xmlChar *text = xmlBufDetach(buf);
//! free(text);
//! xmlBufFree(buf);
//! ```

#![allow(non_snake_case)]

mod types;

pub use types::{XmlBufPtr, XmlChar};

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use tracing::debug;

use crate::buf::{MemSource, StaticBytes};
use crate::registry::global;
use types::{created, handle, status};

/// Copies `bytes` into memory obtained from `malloc`.
fn malloc_copy(bytes: &[u8]) -> Option<*mut XmlChar> {
    // Safety: the block is checked for null and sized to `bytes`.
    unsafe {
        let out = libc::malloc(bytes.len()) as *mut XmlChar;
        if out.is_null() {
            return None;
        }
        ptr::copy_nonoverlapping(bytes.as_ptr(), out, bytes.len());
        Some(out)
    }
}

/// Creates an empty buffer able to hold at least `size` bytes.
#[no_mangle]
pub extern "C" fn xmlBufCreate(size: usize) -> XmlBufPtr {
    created("xmlBufCreate", global().with(|r| r.create(size)))
}

/// Creates a buffer from `size` bytes at `mem`.
///
/// With `is_static` non-zero the buffer only views the memory, which must
/// be NUL-terminated at `mem[size]`. Otherwise the bytes are copied.
///
/// # Safety
///
/// `mem` must be null or valid for reads of `size` bytes, plus the
/// terminator when static. Static memory must outlive the buffer and stay
/// unmodified.
#[no_mangle]
pub unsafe extern "C" fn xmlBufCreateMem(mem: *const XmlChar, size: usize, is_static: c_int) -> XmlBufPtr {
    let source = if mem.is_null() {
        None
    } else if is_static != 0 {
        if *mem.add(size) != 0 {
            debug!(size, "static memory is not NUL-terminated");
            return 0;
        }
        StaticBytes::from_raw(mem, size).map(MemSource::Static)
    } else {
        Some(MemSource::Copy(slice::from_raw_parts(mem, size)))
    };

    created("xmlBufCreateMem", global().with(|r| r.create_mem(source)))
}

/// Frees a buffer. Invalid or already freed handles are ignored.
#[no_mangle]
pub extern "C" fn xmlBufFree(buf: XmlBufPtr) {
    global().with(|r| r.free(handle(buf)));
}

/// Discards the content of a buffer, keeping its storage.
#[no_mangle]
pub extern "C" fn xmlBufEmpty(buf: XmlBufPtr) {
    if let Err(e) = global().with(|r| r.empty(handle(buf))) {
        debug!(buf, error = %e, "buffer call failed");
    }
}

/// Ensures at least `len` bytes are available.
#[no_mangle]
pub extern "C" fn xmlBufGrow(buf: XmlBufPtr, len: usize) -> c_int {
    status("xmlBufGrow", buf, global().with(|r| r.grow(handle(buf), len)))
}

/// Appends `len` bytes from `str_ptr`.
///
/// # Safety
///
/// `str_ptr` must be null or valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn xmlBufAdd(buf: XmlBufPtr, str_ptr: *const XmlChar, len: usize) -> c_int {
    if str_ptr.is_null() {
        debug!(buf, "xmlBufAdd called with null data");
        return -1;
    }
    let data = slice::from_raw_parts(str_ptr, len);
    status("xmlBufAdd", buf, global().with(|r| r.add(handle(buf), data)))
}

/// Appends the NUL-terminated string at `str_ptr`. A null string appends
/// nothing.
///
/// # Safety
///
/// `str_ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn xmlBufCat(buf: XmlBufPtr, str_ptr: *const XmlChar) -> c_int {
    let h = handle(buf);
    if str_ptr.is_null() {
        return if global().with(|r| r.contains(h)) { 0 } else { -1 };
    }
    let data = CStr::from_ptr(str_ptr as *const c_char);
    status("xmlBufCat", buf, global().with(|r| r.cat(h, data)))
}

/// Bytes available without reallocating; 0 for an invalid handle.
#[no_mangle]
pub extern "C" fn xmlBufAvail(buf: XmlBufPtr) -> usize {
    global().with(|r| r.available(handle(buf)))
}

#[no_mangle]
pub extern "C" fn xmlBufIsEmpty(buf: XmlBufPtr) -> c_int {
    match global().with(|r| r.is_empty(handle(buf))) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => e.code(),
    }
}

/// Marks `len` bytes written at [`xmlBufEnd`] as content.
#[no_mangle]
pub extern "C" fn xmlBufAddLen(buf: XmlBufPtr, len: usize) -> c_int {
    status("xmlBufAddLen", buf, global().with(|r| r.add_len(handle(buf), len)))
}

/// Hands the content to the caller as a `malloc`'d NUL-terminated string,
/// leaving the buffer empty. Returns null on failure.
#[no_mangle]
pub extern "C" fn xmlBufDetach(buf: XmlBufPtr) -> *mut XmlChar {
    match global().with(|r| r.detach_with(handle(buf), malloc_copy)) {
        Ok(out) => out,
        Err(e) => {
            debug!(buf, error = %e, "buffer call failed");
            ptr::null_mut()
        }
    }
}

/// Pointer to the content, or null for an invalid handle.
#[no_mangle]
pub extern "C" fn xmlBufContent(buf: XmlBufPtr) -> *const XmlChar {
    global().with(|r| match r.get(handle(buf)) {
        Ok(b) => b
            .as_bytes_with_nul()
            .unwrap_or_else(|| b.as_bytes())
            .as_ptr(),
        Err(_) => ptr::null(),
    })
}

/// Pointer just past the content, where [`xmlBufAddLen`] expects new bytes.
/// Null for invalid handles, static buffers and buffers with no storage.
#[no_mangle]
pub extern "C" fn xmlBufEnd(buf: XmlBufPtr) -> *mut XmlChar {
    global().with(|r| match r.get_mut(handle(buf)) {
        Ok(b) if b.has_storage() => b
            .spare_mut()
            .map(|spare| spare.as_mut_ptr())
            .unwrap_or(ptr::null_mut()),
        _ => ptr::null_mut(),
    })
}

/// Content length; 0 for an invalid handle.
#[no_mangle]
pub extern "C" fn xmlBufUse(buf: XmlBufPtr) -> usize {
    global().with(|r| r.len(handle(buf)).unwrap_or(0))
}

/// Removes `len` bytes from the front. Returns the count removed, 0 on
/// failure.
#[no_mangle]
pub extern "C" fn xmlBufShrink(buf: XmlBufPtr, len: usize) -> usize {
    match global().with(|r| r.shrink(handle(buf), len)) {
        Ok(n) => n,
        Err(e) => {
            debug!(buf, len, error = %e, "buffer call failed");
            0
        }
    }
}

#[cfg(test)]
mod tests;
