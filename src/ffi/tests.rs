//! C Interface Tests

use super::*;

unsafe fn take_c_string(ptr: *mut XmlChar) -> Vec<u8> {
    assert!(!ptr.is_null());
    let bytes = CStr::from_ptr(ptr as *const c_char).to_bytes().to_vec();
    libc::free(ptr as *mut libc::c_void);
    bytes
}

#[test]
fn test_basic_lifecycle() {
    unsafe {
        let buf = xmlBufCreate(10);
        assert_ne!(buf, 0);

        assert_eq!(xmlBufGrow(buf, 100), 0);
        assert!(xmlBufAvail(buf) >= 100);

        assert_eq!(xmlBufAdd(buf, b"Hello".as_ptr(), 5), 0);
        assert_eq!(xmlBufIsEmpty(buf), 0);

        assert_eq!(xmlBufCat(buf, b", World!\0".as_ptr()), 0);
        assert_eq!(xmlBufUse(buf), 13);

        let content = CStr::from_ptr(xmlBufContent(buf) as *const c_char);
        assert_eq!(content.to_bytes(), b"Hello, World!");

        let detached = take_c_string(xmlBufDetach(buf));
        assert_eq!(detached, b"Hello, World!");
        assert_eq!(xmlBufIsEmpty(buf), 1);

        xmlBufFree(buf);
        assert_eq!(xmlBufIsEmpty(buf), -1);
    }
}

#[test]
fn test_invalid_handle() {
    unsafe {
        assert_eq!(xmlBufAdd(0, b"test".as_ptr(), 4), -1);
        assert_eq!(xmlBufGrow(0, 100), -1);
        assert_eq!(xmlBufCat(0, b"x\0".as_ptr()), -1);
        assert_eq!(xmlBufAddLen(0, 0), -1);
        assert_eq!(xmlBufIsEmpty(0), -1);
        assert_eq!(xmlBufAvail(0), 0);
        assert_eq!(xmlBufUse(0), 0);
        assert_eq!(xmlBufShrink(0, 1), 0);
        assert!(xmlBufDetach(0).is_null());
        assert!(xmlBufContent(0).is_null());
        assert!(xmlBufEnd(0).is_null());
        xmlBufEmpty(0);
        xmlBufFree(0);
    }
}

#[test]
fn test_null_memory_gives_invalid_handle() {
    unsafe {
        assert_eq!(xmlBufCreateMem(ptr::null(), 10, 0), 0);
        assert_eq!(xmlBufCreateMem(ptr::null(), 10, 1), 0);
    }
}

#[test]
fn test_static_buffer() {
    static CONTENT: &[u8] = b"Static content\0";
    unsafe {
        let buf = xmlBufCreateMem(CONTENT.as_ptr(), 14, 1);
        assert_ne!(buf, 0);

        assert_eq!(xmlBufAdd(buf, b"test".as_ptr(), 4), -1);
        assert_eq!(xmlBufGrow(buf, 100), -1);
        assert_eq!(xmlBufAddLen(buf, 0), -1);
        assert!(xmlBufDetach(buf).is_null());
        assert!(xmlBufEnd(buf).is_null());
        assert_eq!(xmlBufShrink(buf, 1), 0);
        xmlBufEmpty(buf);

        assert_eq!(xmlBufUse(buf), 14);
        assert_eq!(xmlBufAvail(buf), 0);
        assert_eq!(xmlBufIsEmpty(buf), 0);
        assert_eq!(xmlBufContent(buf), CONTENT.as_ptr());

        xmlBufFree(buf);
    }
    assert_eq!(CONTENT, b"Static content\0");
}

#[test]
fn test_static_requires_terminator() {
    let bytes = *b"abcdef";
    unsafe {
        assert_eq!(xmlBufCreateMem(bytes.as_ptr(), 3, 1), 0);
    }
}

#[test]
fn test_create_mem_copies() {
    let mut source = *b"copied";
    unsafe {
        let buf = xmlBufCreateMem(source.as_ptr(), source.len(), 0);
        assert_ne!(buf, 0);
        source[0] = b'X';

        let content = CStr::from_ptr(xmlBufContent(buf) as *const c_char);
        assert_eq!(content.to_bytes(), b"copied");
        xmlBufFree(buf);
    }
}

#[test]
fn test_null_data() {
    unsafe {
        let buf = xmlBufCreate(0);
        assert_eq!(xmlBufAdd(buf, ptr::null(), 0), -1);
        assert_eq!(xmlBufCat(buf, ptr::null()), 0);
        assert_eq!(xmlBufIsEmpty(buf), 1);
        xmlBufFree(buf);
    }
}

#[test]
fn test_write_at_end_then_add_len() {
    unsafe {
        let buf = xmlBufCreate(0);
        assert_eq!(xmlBufAdd(buf, b"ab".as_ptr(), 2), 0);

        let end = xmlBufEnd(buf);
        assert!(!end.is_null());
        ptr::copy_nonoverlapping(b"cd".as_ptr(), end, 2);
        assert_eq!(xmlBufAddLen(buf, 2), 0);

        let content = CStr::from_ptr(xmlBufContent(buf) as *const c_char);
        assert_eq!(content.to_bytes(), b"abcd");

        let too_much = xmlBufAvail(buf) + 1;
        assert_eq!(xmlBufAddLen(buf, too_much), -1);
        xmlBufFree(buf);
    }
}

#[test]
fn test_shrink() {
    unsafe {
        let buf = xmlBufCreate(0);
        xmlBufAdd(buf, b"Hello, World!".as_ptr(), 13);

        assert_eq!(xmlBufShrink(buf, 7), 7);
        assert_eq!(xmlBufUse(buf), 6);
        assert_eq!(xmlBufShrink(buf, 100), 0);
        assert_eq!(xmlBufShrink(buf, 0), 0);

        let content = CStr::from_ptr(xmlBufContent(buf) as *const c_char);
        assert_eq!(content.to_bytes(), b"World!");
        xmlBufFree(buf);
    }
}

#[test]
fn test_shrink_then_grow_and_add() {
    unsafe {
        let buf = xmlBufCreate(0);
        let fill = [b'a'; 64];
        assert_eq!(xmlBufAdd(buf, fill.as_ptr(), 64), 0);
        assert_eq!(xmlBufAvail(buf), 0);

        assert_eq!(xmlBufShrink(buf, 60), 60);
        assert_eq!(xmlBufGrow(buf, 50), 0);
        assert!(xmlBufAvail(buf) >= 50);
        assert_eq!(xmlBufEnd(buf) as *const XmlChar, xmlBufContent(buf).add(4));

        assert_eq!(xmlBufAdd(buf, b"tail".as_ptr(), 4), 0);
        let content = CStr::from_ptr(xmlBufContent(buf) as *const c_char);
        assert_eq!(content.to_bytes(), b"aaaatail");

        // Shrinking everything still leaves the end pointer usable.
        assert_eq!(xmlBufShrink(buf, 8), 8);
        assert!(!xmlBufEnd(buf).is_null());
        assert_eq!(xmlBufIsEmpty(buf), 1);
        assert_eq!(take_c_string(xmlBufDetach(buf)), b"");
        xmlBufFree(buf);
    }
}

#[test]
fn test_empty_reuse() {
    unsafe {
        let buf = xmlBufCreate(0);
        xmlBufAdd(buf, b"Some content".as_ptr(), 12);
        let available = xmlBufAvail(buf);

        xmlBufEmpty(buf);
        assert_eq!(xmlBufIsEmpty(buf), 1);
        assert_eq!(xmlBufAvail(buf), available + 12);

        assert_eq!(xmlBufAdd(buf, b"New".as_ptr(), 3), 0);
        assert_eq!(xmlBufUse(buf), 3);
        xmlBufFree(buf);
    }
}

#[test]
fn test_detach_empty_buffer() {
    unsafe {
        let buf = xmlBufCreate(0);
        let detached = take_c_string(xmlBufDetach(buf));
        assert!(detached.is_empty());

        // Storage is gone now; content still reads as an empty string.
        assert_eq!(*xmlBufContent(buf), 0);
        assert!(xmlBufEnd(buf).is_null());
        xmlBufFree(buf);
    }
}

#[test]
fn test_freed_handle_stays_invalid() {
    unsafe {
        let old = xmlBufCreate(0);
        xmlBufFree(old);
        let new = xmlBufCreate(0);

        assert_ne!(old, new);
        assert_eq!(xmlBufAdd(old, b"x".as_ptr(), 1), -1);
        assert_eq!(xmlBufIsEmpty(new), 1);
        xmlBufFree(new);
    }
}
