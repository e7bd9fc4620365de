//! Registry Tests

use std::ffi::CStr;
use std::sync::Arc;

use super::*;
use crate::buf::{BudgetAllocator, DetachPolicy, ErrorKind, DEFAULT_MIN_CAPACITY};

// =============================================================================
// handles
// =============================================================================

#[test]
fn test_handle_encoding() {
    let handle = BufHandle::new(0, 1);
    assert_eq!(handle.into_raw(), (1 << 32) | 1);
    assert_eq!(handle.index(), Some(0));
    assert_eq!(handle.generation(), 1);
    assert_eq!(BufHandle::from_raw(handle.into_raw()), handle);
    assert_eq!(handle.to_string(), "buf#0.1");
}

#[test]
fn test_invalid_handle() {
    assert!(BufHandle::INVALID.is_invalid());
    assert_eq!(BufHandle::default(), BufHandle::INVALID);
    assert_eq!(BufHandle::INVALID.index(), None);
    assert_eq!(BufHandle::INVALID.to_string(), "buf#invalid");
}

#[test]
fn test_created_handles_are_distinct_and_valid() {
    let mut registry = Registry::default();
    let a = registry.create(0).unwrap();
    let b = registry.create(0).unwrap();

    assert!(!a.is_invalid());
    assert!(!b.is_invalid());
    assert_ne!(a, b);
    assert_eq!(registry.live(), 2);
}

// =============================================================================
// free
// =============================================================================

#[test]
fn test_free_twice_is_noop() {
    let mut registry = Registry::default();
    let handle = registry.create(0).unwrap();

    assert!(registry.free(handle));
    assert!(!registry.free(handle));
    assert!(!registry.free(BufHandle::INVALID));
    assert_eq!(registry.live(), 0);
}

#[test]
fn test_stale_handle_after_slot_reuse() {
    let mut registry = Registry::default();
    let old = registry.create(0).unwrap();
    registry.free(old);

    let new = registry.create(0).unwrap();
    assert_eq!(new.index(), old.index());
    assert_ne!(new, old);

    assert_eq!(registry.add(old, b"x"), Err(BufError::InvalidHandle));
    assert!(!registry.free(old));
    assert!(registry.contains(new));
    assert_eq!(registry.live(), 1);
}

#[test]
fn test_forged_handle_rejected() {
    let mut registry = Registry::default();
    let handle = registry.create(0).unwrap();

    let wrong_generation = BufHandle::from_raw(handle.into_raw() + (1 << 32));
    let out_of_range = BufHandle::from_raw(handle.into_raw() + 10);

    assert!(!registry.contains(wrong_generation));
    assert!(!registry.contains(out_of_range));
    assert_eq!(registry.grow(out_of_range, 10), Err(BufError::InvalidHandle));
}

#[test]
fn test_free_releases_storage() {
    let alloc = Arc::new(BudgetAllocator::new(1000));
    let mut registry = Registry::with_allocator(BufPolicy::default(), alloc.clone());

    let handle = registry.create(0).unwrap();
    registry.add(handle, &[b'z'; 300]).unwrap();
    assert!(alloc.remaining() < 1000);

    registry.free(handle);
    assert_eq!(alloc.remaining(), 1000);
}

// =============================================================================
// operations through handles
// =============================================================================

#[test]
fn test_invalid_handle_operations() {
    let mut registry = Registry::default();
    let h = BufHandle::INVALID;

    assert_eq!(registry.add(h, b"data"), Err(BufError::InvalidHandle));
    assert_eq!(registry.grow(h, 10), Err(BufError::InvalidHandle));
    assert_eq!(registry.empty(h), Err(BufError::InvalidHandle));
    assert_eq!(registry.add_len(h, 0), Err(BufError::InvalidHandle));
    assert_eq!(registry.shrink(h, 0), Err(BufError::InvalidHandle));
    assert_eq!(registry.detach(h), Err(BufError::InvalidHandle));
    assert_eq!(registry.is_empty(h), Err(BufError::InvalidHandle));
    assert_eq!(registry.len(h), Err(BufError::InvalidHandle));
    assert_eq!(registry.to_vec(h), Err(BufError::InvalidHandle));
    assert_eq!(registry.available(h), 0);
}

#[test]
fn test_create_mem_absent_source() {
    let mut registry = Registry::default();
    let err = registry.create_mem(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert_eq!(registry.live(), 0);
}

#[test]
fn test_add_and_read_back() {
    let mut registry = Registry::default();
    let h = registry.create(10).unwrap();

    registry.grow(h, 100).unwrap();
    assert!(registry.available(h) >= 100);

    registry.add(h, b"Hello").unwrap();
    assert_eq!(registry.is_empty(h), Ok(false));
    registry
        .cat(h, CStr::from_bytes_with_nul(b", World!\0").unwrap())
        .unwrap();

    assert_eq!(registry.len(h), Ok(13));
    assert_eq!(registry.to_vec(h).unwrap(), b"Hello, World!");
    assert_eq!(
        registry.with_content(h, |bytes| bytes.ends_with(b"World!")),
        Ok(true)
    );
}

#[test]
fn test_spare_and_add_len() {
    let mut registry = Registry::default();
    let h = registry.create(0).unwrap();

    let written = registry
        .with_spare(h, |spare| {
            spare[..4].copy_from_slice(b"abcd");
            4
        })
        .unwrap();
    registry.add_len(h, written).unwrap();
    assert_eq!(registry.to_vec(h).unwrap(), b"abcd");

    assert_eq!(registry.shrink(h, 2), Ok(2));
    assert_eq!(registry.to_vec(h).unwrap(), b"cd");
}

#[test]
fn test_static_through_handles() {
    let mut registry = Registry::default();
    let h = registry
        .create_mem(Some(MemSource::new(b"Static content", true)))
        .unwrap();

    assert_eq!(registry.add(h, b"more"), Err(BufError::NotPermitted));
    assert_eq!(registry.grow(h, 10), Err(BufError::NotPermitted));
    assert_eq!(registry.detach(h), Err(BufError::NotPermitted));
    assert!(registry.with_spare(h, |_| ()).is_err());
    assert_eq!(registry.available(h), 0);
    assert_eq!(registry.is_empty(h), Ok(false));
    assert_eq!(registry.to_vec(h).unwrap(), b"Static content");

    assert!(registry.free(h));
}

#[test]
fn test_detach_keeps_handle_alive() {
    let mut registry = Registry::default();
    let h = registry.create(0).unwrap();
    registry.add(h, b"content").unwrap();

    let detached = registry.detach(h).unwrap();
    assert_eq!(detached, b"content");
    assert_eq!(registry.is_empty(h), Ok(true));
    assert!(registry.contains(h));

    registry.add(h, b"more").unwrap();
    assert_eq!(registry.to_vec(h).unwrap(), b"more");
    assert!(registry.free(h));
}

#[test]
fn test_registry_policy_from_config() {
    let mut config = XmlBufConfig::default();
    config.buffer.min_capacity = 8;
    config.detach.policy = DetachPolicy::RejectEmpty;

    let mut registry = Registry::new(&config);
    let h = registry.create(0).unwrap();

    assert_eq!(registry.available(h), 8);
    assert_eq!(registry.detach(h), Err(BufError::NothingToDetach));
    assert_ne!(registry.policy().min_capacity, DEFAULT_MIN_CAPACITY);
}

#[test]
fn test_shared_registry() {
    let shared = SharedRegistry::new(Registry::default());
    let h = shared.with(|r| r.create(0)).unwrap();
    shared.with(|r| r.add(h, b"shared")).unwrap();
    assert_eq!(shared.with(|r| r.to_vec(h)).unwrap(), b"shared");
    assert!(shared.with(|r| r.free(h)));
}
