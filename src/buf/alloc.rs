//! Storage allocation for dynamic buffers.
//!
//! Buffers never call the global allocator directly. Every block of dynamic
//! storage is obtained from, and handed back to, an [`Allocator`], so the
//! backing memory source can be swapped per target environment.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of zero-filled storage blocks.
pub trait Allocator: Send + Sync + fmt::Debug {
    /// Allocates a zero-filled block of exactly `size` bytes.
    ///
    /// Returns `None` when the request cannot be satisfied.
    fn allocate(&self, size: usize) -> Option<Vec<u8>>;

    /// Returns a block previously obtained from [`Allocator::allocate`].
    fn release(&self, block: Vec<u8>);
}

/// Allocator backed by the process heap, using fallible reservation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        let mut block = Vec::new();
        block.try_reserve_exact(size).ok()?;
        block.resize(size, 0);
        Some(block)
    }

    fn release(&self, block: Vec<u8>) {
        drop(block);
    }
}

/// Allocator that refuses requests once a byte budget is spent.
///
/// Released blocks are credited back to the budget. Blocks handed to callers
/// by a detach leave the accounting for good.
#[derive(Debug)]
pub struct BudgetAllocator {
    remaining: AtomicUsize,
}

impl BudgetAllocator {
    /// Creates an allocator that hands out at most `budget` bytes at a time.
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
        }
    }

    /// Bytes still available for allocation.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl Allocator for BudgetAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                left.checked_sub(size)
            })
            .ok()?;

        match SystemAllocator.allocate(size) {
            Some(block) => Some(block),
            None => {
                self.remaining.fetch_add(size, Ordering::AcqRel);
                None
            }
        }
    }

    fn release(&self, block: Vec<u8>) {
        self.remaining.fetch_add(block.len(), Ordering::AcqRel);
    }
}
