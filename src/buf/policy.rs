//! Sizing and detach rules applied to every buffer.

use serde::{Deserialize, Serialize};

use super::error::{BufError, BufResult};

/// Capacity used when a creation hint is below it.
pub const DEFAULT_MIN_CAPACITY: usize = 64;

/// Extra bytes added on a grow step that does not double.
pub const DEFAULT_GROWTH_HEADROOM: usize = 100;

/// Largest capacity a buffer may reach. One byte is kept for the terminator.
pub const MAX_CAPACITY: usize = usize::MAX - 1;

/// What detach does when a dynamic buffer holds no content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetachPolicy {
    /// Hand out a zero-length, NUL-terminated sequence.
    #[default]
    AllowEmpty,
    /// Fail with [`BufError::NothingToDetach`] and leave the buffer alone.
    RejectEmpty,
}

/// Growth limits and detach behaviour shared by buffers of one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufPolicy {
    pub min_capacity: usize,
    pub growth_headroom: usize,
    pub max_capacity: usize,
    pub detach: DetachPolicy,
}

impl Default for BufPolicy {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_CAPACITY,
            growth_headroom: DEFAULT_GROWTH_HEADROOM,
            max_capacity: MAX_CAPACITY,
            detach: DetachPolicy::AllowEmpty,
        }
    }
}

impl BufPolicy {
    /// Effective capacity limit. Never above [`MAX_CAPACITY`], whatever
    /// `max_capacity` says, so the terminator byte always fits.
    pub fn limit(&self) -> usize {
        self.max_capacity.min(MAX_CAPACITY)
    }

    /// Capacity for a freshly created buffer given the caller's hint.
    pub fn initial_capacity(&self, hint: usize) -> BufResult<usize> {
        let limit = self.limit();
        if hint > limit {
            return Err(BufError::CapacityOverflow {
                requested: hint,
                limit,
            });
        }
        Ok(hint.max(self.min_capacity).min(limit))
    }

    /// Capacity to reallocate to so that `extra` bytes fit after `len`.
    ///
    /// Doubles when the current capacity already exceeds the request,
    /// otherwise sizes to the request plus headroom. The result always
    /// leaves at least `extra` bytes available and never passes
    /// [`BufPolicy::limit`].
    pub fn next_capacity(&self, len: usize, capacity: usize, extra: usize) -> BufResult<usize> {
        let limit = self.limit();
        if extra > limit.saturating_sub(len) {
            return Err(BufError::CapacityOverflow {
                requested: len.saturating_add(extra),
                limit,
            });
        }

        let next = if capacity > extra {
            if capacity <= limit / 2 {
                capacity * 2
            } else {
                limit
            }
        } else {
            let size = len + extra;
            match size.checked_add(self.growth_headroom) {
                Some(padded) if padded <= limit => padded,
                _ => size,
            }
        };

        Ok(next)
    }
}
