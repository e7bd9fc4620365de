//! Buffer error types.

use std::os::raw::c_int;
use thiserror::Error;

/// Errors returned by buffer and registry operations.
///
/// Every failing operation leaves the buffer exactly as it was before the
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufError {
    /// The handle does not refer to a live buffer.
    #[error("invalid buffer handle")]
    InvalidHandle,

    /// A mutating operation was attempted on a static buffer.
    #[error("operation not permitted on a static buffer")]
    NotPermitted,

    /// Detach was requested on an empty buffer under the reject-empty policy.
    #[error("nothing to detach from an empty buffer")]
    NothingToDetach,

    /// The allocator could not provide the requested storage.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },

    /// The requested capacity does not fit under the configured limit.
    #[error("capacity overflow: {requested} bytes requested, limit is {limit}")]
    CapacityOverflow { requested: usize, limit: usize },

    /// Creation was requested from absent source memory.
    #[error("source memory is missing")]
    MalformedInput,

    /// A length argument reaches past the valid range of the buffer.
    #[error("out of bounds: {requested} bytes requested, {available} available")]
    OutOfBounds { requested: usize, available: usize },
}

/// Coarse classification of a [`BufError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHandle,
    NotPermitted,
    AllocationFailure,
    MalformedInput,
    OutOfBounds,
}

impl BufError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BufError::InvalidHandle => ErrorKind::InvalidHandle,
            BufError::NotPermitted | BufError::NothingToDetach => ErrorKind::NotPermitted,
            BufError::AllocationFailure { .. } | BufError::CapacityOverflow { .. } => {
                ErrorKind::AllocationFailure
            }
            BufError::MalformedInput => ErrorKind::MalformedInput,
            BufError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        }
    }

    /// Return code reported through the C interface.
    pub fn code(&self) -> c_int {
        -1
    }
}

/// Result type for buffer operations.
pub type BufResult<T> = Result<T, BufError>;
