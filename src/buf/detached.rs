//! Content handed out by detach.

use std::ffi::CString;
use std::fmt;
use std::ops::Deref;

/// Bytes detached from a buffer, owned exclusively by the caller.
///
/// The sequence is always NUL-terminated; [`Detached::as_bytes`] excludes
/// the terminator, [`Detached::as_bytes_with_nul`] includes it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Detached {
    // Invariant: non-empty, last byte is 0.
    bytes: Vec<u8>,
}

impl Detached {
    /// Wraps a block whose final byte is the NUL terminator.
    pub(crate) fn from_block_with_nul(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.last(), Some(&0));
        Self { bytes }
    }

    /// Number of content bytes, not counting the terminator.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Returns true if no content bytes were detached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Content bytes followed by the NUL terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the value, returning the content without the terminator.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.bytes.pop();
        self.bytes
    }

    /// Consumes the value, returning the content with the terminator.
    pub fn into_vec_with_nul(self) -> Vec<u8> {
        self.bytes
    }

    /// Converts into a C string.
    ///
    /// Fails, returning the bytes unchanged, if the content holds an
    /// interior NUL.
    pub fn into_c_string(self) -> Result<CString, Self> {
        CString::from_vec_with_nul(self.bytes).map_err(|e| Self {
            bytes: e.into_bytes(),
        })
    }
}

impl Deref for Detached {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Detached {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<[u8]> for Detached {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for Detached {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for Detached {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == &other[..]
    }
}

impl fmt::Debug for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detached")
            .field("len", &self.len())
            .field("bytes", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}
