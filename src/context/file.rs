/*!
 * File Operation Context
 * Read-only view of an intercepted filesystem operation
 */

use crate::core::limits::MAX_FILENAME_LEN;
use crate::core::types::ContainerId;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Requested access, using the kernel's MAY_* values
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AccessMask: u32 {
        const EXEC = 0x1;
        const WRITE = 0x2;
        const READ = 0x4;
        const APPEND = 0x8;
    }
}

impl AccessMask {
    /// True when the request includes WRITE or EXEC
    #[inline]
    pub fn writes_or_executes(self) -> bool {
        self.intersects(AccessMask::WRITE | AccessMask::EXEC)
    }
}

/// File name captured into a fixed, NUL-terminated buffer
///
/// Capture copies at most `MAX_FILENAME_LEN - 1` bytes and stops at the
/// first NUL in the source, so the source does not need to be terminated.
/// A longer name keeps only its prefix and is flagged as truncated.
#[derive(Clone, Copy)]
pub struct FileName {
    buf: [u8; MAX_FILENAME_LEN],
    len: usize,
    truncated: bool,
}

impl FileName {
    /// Longest name that fits with its terminator
    pub const MAX_LEN: usize = MAX_FILENAME_LEN - 1;

    pub fn capture(src: &[u8]) -> Self {
        let mut buf = [0u8; MAX_FILENAME_LEN];
        let mut len = 0;

        for (dst, &byte) in buf[..Self::MAX_LEN].iter_mut().zip(src) {
            if byte == 0 {
                break;
            }
            *dst = byte;
            len += 1;
        }

        let truncated = len == Self::MAX_LEN && src.get(Self::MAX_LEN).is_some_and(|&b| b != 0);
        Self {
            buf,
            len,
            truncated,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Captured bytes including the terminating NUL
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Byte-exact suffix test over the captured prefix only
    #[inline]
    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        if self.len < suffix.len() {
            return false;
        }
        &self.buf[self.len - suffix.len()..self.len] == suffix
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        Self::capture(name.as_bytes())
    }
}

impl PartialEq for FileName {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes() && self.truncated == other.truncated
    }
}

impl Eq for FileName {}

impl fmt::Debug for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileName")
            .field("name", &String::from_utf8_lossy(self.as_bytes()))
            .field("truncated", &self.truncated)
            .finish()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl Serialize for FileName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<'de> Deserialize<'de> for FileName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::capture(name.as_bytes()))
    }
}

/// Context handed to the filesystem evaluators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOperationContext {
    /// Calling container
    pub container_id: ContainerId,
    /// Target name, when the hook provides one
    pub name: Option<FileName>,
    /// Requested access, for permission checks
    pub mask: Option<AccessMask>,
}

impl FileOperationContext {
    /// Context carrying only the caller (chmod, rmdir)
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            name: None,
            mask: None,
        }
    }

    /// Permission check on a named file
    pub fn permission(container_id: ContainerId, name: &[u8], mask: AccessMask) -> Self {
        Self {
            container_id,
            name: Some(FileName::capture(name)),
            mask: Some(mask),
        }
    }

    pub fn with_name(mut self, name: &[u8]) -> Self {
        self.name = Some(FileName::capture(name));
        self
    }

    pub fn with_mask(mut self, mask: AccessMask) -> Self {
        self.mask = Some(mask);
        self
    }
}
