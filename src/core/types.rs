/*!
 * Core Types
 * Common types shared by the stores, evaluators and host
 */

use super::limits::{EMPTY_CONTAINER_ID, TC_ACT_OK, TC_ACT_SHOT};
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot index into the membership table (0..64)
pub type SlotIndex = usize;

/// Stable 64-bit container (cgroup) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

impl ContainerId {
    /// The reserved "empty slot" value; never a real container
    pub const EMPTY: ContainerId = ContainerId(EMPTY_CONTAINER_ID);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == EMPTY_CONTAINER_ID
    }
}

impl From<u64> for ContainerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one evaluator invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    #[inline]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Verdict::Allow)
    }

    #[inline]
    pub const fn is_denied(self) -> bool {
        matches!(self, Verdict::Deny)
    }

    /// Return code expected from an LSM program (0 or -EPERM)
    #[inline]
    pub fn as_lsm_return(self) -> i32 {
        match self {
            Verdict::Allow => 0,
            Verdict::Deny => -(Errno::EPERM as i32),
        }
    }

    /// Action expected from a traffic-control program
    #[inline]
    pub const fn as_tc_action(self) -> i32 {
        match self {
            Verdict::Allow => TC_ACT_OK,
            Verdict::Deny => TC_ACT_SHOT,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => f.write_str("allow"),
            Verdict::Deny => f.write_str("deny"),
        }
    }
}

/// Interception points an evaluator can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    Chmod,
    Rmdir,
    FilePermission,
    TcIngress,
}

impl Hook {
    pub const ALL: [Hook; 4] = [Hook::Chmod, Hook::Rmdir, Hook::FilePermission, Hook::TcIngress];

    /// Program section the host attaches at
    pub const fn section(self) -> &'static str {
        match self {
            Hook::Chmod => "lsm/path_chmod",
            Hook::Rmdir => "lsm/path_rmdir",
            Hook::FilePermission => "lsm/file_permission",
            Hook::TcIngress => "tc",
        }
    }

    /// Short operation name attached to diagnostics
    pub const fn operation(self) -> &'static str {
        match self {
            Hook::Chmod => "chmod",
            Hook::Rmdir => "rmdir",
            Hook::FilePermission => "file_permission",
            Hook::TcIngress => "ingress",
        }
    }

    /// Dense index, used by the attachment table
    pub(crate) const fn index(self) -> usize {
        match self {
            Hook::Chmod => 0,
            Hook::Rmdir => 1,
            Hook::FilePermission => 2,
            Hook::TcIngress => 3,
        }
    }

    pub const fn is_lsm(self) -> bool {
        !matches!(self, Hook::TcIngress)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}
