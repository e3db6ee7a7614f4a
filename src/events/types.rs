/*!
 * Decision Event Types
 * Advisory records of evaluator decisions
 */

use crate::context::{AccessMask, FileName, Layer};
use crate::core::types::{ContainerId, Hook, SlotIndex, Verdict};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::SystemTime;

/// Why an evaluator reached its verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DecisionReason {
    /// Caller appears in the membership table
    MonitoredContainer,
    /// Caller is not monitored
    UnmonitoredContainer,
    /// Confidential file opened for write or execute
    ConfidentialWriteOrExec,
    /// Confidential file opened read-only
    ConfidentialReadOnly,
    /// A header does not fit within the capture
    Malformed { layer: Layer },
    PortPairMismatch,
    AddressOutOfRange,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::MonitoredContainer => f.write_str("monitored container"),
            DecisionReason::UnmonitoredContainer => f.write_str("unmonitored container"),
            DecisionReason::ConfidentialWriteOrExec => f.write_str("write/execute on confidential file"),
            DecisionReason::ConfidentialReadOnly => f.write_str("read-only access to confidential file"),
            DecisionReason::Malformed { layer } => write!(f, "malformed {} header", layer),
            DecisionReason::PortPairMismatch => f.write_str("port pair not allowed"),
            DecisionReason::AddressOutOfRange => f.write_str("address out of range"),
        }
    }
}

/// One decision, as reported to a sink
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub hook: Hook,
    pub verdict: Verdict,
    pub reason: DecisionReason,
    pub container_id: Option<ContainerId>,
    /// Membership slot that matched, if any
    pub slot: Option<SlotIndex>,
    pub filename: Option<FileName>,
    pub mask: Option<AccessMask>,
    /// (source, destination)
    pub ports: Option<(u16, u16)>,
    pub address: Option<Ipv4Addr>,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub recorded_at: SystemTime,
}

impl DecisionEvent {
    pub fn new(hook: Hook, verdict: Verdict, reason: DecisionReason) -> Self {
        Self {
            hook,
            verdict,
            reason,
            container_id: None,
            slot: None,
            filename: None,
            mask: None,
            ports: None,
            address: None,
            recorded_at: SystemTime::now(),
        }
    }

    pub fn with_container(mut self, container_id: ContainerId, slot: Option<SlotIndex>) -> Self {
        self.container_id = Some(container_id);
        self.slot = slot;
        self
    }

    pub fn with_file(mut self, filename: Option<FileName>, mask: Option<AccessMask>) -> Self {
        self.filename = filename;
        self.mask = mask;
        self
    }

    pub fn with_ports(mut self, source: u16, destination: u16) -> Self {
        self.ports = Some((source, destination));
        self
    }

    pub fn with_address(mut self, address: Ipv4Addr) -> Self {
        self.address = Some(address);
        self
    }

    /// Short operation name of the hook
    #[inline]
    pub fn operation(&self) -> &'static str {
        self.hook.operation()
    }
}
