/*!
 * IP Range Evaluator
 * Admits IPv4 packets whose selected address lies in the configured range
 *
 * Filtering is opt-in: with FILTER_ENABLED absent or zero every packet is
 * admitted before any parsing. Enabled, malformed frames are dropped,
 * non-IPv4 frames pass, and an absent bound is unbounded on its side.
 */

use super::traits::PacketEvaluator;
use crate::context::{Ipv4Header, PacketContext};
use crate::core::types::{Hook, Verdict};
use crate::events::{emit, DecisionEvent, DecisionReason, DecisionSink};
use crate::maps::PolicyMaps;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Which IPv4 address the range applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSelector {
    /// Sender of an ingress packet
    #[default]
    Source,
    Destination,
}

impl AddressSelector {
    #[inline]
    pub fn select(self, ip: &Ipv4Header) -> Ipv4Addr {
        match self {
            AddressSelector::Source => ip.source,
            AddressSelector::Destination => ip.destination,
        }
    }
}

impl FromStr for AddressSelector {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" | "src" | "saddr" => Ok(AddressSelector::Source),
            "destination" | "dst" | "daddr" => Ok(AddressSelector::Destination),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IpRangeEvaluator {
    address: AddressSelector,
}

impl IpRangeEvaluator {
    pub fn new(address: AddressSelector) -> Self {
        Self { address }
    }

    pub fn address(&self) -> AddressSelector {
        self.address
    }
}

impl PacketEvaluator for IpRangeEvaluator {
    fn name(&self) -> &str {
        "tc_ingress_ip_range"
    }

    fn evaluate(
        &self,
        packet: &PacketContext<'_>,
        maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict {
        let config = maps.config.snapshot();
        if !config.filter_enabled() {
            return Verdict::Allow;
        }

        let ip = match packet.ipv4_if_present() {
            Ok(Some(ip)) => ip,
            Ok(None) => return Verdict::Allow,
            Err(malformed) => {
                let event = DecisionEvent::new(
                    Hook::TcIngress,
                    Verdict::Deny,
                    DecisionReason::Malformed {
                        layer: malformed.layer,
                    },
                );
                emit(sink, &event);
                return Verdict::Deny;
            }
        };

        let address = self.address.select(&ip);
        if config.ip_range().contains(address) {
            return Verdict::Allow;
        }

        let event = DecisionEvent::new(Hook::TcIngress, Verdict::Deny, DecisionReason::AddressOutOfRange)
            .with_address(address);
        emit(sink, &event);
        Verdict::Deny
    }
}
