/*!
 * Port Pair Evaluator
 * Stateless, bidirectional TCP port-pair allow-list for ingress packets
 *
 * 1. Ethernet header out of bounds  -> DENY
 * 2. Not IPv4                       -> ALLOW
 * 3. IPv4 header out of bounds      -> DENY
 * 4. Not TCP                        -> ALLOW
 * 5. TCP header out of bounds       -> DENY
 * 6. ALLOW iff ports match the pair in either direction
 */

use super::traits::PacketEvaluator;
use crate::context::{Malformed, PacketContext};
use crate::core::limits::{DEFAULT_CLIENT_PORT, DEFAULT_SERVER_PORT};
use crate::core::types::{Hook, Verdict};
use crate::events::{emit, DecisionEvent, DecisionReason, DecisionSink};
use crate::maps::PolicyMaps;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed (client, server) TCP port pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortPair {
    pub client: u16,
    pub server: u16,
}

impl PortPair {
    pub const fn new(client: u16, server: u16) -> Self {
        Self { client, server }
    }

    /// Either direction of the pair
    #[inline]
    pub fn matches(&self, source: u16, destination: u16) -> bool {
        let forward = source == self.client && destination == self.server;
        let back = source == self.server && destination == self.client;
        forward || back
    }
}

impl Default for PortPair {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_PORT, DEFAULT_SERVER_PORT)
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client, self.server)
    }
}

impl FromStr for PortPair {
    type Err = ();

    /// `client:server`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (client, server) = s.trim().split_once(':').ok_or(())?;
        Ok(Self {
            client: client.trim().parse().map_err(|_| ())?,
            server: server.trim().parse().map_err(|_| ())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortPairEvaluator {
    pair: PortPair,
}

impl PortPairEvaluator {
    pub fn new(pair: PortPair) -> Self {
        Self { pair }
    }

    pub fn pair(&self) -> PortPair {
        self.pair
    }

    fn malformed(&self, malformed: Malformed, sink: &dyn DecisionSink) -> Verdict {
        let event = DecisionEvent::new(
            Hook::TcIngress,
            Verdict::Deny,
            DecisionReason::Malformed {
                layer: malformed.layer,
            },
        );
        emit(sink, &event);
        Verdict::Deny
    }
}

impl PacketEvaluator for PortPairEvaluator {
    fn name(&self) -> &str {
        "tc_ingress_port_pair"
    }

    fn evaluate(
        &self,
        packet: &PacketContext<'_>,
        _maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict {
        let ip = match packet.ipv4_if_present() {
            Ok(Some(ip)) => ip,
            Ok(None) => return Verdict::Allow,
            Err(malformed) => return self.malformed(malformed, sink),
        };
        if !ip.is_tcp() {
            return Verdict::Allow;
        }

        let tcp = match packet.tcp(&ip) {
            Ok(tcp) => tcp,
            Err(malformed) => return self.malformed(malformed, sink),
        };

        if self.pair.matches(tcp.source_port, tcp.destination_port) {
            return Verdict::Allow;
        }

        let event = DecisionEvent::new(Hook::TcIngress, Verdict::Deny, DecisionReason::PortPairMismatch)
            .with_ports(tcp.source_port, tcp.destination_port)
            .with_address(ip.source);
        emit(sink, &event);
        Verdict::Deny
    }
}
