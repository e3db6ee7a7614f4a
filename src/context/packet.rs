/*!
 * Packet Context
 * Bounds-checked view over a captured Ethernet frame
 *
 * Every header accessor verifies `start + size <= captured length` before
 * reading a byte. A failed check is a structural malformation and is
 * reported as such; it is never a policy question.
 */

use crate::core::limits::{ETH_HEADER_LEN, ETH_P_IP, IPPROTO_TCP, IPV4_HEADER_LEN, TCP_HEADER_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Header layer whose bounds check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Ethernet,
    Ipv4,
    Tcp,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ethernet => f.write_str("ethernet"),
            Layer::Ipv4 => f.write_str("ipv4"),
            Layer::Tcp => f.write_str("tcp"),
        }
    }
}

/// A header does not fit within the captured bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    pub layer: Layer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: [u8; 6],
    pub source: [u8; 6],
    /// Host byte order
    pub ethertype: u16,
}

impl EthernetHeader {
    #[inline]
    pub fn is_ipv4(&self) -> bool {
        self.ethertype == ETH_P_IP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Offset of this header from the start of the frame
    pub offset: usize,
    pub version: u8,
    /// Header length in 32-bit words
    pub ihl: u8,
    pub total_length: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// Header length in bytes, from the IHL field
    #[inline]
    pub fn header_len(&self) -> usize {
        usize::from(self.ihl) * 4
    }

    #[inline]
    pub fn is_tcp(&self) -> bool {
        self.protocol == IPPROTO_TCP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    /// Host byte order
    pub source_port: u16,
    /// Host byte order
    pub destination_port: u16,
}

/// Captured frame bytes
#[derive(Debug, Clone, Copy)]
pub struct PacketContext<'a> {
    data: &'a [u8],
}

impl<'a> PacketContext<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Captured length (data_end - data)
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `size` bytes at `start`, only if they lie within the capture
    #[inline]
    fn header(&self, start: usize, size: usize, layer: Layer) -> Result<&'a [u8], Malformed> {
        let end = start.checked_add(size).ok_or(Malformed { layer })?;
        self.data.get(start..end).ok_or(Malformed { layer })
    }

    pub fn ethernet(&self) -> Result<EthernetHeader, Malformed> {
        let bytes = self.header(0, ETH_HEADER_LEN, Layer::Ethernet)?;
        let mut destination = [0u8; 6];
        let mut source = [0u8; 6];
        destination.copy_from_slice(&bytes[0..6]);
        source.copy_from_slice(&bytes[6..12]);
        Ok(EthernetHeader {
            destination,
            source,
            ethertype: u16::from_be_bytes([bytes[12], bytes[13]]),
        })
    }

    /// IPv4 header directly after the Ethernet header
    pub fn ipv4(&self) -> Result<Ipv4Header, Malformed> {
        let offset = ETH_HEADER_LEN;
        let bytes = self.header(offset, IPV4_HEADER_LEN, Layer::Ipv4)?;
        Ok(Ipv4Header {
            offset,
            version: bytes[0] >> 4,
            ihl: bytes[0] & 0x0f,
            total_length: u16::from_be_bytes([bytes[2], bytes[3]]),
            ttl: bytes[8],
            protocol: bytes[9],
            source: Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]),
            destination: Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]),
        })
    }

    /// IPv4 header when the frame carries IPv4, `None` for other ethertypes
    pub fn ipv4_if_present(&self) -> Result<Option<Ipv4Header>, Malformed> {
        if !self.ethernet()?.is_ipv4() {
            return Ok(None);
        }
        self.ipv4().map(Some)
    }

    /// TCP header located by the IPv4 header length field
    pub fn tcp(&self, ip: &Ipv4Header) -> Result<TcpHeader, Malformed> {
        let offset = ip
            .offset
            .checked_add(ip.header_len())
            .ok_or(Malformed { layer: Layer::Tcp })?;
        let bytes = self.header(offset, TCP_HEADER_LEN, Layer::Tcp)?;
        Ok(TcpHeader {
            source_port: u16::from_be_bytes([bytes[0], bytes[1]]),
            destination_port: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}
