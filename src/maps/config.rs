/*!
 * Config Store
 * Small keyed table of control-plane settings read by the network evaluators
 *
 * The whole table is one `Copy` snapshot behind a seqlock: readers never
 * block, and a multi-key update (both IP bounds) is published in a single
 * write so no reader sees one bound changed without the other.
 */

use crate::core::errors::{StoreError, StoreResult};
use seqlock::SeqLock;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Closed set of configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ConfigKey {
    /// Boolean-as-integer: non-zero enables IP range filtering
    FilterEnabled = 1,
    /// Lower IPv4 bound, network byte order
    IpLower = 2,
    /// Upper IPv4 bound, network byte order
    IpUpper = 3,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::FilterEnabled, ConfigKey::IpLower, ConfigKey::IpUpper];

    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    #[inline]
    const fn slot(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<u32> for ConfigKey {
    type Error = StoreError;

    fn try_from(key: u32) -> Result<Self, Self::Error> {
        match key {
            1 => Ok(ConfigKey::FilterEnabled),
            2 => Ok(ConfigKey::IpLower),
            3 => Ok(ConfigKey::IpUpper),
            _ => Err(StoreError::UnknownConfigKey { key }),
        }
    }
}

/// Point-in-time copy of every key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    values: [Option<u64>; 3],
}

impl ConfigSnapshot {
    #[inline]
    pub fn get(&self, key: ConfigKey) -> Option<u64> {
        self.values[key.slot()]
    }

    /// Absent or zero means disabled
    #[inline]
    pub fn filter_enabled(&self) -> bool {
        self.get(ConfigKey::FilterEnabled).is_some_and(|v| v != 0)
    }

    /// Inclusive bounds; an absent bound is unbounded on that side
    pub fn ip_range(&self) -> IpRange {
        let lower = self
            .get(ConfigKey::IpLower)
            .map(decode_address)
            .unwrap_or(Ipv4Addr::UNSPECIFIED);
        let upper = self
            .get(ConfigKey::IpUpper)
            .map(decode_address)
            .unwrap_or(Ipv4Addr::BROADCAST);
        IpRange { lower, upper }
    }
}

/// Inclusive IPv4 range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    pub lower: Ipv4Addr,
    pub upper: Ipv4Addr,
}

impl IpRange {
    #[inline]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr = u32::from(addr);
        u32::from(self.lower) <= addr && addr <= u32::from(self.upper)
    }
}

/// Encode an address the way the control plane stores it (htonl, widened)
#[inline]
pub fn encode_address(addr: Ipv4Addr) -> u64 {
    u32::from(addr).to_be() as u64
}

/// Inverse of [`encode_address`]; only the low 32 bits are meaningful
#[inline]
pub fn decode_address(value: u64) -> Ipv4Addr {
    Ipv4Addr::from(u32::from_be(value as u32))
}

/// Control-plane configuration table
pub struct ConfigStore {
    inner: SeqLock<ConfigSnapshot>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            inner: SeqLock::new(ConfigSnapshot::default()),
        }
    }

    #[inline]
    pub fn get(&self, key: ConfigKey) -> Option<u64> {
        self.inner.read().get(key)
    }

    /// Lock-free consistent copy of every key
    #[inline]
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.inner.read()
    }

    #[inline]
    pub fn filter_enabled(&self) -> bool {
        self.snapshot().filter_enabled()
    }

    #[inline]
    pub fn ip_range(&self) -> IpRange {
        self.snapshot().ip_range()
    }

    /// Insert or replace one key
    pub fn set(&self, key: ConfigKey, value: u64) {
        self.inner.lock_write().values[key.slot()] = Some(value);
    }

    /// Insert or replace by raw control-plane key
    pub fn set_raw(&self, key: u32, value: u64) -> StoreResult<()> {
        self.set(ConfigKey::try_from(key)?, value);
        Ok(())
    }

    pub fn remove(&self, key: ConfigKey) -> Option<u64> {
        self.inner.lock_write().values[key.slot()].take()
    }

    pub fn set_filter_enabled(&self, enabled: bool) {
        self.set(ConfigKey::FilterEnabled, u64::from(enabled));
    }

    /// Store one bound in network byte order
    pub fn set_ip_bound(&self, key: ConfigKey, addr: Ipv4Addr) -> StoreResult<()> {
        match key {
            ConfigKey::IpLower | ConfigKey::IpUpper => {
                self.set(key, encode_address(addr));
                Ok(())
            }
            ConfigKey::FilterEnabled => Err(StoreError::UnknownConfigKey { key: key.raw() }),
        }
    }

    /// Publish both bounds in one write
    pub fn set_ip_range(&self, lower: Ipv4Addr, upper: Ipv4Addr) {
        let mut guard = self.inner.lock_write();
        guard.values[ConfigKey::IpLower.slot()] = Some(encode_address(lower));
        guard.values[ConfigKey::IpUpper.slot()] = Some(encode_address(upper));
    }

    pub fn clear(&self) {
        *self.inner.lock_write() = ConfigSnapshot::default();
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
