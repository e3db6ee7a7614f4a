/*!
 * Engine Configuration
 *
 * Construction-time policy for the engine facade. Loaded from defaults,
 * environment variables or a JSON file.
 */

use super::errors::{ConfigError, ConfigResult};
use super::limits::{DEFAULT_CONFIG_MAP, DEFAULT_EVENT_HISTORY, DEFAULT_MEMBERSHIP_MAP};
use crate::maps::LookupMode;
use crate::policy::{AddressSelector, PortPair};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Which evaluator sits on the ingress hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngressPolicy {
    #[default]
    PortPair,
    IpRange,
}

impl FromStr for IngressPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "port_pair" | "ports" => Ok(IngressPolicy::PortPair),
            "ip_range" | "ip" => Ok(IngressPolicy::IpRange),
            _ => Err(()),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Membership lookup strategy (default: indexed)
    pub lookup: LookupMode,

    /// Allowed TCP port pair for the port evaluator (default: 1234 <-> 80)
    pub port_pair: PortPair,

    /// Program attached at the ingress hook (default: port pair)
    pub ingress: IngressPolicy,

    /// Address checked by the IP range evaluator (default: source)
    pub address: AddressSelector,

    /// Pinned name of the membership table
    pub membership_map: String,

    /// Pinned name of the configuration table
    pub config_map: String,

    /// Decision events kept in memory
    pub event_history: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            lookup: LookupMode::default(),
            port_pair: PortPair::default(),
            ingress: IngressPolicy::default(),
            address: AddressSelector::default(),
            membership_map: DEFAULT_MEMBERSHIP_MAP.to_string(),
            config_map: DEFAULT_CONFIG_MAP.to_string(),
            event_history: DEFAULT_EVENT_HISTORY,
        }
    }

    /// Load from environment variables, falling back to defaults
    ///
    /// Environment variables:
    /// - GUARD_LOOKUP: `indexed` or `scan`
    /// - GUARD_ALLOWED_PORTS: `client:server`, e.g. `1234:80`
    /// - GUARD_INGRESS: `port_pair` or `ip_range`
    /// - GUARD_IP_FIELD: `source` or `destination`
    /// - GUARD_EVENT_HISTORY: number of events kept in memory
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::new();

        if let Some(value) = read_var("GUARD_LOOKUP") {
            config.lookup = parse_var("GUARD_LOOKUP", &value)?;
        }
        if let Some(value) = read_var("GUARD_ALLOWED_PORTS") {
            config.port_pair = parse_var("GUARD_ALLOWED_PORTS", &value)?;
        }
        if let Some(value) = read_var("GUARD_INGRESS") {
            config.ingress = parse_var("GUARD_INGRESS", &value)?;
        }
        if let Some(value) = read_var("GUARD_IP_FIELD") {
            config.address = parse_var("GUARD_IP_FIELD", &value)?;
        }
        if let Some(value) = read_var("GUARD_EVENT_HISTORY") {
            config.event_history = parse_var("GUARD_EVENT_HISTORY", &value)?;
        }

        Ok(config)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    })
}
