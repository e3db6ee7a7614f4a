/*!
 * Policy Limits and Constants
 *
 * Centralized location for the fixed bounds every evaluator is written against.
 * Organized by domain for maintainability and discoverability.
 *
 * - Security-critical constants are marked with [SECURITY]
 * - Linux-compatible values are marked with [LINUX-COMPAT]
 */

// =============================================================================
// MEMBERSHIP LIMITS
// =============================================================================

/// Number of container slots in the membership table
/// [SECURITY] Every membership scan probes exactly this many slots
pub const MAX_CONTAINER_SLOTS: usize = 64;

/// Identifier value reserved for "slot is empty"
pub const EMPTY_CONTAINER_ID: u64 = 0;

// =============================================================================
// FILE POLICY
// =============================================================================

/// Capture buffer for a file name, including the terminating NUL
/// [LINUX-COMPAT] Matches NAME_MAX + 1
pub const MAX_FILENAME_LEN: usize = 256;

/// Suffix that marks a file as confidential (case-sensitive, byte exact)
pub const CONFIDENTIAL_SUFFIX: &[u8] = b"confidential";

// =============================================================================
// NETWORK POLICY
// =============================================================================

/// Default client side of the allowed TCP port pair
pub const DEFAULT_CLIENT_PORT: u16 = 1234;

/// Default server side of the allowed TCP port pair
pub const DEFAULT_SERVER_PORT: u16 = 80;

/// Ethernet header length
/// [LINUX-COMPAT] ETH_HLEN
pub const ETH_HEADER_LEN: usize = 14;

/// Minimum IPv4 header length (no options)
pub const IPV4_HEADER_LEN: usize = 20;

/// Minimum TCP header length (no options)
pub const TCP_HEADER_LEN: usize = 20;

/// IPv4 ethertype
/// [LINUX-COMPAT] ETH_P_IP
pub const ETH_P_IP: u16 = 0x0800;

/// TCP protocol number
/// [LINUX-COMPAT] IPPROTO_TCP
pub const IPPROTO_TCP: u8 = 6;

/// Traffic-control verdict: continue processing
/// [LINUX-COMPAT] TC_ACT_OK
pub const TC_ACT_OK: i32 = 0;

/// Traffic-control verdict: drop the packet
/// [LINUX-COMPAT] TC_ACT_SHOT
pub const TC_ACT_SHOT: i32 = 2;

// =============================================================================
// PINNING
// =============================================================================

/// Pinned name of the membership table
pub const DEFAULT_MEMBERSHIP_MAP: &str = "map_container_cgroup_ids";

/// Pinned name of the configuration table
pub const DEFAULT_CONFIG_MAP: &str = "map_ip_config";

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Decision events kept in memory by the event collector
pub const DEFAULT_EVENT_HISTORY: usize = 1024;
