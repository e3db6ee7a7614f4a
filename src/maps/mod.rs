/*!
 * Maps Module
 * Shared state written by the control plane and read by the evaluators
 */

mod config;
mod membership;
mod pinning;

pub use config::{decode_address, encode_address, ConfigKey, ConfigSnapshot, ConfigStore, IpRange};
pub use membership::{ContainerSlot, LookupMode, MembershipStore, ScanOutcome};
pub use pinning::{PinRegistry, PolicyMaps};
