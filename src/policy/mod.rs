/*!
 * Policy Module
 * The evaluators: one stateless decision function per interception point
 */

mod confidential;
mod container_scope;
mod ip_range;
mod port_filter;
mod traits;

pub use confidential::ConfidentialFileEvaluator;
pub use container_scope::ContainerScopeEvaluator;
pub use ip_range::{AddressSelector, IpRangeEvaluator};
pub use port_filter::{PortPair, PortPairEvaluator};
pub use traits::{FileEvaluator, PacketEvaluator};
