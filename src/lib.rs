/*!
 * Cgroup Guard Library
 * Container-scoped mediation of filesystem and ingress operations
 */

pub mod context;
pub mod core;
pub mod events;
pub mod host;
pub mod maps;
pub mod monitoring;
pub mod policy;

// Re-exports
pub use crate::core::{
    ConfigError, ContainerId, EngineConfig, EngineError, Hook, HostError, IngressPolicy, StoreError, Verdict,
};
pub use context::{AccessMask, FileName, FileOperationContext, PacketContext};
pub use events::{DecisionEvent, DecisionReason, DecisionSink, EventCollector};
pub use host::{HookTable, InterceptedOperation, PolicyEngine, Program};
pub use maps::{ConfigKey, ConfigStore, LookupMode, MembershipStore, PinRegistry, PolicyMaps};
pub use monitoring::init_tracing;
pub use policy::{
    ConfidentialFileEvaluator, ContainerScopeEvaluator, FileEvaluator, IpRangeEvaluator, PacketEvaluator,
    PortPairEvaluator,
};
