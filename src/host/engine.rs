/*!
 * Policy Engine
 * Pinned stores, the standard programs and their attachments in one place
 */

use super::hooks::{AttachmentInfo, HookTable, InterceptedOperation, Program};
use crate::context::{AccessMask, FileOperationContext, PacketContext};
use crate::core::config::{EngineConfig, IngressPolicy};
use crate::core::errors::EngineResult;
use crate::core::types::{ContainerId, Hook, Verdict};
use crate::events::{DecisionSink, EventCollector, FanoutSink, TracingSink};
use crate::maps::{ConfigStore, MembershipStore, PinRegistry};
use crate::policy::{
    ConfidentialFileEvaluator, ContainerScopeEvaluator, IpRangeEvaluator, PortPairEvaluator,
};
use std::sync::Arc;
use tracing::info;

/// Engine facade
///
/// The stores are pinned by name in the registry, so an engine rebuilt on
/// the same registry observes everything the control plane already wrote.
pub struct PolicyEngine {
    config: EngineConfig,
    registry: PinRegistry,
    hooks: HookTable,
    events: EventCollector,
}

impl PolicyEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        Self::with_registry(config, PinRegistry::new())
    }

    pub fn with_registry(config: EngineConfig, registry: PinRegistry) -> EngineResult<Self> {
        let maps = registry.policy_maps(&config.membership_map, &config.config_map)?;
        let events = EventCollector::with_capacity(config.event_history);
        let sinks: Vec<Arc<dyn DecisionSink>> = vec![Arc::new(events.clone()), Arc::new(TracingSink)];
        let sink = FanoutSink::new(sinks);
        let hooks = HookTable::new(maps, Arc::new(sink));

        let engine = Self {
            config,
            registry,
            hooks,
            events,
        };
        engine.attach_standard_programs()?;

        info!(
            lookup = ?engine.config.lookup,
            ingress = ?engine.config.ingress,
            membership_map = %engine.config.membership_map,
            config_map = %engine.config.config_map,
            "policy engine ready"
        );
        Ok(engine)
    }

    fn attach_standard_programs(&self) -> EngineResult<()> {
        let lookup = self.config.lookup;
        self.hooks
            .attach(Program::file(ContainerScopeEvaluator::chmod().with_lookup(lookup)))?;
        self.hooks
            .attach(Program::file(ContainerScopeEvaluator::rmdir().with_lookup(lookup)))?;
        self.hooks
            .attach(Program::file(ConfidentialFileEvaluator::new().with_lookup(lookup)))?;
        self.hooks.attach(self.ingress_program())?;
        Ok(())
    }

    fn ingress_program(&self) -> Program {
        match self.config.ingress {
            IngressPolicy::PortPair => Program::packet(PortPairEvaluator::new(self.config.port_pair)),
            IngressPolicy::IpRange => Program::packet(IpRangeEvaluator::new(self.config.address)),
        }
    }

    /// Detach and re-attach every standard program; the stores are kept
    pub fn reattach(&self) -> EngineResult<()> {
        for hook in Hook::ALL {
            if self.hooks.is_attached(hook) {
                self.hooks.detach(hook)?;
            }
        }
        self.attach_standard_programs()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    pub fn events(&self) -> &EventCollector {
        &self.events
    }

    /// Control-plane handle to the membership table
    pub fn membership(&self) -> &Arc<MembershipStore> {
        &self.hooks.maps().membership
    }

    /// Control-plane handle to the configuration table
    pub fn config_store(&self) -> &Arc<ConfigStore> {
        &self.hooks.maps().config
    }

    pub fn attachments(&self) -> Vec<AttachmentInfo> {
        self.hooks.list()
    }

    pub fn evaluate(&self, operation: InterceptedOperation<'_>) -> Verdict {
        self.hooks.dispatch(operation)
    }

    pub fn chmod(&self, container_id: ContainerId) -> Verdict {
        self.evaluate(InterceptedOperation::Chmod(FileOperationContext::new(container_id)))
    }

    pub fn rmdir(&self, container_id: ContainerId) -> Verdict {
        self.evaluate(InterceptedOperation::Rmdir(FileOperationContext::new(container_id)))
    }

    pub fn file_permission(&self, container_id: ContainerId, name: &[u8], mask: AccessMask) -> Verdict {
        self.evaluate(InterceptedOperation::FilePermission(
            FileOperationContext::permission(container_id, name, mask),
        ))
    }

    pub fn ingress(&self, frame: &[u8]) -> Verdict {
        self.evaluate(InterceptedOperation::Ingress(PacketContext::new(frame)))
    }
}
