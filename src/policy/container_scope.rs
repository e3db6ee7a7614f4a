/*!
 * Container Scope Evaluator
 * Unconditional block for monitored containers; serves chmod and rmdir
 */

use super::traits::FileEvaluator;
use crate::context::FileOperationContext;
use crate::core::errors::{HostError, HostResult};
use crate::core::types::{Hook, Verdict};
use crate::events::{emit, DecisionEvent, DecisionReason, DecisionSink};
use crate::maps::{LookupMode, PolicyMaps};

/// DENY iff the caller is a member of the membership table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerScopeEvaluator {
    hook: Hook,
    lookup: LookupMode,
    record_allows: bool,
}

impl ContainerScopeEvaluator {
    fn new(hook: Hook) -> Self {
        Self {
            hook,
            lookup: LookupMode::default(),
            record_allows: false,
        }
    }

    /// Evaluator for any filesystem hook; the ingress hook is rejected
    pub fn for_hook(hook: Hook) -> HostResult<Self> {
        if !hook.is_lsm() {
            return Err(HostError::HookMismatch {
                hook,
                program: "container_scope".to_string(),
            });
        }
        Ok(Self::new(hook))
    }

    /// chmod also reports every allowed caller
    pub fn chmod() -> Self {
        Self::new(Hook::Chmod).with_allow_events(true)
    }

    pub fn rmdir() -> Self {
        Self::new(Hook::Rmdir)
    }

    pub fn with_lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_allow_events(mut self, record_allows: bool) -> Self {
        self.record_allows = record_allows;
        self
    }

    pub fn lookup(&self) -> LookupMode {
        self.lookup
    }
}

impl FileEvaluator for ContainerScopeEvaluator {
    fn name(&self) -> &str {
        match self.hook {
            Hook::Chmod => "path_chmod",
            Hook::Rmdir => "path_rmdir",
            Hook::FilePermission | Hook::TcIngress => "container_scope",
        }
    }

    fn hook(&self) -> Hook {
        self.hook
    }

    fn evaluate(
        &self,
        ctx: &FileOperationContext,
        maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict {
        match maps.membership.lookup(ctx.container_id, self.lookup) {
            Some(slot) => {
                let event = DecisionEvent::new(self.hook, Verdict::Deny, DecisionReason::MonitoredContainer)
                    .with_container(ctx.container_id, Some(slot))
                    .with_file(ctx.name, ctx.mask);
                emit(sink, &event);
                Verdict::Deny
            }
            None => {
                if self.record_allows {
                    let event =
                        DecisionEvent::new(self.hook, Verdict::Allow, DecisionReason::UnmonitoredContainer)
                            .with_container(ctx.container_id, None)
                            .with_file(ctx.name, ctx.mask);
                    emit(sink, &event);
                }
                Verdict::Allow
            }
        }
    }
}
