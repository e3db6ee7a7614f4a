/*!
 * Confidential File Evaluator
 * Blocks write/execute on `*confidential` files for monitored containers
 *
 * DENY iff the caller is monitored, the captured name ends with the
 * confidential suffix, and the mask requests WRITE or EXEC. Only the
 * captured prefix of an over-long name is tested, so a truncated name
 * whose real suffix was cut off is allowed.
 */

use super::traits::FileEvaluator;
use crate::context::{AccessMask, FileOperationContext};
use crate::core::limits::CONFIDENTIAL_SUFFIX;
use crate::core::types::{Hook, Verdict};
use crate::events::{emit, DecisionEvent, DecisionReason, DecisionSink};
use crate::maps::{LookupMode, PolicyMaps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfidentialFileEvaluator {
    lookup: LookupMode,
}

impl ConfidentialFileEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }
}

impl FileEvaluator for ConfidentialFileEvaluator {
    fn name(&self) -> &str {
        "file_permission"
    }

    fn hook(&self) -> Hook {
        Hook::FilePermission
    }

    fn evaluate(
        &self,
        ctx: &FileOperationContext,
        maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict {
        // established fresh on every call; None means not monitored
        let monitored_slot = maps.membership.lookup(ctx.container_id, self.lookup);
        let Some(slot) = monitored_slot else {
            return Verdict::Allow;
        };

        let Some(name) = ctx.name.as_ref() else {
            return Verdict::Allow;
        };
        if !name.ends_with(CONFIDENTIAL_SUFFIX) {
            return Verdict::Allow;
        }

        let mask = ctx.mask.unwrap_or(AccessMask::empty());
        let (verdict, reason) = if mask.writes_or_executes() {
            (Verdict::Deny, DecisionReason::ConfidentialWriteOrExec)
        } else {
            (Verdict::Allow, DecisionReason::ConfidentialReadOnly)
        };

        let event = DecisionEvent::new(Hook::FilePermission, verdict, reason)
            .with_container(ctx.container_id, Some(slot))
            .with_file(ctx.name, Some(mask));
        emit(sink, &event);
        verdict
    }
}
