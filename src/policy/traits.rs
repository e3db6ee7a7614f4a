/*!
 * Evaluator Traits
 * Stateless decision functions bound to one interception point
 */

use crate::context::{FileOperationContext, PacketContext};
use crate::core::types::{Hook, Verdict};
use crate::events::DecisionSink;
use crate::maps::PolicyMaps;

/// Evaluator for an LSM filesystem hook
///
/// The verdict is a function of the context and the stores alone. The sink
/// only observes; nothing it does can change the verdict.
pub trait FileEvaluator: Send + Sync {
    /// Program name, for attachment listings
    fn name(&self) -> &str;

    /// Hook this evaluator is written for
    fn hook(&self) -> Hook;

    fn evaluate(
        &self,
        ctx: &FileOperationContext,
        maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict;
}

/// Evaluator for the packet admission hook
pub trait PacketEvaluator: Send + Sync {
    fn name(&self) -> &str;

    fn hook(&self) -> Hook {
        Hook::TcIngress
    }

    fn evaluate(
        &self,
        packet: &PacketContext<'_>,
        maps: &PolicyMaps,
        sink: &dyn DecisionSink,
    ) -> Verdict;
}
