/*!
 * Decision Sinks
 * Where evaluators report decisions. Reporting is observational only.
 */

use super::types::DecisionEvent;
use crate::core::types::Verdict;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receiver of decision events
///
/// Recording cannot fail from the evaluator's point of view; a sink that
/// loses an event must not report it back.
pub trait DecisionSink: Send + Sync {
    fn record(&self, event: &DecisionEvent);
}

/// Hand an event to a sink; a panicking sink never reaches the verdict path
pub(crate) fn emit(sink: &dyn DecisionSink, event: &DecisionEvent) {
    if panic::catch_unwind(AssertUnwindSafe(|| sink.record(event))).is_err() {
        warn!(
            operation = event.operation(),
            verdict = %event.verdict,
            "decision sink panicked, event dropped"
        );
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DecisionSink for NullSink {
    fn record(&self, _event: &DecisionEvent) {}
}

/// Structured trace line per decision
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DecisionSink for TracingSink {
    fn record(&self, event: &DecisionEvent) {
        let container = event.container_id.map(|id| id.raw());
        let filename = event.filename.as_ref().map(|name| name.to_string_lossy());
        let mask = event.mask.map(|mask| mask.bits());

        match event.verdict {
            Verdict::Deny => info!(
                operation = event.operation(),
                container_id = ?container,
                slot = ?event.slot,
                filename = ?filename,
                mask = ?mask,
                ports = ?event.ports,
                address = ?event.address,
                reason = %event.reason,
                "blocking {}",
                event.operation()
            ),
            Verdict::Allow => debug!(
                operation = event.operation(),
                container_id = ?container,
                filename = ?filename,
                mask = ?mask,
                reason = %event.reason,
                "allowing {}",
                event.operation()
            ),
        }
    }
}

/// Forwards each event to several sinks
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DecisionSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn DecisionSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn DecisionSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DecisionSink for FanoutSink {
    fn record(&self, event: &DecisionEvent) {
        for sink in &self.sinks {
            emit(sink.as_ref(), event);
        }
    }
}

impl<S: DecisionSink + ?Sized> DecisionSink for Arc<S> {
    fn record(&self, event: &DecisionEvent) {
        (**self).record(event)
    }
}
