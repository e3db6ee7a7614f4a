/*!
 * Events Module
 * Diagnostic decision events and the sinks that receive them
 */

mod collector;
mod sink;
mod types;

pub use collector::{EventCollector, EventStats};
pub(crate) use sink::emit;
pub use sink::{DecisionSink, FanoutSink, NullSink, TracingSink};
pub use types::{DecisionEvent, DecisionReason};
