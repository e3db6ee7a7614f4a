/*!
 * Monitoring
 * Tracing setup for decision diagnostics
 */

mod tracer;

pub use tracer::{init_tracing, span_evaluation};
