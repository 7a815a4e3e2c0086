/*!
 * Monitoring
 * Tracing setup and cleanup-round spans
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, RoundSpan};
