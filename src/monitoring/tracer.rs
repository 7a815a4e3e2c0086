/*!
 * Structured Tracing
 * Subscriber setup and per-round spans using the tracing crate
 *
 * Features:
 * - Trace IDs correlating every log line of a cleanup round
 * - JSON-formatted logs for structured parsing
 * - Slow-round warnings emitted when the span closes
 */

use crate::core::limits::SLOW_ROUND_THRESHOLD;
use crate::pressure::PressureLevel;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMCOORD_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("MEMCOORD_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "structured tracing initialized");
    }
}

/// Generate a unique trace ID for round correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one cleanup round
pub struct RoundSpan {
    span: Span,
    start: Instant,
    trace_id: String,
    level: PressureLevel,
}

impl RoundSpan {
    pub fn new(level: PressureLevel, eligible: usize) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "cleanup_round",
            trace_id = %trace_id,
            level = %level,
            eligible = eligible,
            processed = tracing::field::Empty,
            failed = tracing::field::Empty,
            duration_us = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            trace_id,
            level,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// The underlying span, for instrumenting the round future
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_outcome(&self, processed: usize, failed: usize) {
        self.span.record("processed", processed);
        self.span.record("failed", failed);
    }
}

impl Drop for RoundSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration > SLOW_ROUND_THRESHOLD {
            self.span.record("duration_ms", duration.as_millis() as u64);
            warn!(
                trace_id = %self.trace_id,
                level = %self.level,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow cleanup round"
            );
        } else {
            self.span.record("duration_us", duration.as_micros() as u64);
            debug!(
                trace_id = %self.trace_id,
                level = %self.level,
                duration_us = duration.as_micros() as u64,
                "cleanup round span closed"
            );
        }
    }
}
