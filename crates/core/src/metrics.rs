//! Prometheus metrics for core components.
//!
//! The server registers everything returned by [`all_metrics`] in its registry.

use once_cell::sync::Lazy;
use prometheus::{core::Collector, HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Ticket store operations by operation and result.
pub static STORE_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "chamados_store_operations_total",
            "Total ticket store operations",
        ),
        &["operation", "result"], // result: "ok", "error", "timeout"
    )
    .expect("valid metric definition")
});

/// Ticket store operation duration in seconds.
pub static STORE_OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "chamados_store_operation_duration_seconds",
            "Duration of ticket store operations",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["operation"],
    )
    .expect("valid metric definition")
});

/// Ticket status transitions.
pub static STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "chamados_ticket_status_transitions_total",
            "Ticket status transitions",
        ),
        &["from_status", "to_status"],
    )
    .expect("valid metric definition")
});

/// All core metrics, for registration.
pub fn all_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(STORE_OPERATIONS.clone()),
        Box::new(STORE_OPERATION_DURATION.clone()),
        Box::new(STATUS_TRANSITIONS.clone()),
    ]
}
