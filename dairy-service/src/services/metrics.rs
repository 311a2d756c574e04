//! Prometheus metrics for dairy-service.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, HistogramVec, TextEncoder, register_counter_vec, register_histogram_vec,
};

/// Delivery recording counter.
pub static DELIVERIES_RECORDED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dairy_deliveries_recorded_total",
        "Total number of delivery records written",
        &["status"] // ok, error - not customer_id to avoid cardinality explosion
    )
    .expect("Failed to register deliveries_recorded")
});

/// Bill generation counter, one increment per generation run.
pub static BILL_RUNS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dairy_bill_runs_total",
        "Total number of monthly bill generation runs",
        &["status"]
    )
    .expect("Failed to register bill_runs")
});

/// Outbound notification counter.
pub static NOTIFICATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dairy_notifications_total",
        "Total number of customer notifications attempted",
        &["kind", "status"]
    )
    .expect("Failed to register notifications_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dairy_errors_total",
        "Total number of errors by type",
        &["error_type"] // db_error, validation_error, etc.
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dairy_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DELIVERIES_RECORDED);
    Lazy::force(&BILL_RUNS);
    Lazy::force(&NOTIFICATIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
