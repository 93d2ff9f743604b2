//! Prometheus metrics for mockfront.
//!
//! Tracks dispatched requests by outcome and the latency that was simulated.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, CounterVec, Encoder, Gauge,
    Histogram, TextEncoder,
};
use std::time::Duration;
use tracing::error;

lazy_static! {
    /// Total number of requests dispatched
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "mockfront_requests_total",
        "Total number of requests dispatched by the mock server",
        &["method", "outcome"]  // outcome: matched|route_not_mapped|no_match
    )
    .unwrap();

    /// Simulated latency applied to matched requests
    pub static ref SIMULATED_DELAY_MS: Histogram = register_histogram!(
        "mockfront_simulated_delay_ms",
        "Histogram of simulated response latency in milliseconds",
        vec![1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap();

    /// Rules compiled into the route table
    pub static ref RULES_LOADED: Gauge = register_gauge!(
        "mockfront_rules_loaded",
        "Number of rules compiled into the route table"
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record one dispatched request
pub fn record_request(method: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[method, outcome]).inc();
}

/// Record the latency simulated for a matched request
pub fn record_simulated_delay(delay: Duration) {
    SIMULATED_DELAY_MS.observe(delay.as_secs_f64() * 1000.0);
}

pub fn set_rules_loaded(count: usize) {
    RULES_LOADED.set(count as f64);
}
