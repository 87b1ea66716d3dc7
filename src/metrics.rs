use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

use crate::{HawkularError, Result};

lazy_static! {
    // Batch metrics
    pub static ref BATCHES: IntCounter = register_int_counter!(
        "hawkular_batches_total",
        "Total number of query batches executed"
    ).unwrap();

    // Remote request metrics
    pub static ref REMOTE_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "hawkular_remote_requests_total",
        "Total number of requests sent to the metrics store",
        &["endpoint"]
    ).unwrap();

    pub static ref BATCH_FAILURES: IntCounterVec = register_int_counter_vec!(
        "hawkular_batch_failures_total",
        "Total number of failed query batches by failure kind",
        &["kind"]
    ).unwrap();

    pub static ref REMOTE_DURATION: HistogramVec = register_histogram_vec!(
        "hawkular_remote_request_duration_seconds",
        "Duration of requests to the metrics store in seconds",
        &["endpoint"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).unwrap();
}

pub fn init_metrics() {
    lazy_static::initialize(&BATCHES);
    lazy_static::initialize(&REMOTE_REQUESTS);
    lazy_static::initialize(&BATCH_FAILURES);
    lazy_static::initialize(&REMOTE_DURATION);
}

pub struct RequestTimer {
    endpoint: String,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &str) -> Self {
        REMOTE_REQUESTS.with_label_values(&[endpoint]).inc();
        Self {
            endpoint: endpoint.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REMOTE_DURATION
            .with_label_values(&[&self.endpoint])
            .observe(duration);
    }
}

pub fn record_batch() {
    BATCHES.inc();
}

pub fn record_failure(err: &HawkularError) {
    BATCH_FAILURES.with_label_values(&[err.kind()]).inc();
}

/// Renders the default registry in the Prometheus text format.
pub fn render() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| HawkularError::Internal(format!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| HawkularError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
