/// Prometheus metrics for story-service
///
/// Exposes access-decision collectors and an HTTP handler for the `/metrics` endpoint.
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Access-control outcomes by operation (allowed, not_found, redirect, store_error).
    pub static ref STORY_ACCESS_DECISIONS: IntCounterVec = register_int_counter_vec!(
        "story_access_decisions_total",
        "Story access decisions segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register story_access_decisions_total");

    /// Story store failures by operation.
    pub static ref STORY_STORE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "story_store_failures_total",
        "Story store failures segmented by operation",
        &["operation"]
    )
    .expect("failed to register story_store_failures_total");

    /// HTTP request latency.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "story_http_request_duration_seconds",
        "HTTP request duration segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register story_http_request_duration_seconds");
}

pub fn record_decision(operation: &str, outcome: &str) {
    STORY_ACCESS_DECISIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_store_failure(operation: &str) {
    STORY_STORE_FAILURES.with_label_values(&[operation]).inc();
    record_decision(operation, "store_error");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_are_counted_per_label_pair() {
        let before = STORY_ACCESS_DECISIONS
            .with_label_values(&["unit_test_op", "allowed"])
            .get();
        record_decision("unit_test_op", "allowed");
        record_decision("unit_test_op", "allowed");
        let after = STORY_ACCESS_DECISIONS
            .with_label_values(&["unit_test_op", "allowed"])
            .get();
        assert_eq!(after - before, 2);
    }

    #[test]
    fn store_failures_also_count_as_decisions() {
        record_store_failure("unit_test_failure");
        assert!(
            STORY_STORE_FAILURES
                .with_label_values(&["unit_test_failure"])
                .get()
                >= 1
        );
        assert!(
            STORY_ACCESS_DECISIONS
                .with_label_values(&["unit_test_failure", "store_error"])
                .get()
                >= 1
        );
    }
}
