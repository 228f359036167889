//! Prometheus metrics for feed-service.
//!
//! Exposes retrieval/engagement collectors and an HTTP handler for the
//! `/metrics` endpoint.
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

/// Retrieval requests by endpoint (list, get, search, user listings).
pub static RETRIEVAL_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_retrieval_requests_total",
        "Retrieval requests served, labeled by endpoint",
        &["endpoint"]
    )
    .expect("retrieval counter registration")
});

/// Engagement mutations by kind (like, bookmark, comment, follow).
pub static ENGAGEMENT_TOGGLES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_engagement_mutations_total",
        "Engagement mutations applied, labeled by kind",
        &["kind"]
    )
    .expect("engagement counter registration")
});

/// End-to-end handler latency for retrieval endpoints.
pub static RETRIEVAL_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "feed_retrieval_duration_seconds",
        "Retrieval handler latency in seconds",
        &["endpoint"]
    )
    .expect("retrieval histogram registration")
});

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
