// Prometheus registry for the API surface.
use axum::http::{header, HeaderValue};
use axum::response::IntoResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub static PROM_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static PROM_API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("triunity_api_requests_total", "API requests by endpoint and status"),
        &["endpoint", "status"],
    )
    .expect("create counter");
    // ignore error if already registered
    let _ = PROM_REGISTRY.register(Box::new(c.clone()));
    c
});

pub fn record_request(endpoint: &str, status: u16) {
    let status = status.to_string();
    PROM_API_REQUESTS
        .with_label_values(&[endpoint, status.as_str()])
        .inc();
}

/// GET /metrics.prom
pub async fn metrics_prom() -> impl IntoResponse {
    Lazy::force(&PROM_API_REQUESTS);
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&PROM_REGISTRY.gather(), &mut buffer) {
        tracing::warn!(err = %e, "failed to encode prometheus metrics");
    }
    let prom_text = String::from_utf8_lossy(&buffer).into_owned();
    let headers = [(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    )];
    (headers, prom_text)
}
