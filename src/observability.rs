//! Observability stubs (metrics counters over tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for the content layer's request-path counters.
#[derive(Debug, Default)]
pub struct Metrics {
    bodies_decoded: AtomicU64,
    decode_failures: AtomicU64,
    responses_encoded: AtomicU64,
    negotiation_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_decoded(&self) {
        self.bodies_decoded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "bodies_decoded", "Metric incremented");
    }

    pub fn decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "decode_failures", "Metric incremented");
    }

    pub fn response_encoded(&self) {
        self.responses_encoded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "responses_encoded", "Metric incremented");
    }

    pub fn negotiation_failure(&self) {
        self.negotiation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "negotiation_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bodies_decoded: self.bodies_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            responses_encoded: self.responses_encoded.load(Ordering::Relaxed),
            negotiation_failures: self.negotiation_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub bodies_decoded: u64,
    pub decode_failures: u64,
    pub responses_encoded: u64,
    pub negotiation_failures: u64,
}
