use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Request/publish counters for the ingest pipeline, scraped via /metrics:
// - orders received, rejected by validation, published
// - publish failures by failure class
// - publish latency
// ============================================================================

/// Central metrics registry for the service.
pub struct Metrics {
    registry: Registry,

    pub orders_received: IntCounter,
    pub orders_rejected: IntCounter,
    pub orders_published: IntCounter,
    pub publish_failures: IntCounterVec,
    pub publish_duration: Histogram,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_received = IntCounter::new(
            "orders_received_total",
            "Total order submissions received",
        )?;
        registry.register(Box::new(orders_received.clone()))?;

        let orders_rejected = IntCounter::new(
            "orders_rejected_total",
            "Total order submissions rejected by validation",
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let orders_published = IntCounter::new(
            "orders_published_total",
            "Total orders published to the broker",
        )?;
        registry.register(Box::new(orders_published.clone()))?;

        let publish_failures = IntCounterVec::new(
            Opts::new("publish_failures_total", "Total failed publishes"),
            &["reason"],
        )?;
        registry.register(Box::new(publish_failures.clone()))?;

        let publish_duration = Histogram::with_opts(
            HistogramOpts::new("publish_duration_seconds", "Broker publish duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(publish_duration.clone()))?;

        Ok(Self {
            registry,
            orders_received,
            orders_rejected,
            orders_published,
            publish_failures,
            publish_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_received(&self) {
        self.orders_received.inc();
    }

    pub fn record_rejected(&self) {
        self.orders_rejected.inc();
    }

    pub fn record_published(&self, duration_secs: f64) {
        self.orders_published.inc();
        self.publish_duration.observe(duration_secs);
    }

    pub fn record_publish_failure(&self, reason: &str, duration_secs: f64) {
        self.publish_failures.with_label_values(&[reason]).inc();
        self.publish_duration.observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_pipeline_events() {
        let metrics = Metrics::new().unwrap();
        metrics.record_received();
        metrics.record_received();
        metrics.record_rejected();
        metrics.record_published(0.02);

        assert_eq!(metrics.orders_received.get(), 2);
        assert_eq!(metrics.orders_rejected.get(), 1);
        assert_eq!(metrics.orders_published.get(), 1);
    }

    #[test]
    fn test_record_publish_failures_by_reason() {
        let metrics = Metrics::new().unwrap();
        metrics.record_publish_failure("broker_unreachable", 0.5);
        metrics.record_publish_failure("broker_unreachable", 0.5);
        metrics.record_publish_failure("fault", 0.1);

        assert_eq!(
            metrics
                .publish_failures
                .with_label_values(&["broker_unreachable"])
                .get(),
            2
        );
        assert_eq!(metrics.publish_failures.with_label_values(&["fault"]).get(), 1);
    }
}
