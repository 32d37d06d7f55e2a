use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const ORIGIN_CACHE: &str = "cache";
pub const ORIGIN_EXCHANGE: &str = "exchange";

pub const OUTCOME_SENT: &str = "sent";
pub const OUTCOME_UNREGISTERED: &str = "unregistered";
pub const OUTCOME_ERROR: &str = "error";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_fetches: IntCounterVec,
    pub token_exchange_failures: IntCounterVec,

    // Batch metrics
    pub batch_items: IntCounterVec,
    pub batch_retry_passes: IntCounter,
    pub item_request_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("fcmcourier".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_fetches: IntCounterVec::new(Opts::new("token_fetches_total", "Access tokens handed out by origin"),&["origin"],).unwrap(),
            token_exchange_failures: IntCounterVec::new(Opts::new("token_exchange_failures_total", "Token exchange failures by reason"),&["reason"],).unwrap(),

            batch_items: IntCounterVec::new(Opts::new("batch_items_total", "Batch items by outcome"),&["outcome"],).unwrap(),
            batch_retry_passes: IntCounter::new("batch_retry_passes_total", "Forced-refresh passes after an expired token").unwrap(),
            item_request_duration: HistogramVec::new(HistogramOpts::new("item_request_duration_seconds", "Per-item send duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["endpoint"],).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetches.clone())).unwrap();
        reg.register(Box::new(metrics.token_exchange_failures.clone())).unwrap();
        reg.register(Box::new(metrics.batch_items.clone())).unwrap();
        reg.register(Box::new(metrics.batch_retry_passes.clone())).unwrap();
        reg.register(Box::new(metrics.item_request_duration.clone())).unwrap();

        metrics
    }

    /// Text exposition format of every registered family.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn families_are_namespaced() {
        let metrics = get_metrics().await;
        metrics.batch_retry_passes.inc();
        metrics.token_fetches.with_label_values(&[ORIGIN_CACHE]).inc();

        let text = metrics.render().unwrap();
        assert!(text.contains("fcmcourier_batch_retry_passes_total"));
        assert!(text.contains("fcmcourier_token_fetches_total{origin=\"cache\"}"));
    }
}
