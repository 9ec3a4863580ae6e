//! Prometheus metrics for the sizing engine
//!
//! Metrics live in the process-global registry so `prometheus::gather()`
//! exposes them. [`MetricsObserver`] feeds them from estimation events.

use crate::observer::{EstimationEvent, EstimationObserver};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::{Arc, OnceLock};

/// Latency buckets in seconds; a full estimation is pure arithmetic
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05,
];

static GLOBAL_METRICS: OnceLock<SizerMetricsInner> = OnceLock::new();

struct SizerMetricsInner {
    estimation_latency_seconds: Histogram,
    estimations_total: IntCounter,
    groups_estimated_total: IntCounter,
    catalog_exhausted_total: IntCounter,
    unrecognized_services_total: IntCounter,
    unrecognized_natures_total: IntCounter,
    zero_node_groups_total: IntCounter,
    services_estimated_total: IntCounterVec,
    model_version_info: GaugeVec,
}

impl SizerMetricsInner {
    fn new() -> Self {
        Self {
            estimation_latency_seconds: register_histogram!(
                "workload_sizer_estimation_latency_seconds",
                "Time spent sizing one request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register estimation_latency_seconds"),

            estimations_total: register_int_counter!(
                "workload_sizer_estimations_total",
                "Total number of sizing requests estimated"
            )
            .expect("Failed to register estimations_total"),

            groups_estimated_total: register_int_counter!(
                "workload_sizer_groups_estimated_total",
                "Total number of service groups aggregated"
            )
            .expect("Failed to register groups_estimated_total"),

            catalog_exhausted_total: register_int_counter!(
                "workload_sizer_catalog_exhausted_total",
                "Groups whose requirement exceeded every catalog instance"
            )
            .expect("Failed to register catalog_exhausted_total"),

            unrecognized_services_total: register_int_counter!(
                "workload_sizer_unrecognized_services_total",
                "Service names that matched no known service kind"
            )
            .expect("Failed to register unrecognized_services_total"),

            unrecognized_natures_total: register_int_counter!(
                "workload_sizer_unrecognized_natures_total",
                "Requests with a workload nature that matched no preset"
            )
            .expect("Failed to register unrecognized_natures_total"),

            zero_node_groups_total: register_int_counter!(
                "workload_sizer_zero_node_groups_total",
                "Service groups submitted with no nodes"
            )
            .expect("Failed to register zero_node_groups_total"),

            services_estimated_total: register_int_counter_vec!(
                "workload_sizer_services_estimated_total",
                "Per-service estimations by service kind",
                &["service"]
            )
            .expect("Failed to register services_estimated_total"),

            model_version_info: register_gauge_vec!(
                "workload_sizer_model_version_info",
                "Estimator generation and constant revision in use",
                &["version", "revision"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Handle to the global sizing metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct SizerMetrics {
    inner: &'static SizerMetricsInner,
}

impl Default for SizerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SizerMetrics {
    /// Registers the metrics on first use
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(SizerMetricsInner::new),
        }
    }

    pub fn observe_estimation_latency(&self, duration_secs: f64) {
        self.inner.estimation_latency_seconds.observe(duration_secs);
    }

    pub fn inc_estimations(&self) {
        self.inner.estimations_total.inc();
    }

    pub fn estimations(&self) -> u64 {
        self.inner.estimations_total.get()
    }

    pub fn inc_groups_estimated(&self) {
        self.inner.groups_estimated_total.inc();
    }

    pub fn inc_catalog_exhausted(&self) {
        self.inner.catalog_exhausted_total.inc();
    }

    pub fn catalog_exhausted(&self) -> u64 {
        self.inner.catalog_exhausted_total.get()
    }

    pub fn inc_unrecognized_services(&self) {
        self.inner.unrecognized_services_total.inc();
    }

    pub fn inc_unrecognized_natures(&self) {
        self.inner.unrecognized_natures_total.inc();
    }

    pub fn inc_zero_node_groups(&self) {
        self.inner.zero_node_groups_total.inc();
    }

    pub fn inc_service_estimated(&self, service: &str) {
        self.inner
            .services_estimated_total
            .with_label_values(&[service])
            .inc();
    }

    /// Publish the active model; only one version is reported at a time
    pub fn set_model_version(&self, version: &str, revision: &str) {
        self.inner.model_version_info.reset();
        self.inner
            .model_version_info
            .with_label_values(&[version, revision])
            .set(1.0);
    }
}

/// Records metrics for each event, then forwards it
pub struct MetricsObserver {
    metrics: SizerMetrics,
    inner: Arc<dyn EstimationObserver>,
}

impl MetricsObserver {
    pub fn new(metrics: SizerMetrics, inner: Arc<dyn EstimationObserver>) -> Self {
        Self { metrics, inner }
    }
}

impl EstimationObserver for MetricsObserver {
    fn on_event(&self, event: &EstimationEvent<'_>) {
        match event {
            EstimationEvent::ServiceEstimated { service, .. } => {
                self.metrics.inc_service_estimated(service.as_str());
            }
            EstimationEvent::UnrecognizedService { .. } => {
                self.metrics.inc_unrecognized_services();
            }
            EstimationEvent::UnrecognizedNature { .. } => {
                self.metrics.inc_unrecognized_natures();
            }
            EstimationEvent::ZeroNodeGroup { .. } => self.metrics.inc_zero_node_groups(),
            EstimationEvent::GroupAggregated { .. } => self.metrics.inc_groups_estimated(),
            EstimationEvent::CatalogExhausted { .. } => self.metrics.inc_catalog_exhausted(),
            EstimationEvent::EstimationCompleted { elapsed, .. } => {
                self.metrics.inc_estimations();
                self.metrics
                    .observe_estimation_latency(elapsed.as_secs_f64());
            }
            EstimationEvent::RequestReceived { .. }
            | EstimationEvent::DefaultsApplied { .. }
            | EstimationEvent::InstanceSelected { .. } => {}
        }
        self.inner.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Instance;
    use crate::observer::recording::RecordingObserver;
    use std::time::Duration;

    #[test]
    fn test_sizer_metrics_handles_share_state() {
        let metrics = SizerMetrics::new();
        let clone = metrics.clone();

        let before = metrics.estimations();
        clone.inc_estimations();
        assert!(metrics.estimations() > before);

        metrics.observe_estimation_latency(0.0002);
        metrics.set_model_version("analytic", "7.0");
        metrics.inc_service_estimated("data");
    }

    #[test]
    fn test_metrics_observer_counts_and_forwards() {
        let recorder = Arc::new(RecordingObserver::default());
        let metrics = SizerMetrics::new();
        let observer = MetricsObserver::new(metrics.clone(), recorder.clone());

        let before = metrics.catalog_exhausted();
        observer.on_event(&EstimationEvent::CatalogExhausted {
            group: 0,
            cpu: 120.0,
            ram: 2.0,
            fallback: Instance::new(96, 768),
        });
        observer.on_event(&EstimationEvent::EstimationCompleted {
            groups: 1,
            nodes_allocated: 3,
            elapsed: Duration::from_micros(25),
        });

        // Counters are process-wide, other tests may bump them concurrently
        assert!(metrics.catalog_exhausted() > before);
        assert_eq!(recorder.names(), ["catalog_exhausted", "estimation_completed"]);
    }
}
