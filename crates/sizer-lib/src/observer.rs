//! Estimation event sink
//!
//! The engine never logs directly. Every intermediate figure it computes is
//! handed to an [`EstimationObserver`] so callers decide whether to trace,
//! count, or ignore it.

use crate::catalog::Instance;
use crate::models::{ComputeRequest, ServiceEstimate, ServiceKind};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A structured record of one step of an estimation
#[derive(Debug, Clone, Copy)]
pub enum EstimationEvent<'a> {
    RequestReceived {
        request: &'a ComputeRequest,
    },
    DefaultsApplied {
        nature: &'a str,
        request: &'a ComputeRequest,
    },
    UnrecognizedNature {
        nature: &'a str,
    },
    ServiceEstimated {
        group: usize,
        service: ServiceKind,
        estimate: ServiceEstimate,
    },
    UnrecognizedService {
        group: usize,
        service: &'a str,
    },
    ZeroNodeGroup {
        group: usize,
    },
    GroupAggregated {
        group: usize,
        nodes: u64,
        requirement: ServiceEstimate,
    },
    InstanceSelected {
        group: usize,
        instance: Instance,
    },
    CatalogExhausted {
        group: usize,
        cpu: f64,
        ram: f64,
        fallback: Instance,
    },
    EstimationCompleted {
        groups: usize,
        nodes_allocated: u64,
        elapsed: Duration,
    },
}

impl EstimationEvent<'_> {
    /// Stable event name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            EstimationEvent::RequestReceived { .. } => "request_received",
            EstimationEvent::DefaultsApplied { .. } => "defaults_applied",
            EstimationEvent::UnrecognizedNature { .. } => "unrecognized_nature",
            EstimationEvent::ServiceEstimated { .. } => "service_estimated",
            EstimationEvent::UnrecognizedService { .. } => "unrecognized_service",
            EstimationEvent::ZeroNodeGroup { .. } => "zero_node_group",
            EstimationEvent::GroupAggregated { .. } => "group_aggregated",
            EstimationEvent::InstanceSelected { .. } => "instance_selected",
            EstimationEvent::CatalogExhausted { .. } => "catalog_exhausted",
            EstimationEvent::EstimationCompleted { .. } => "estimation_completed",
        }
    }
}

/// Receives events while an estimation runs
pub trait EstimationObserver: Send + Sync {
    fn on_event(&self, event: &EstimationEvent<'_>);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EstimationObserver for NoopObserver {
    fn on_event(&self, _event: &EstimationEvent<'_>) {}
}

/// Emits each event as a structured `tracing` record
///
/// Per-service and per-group figures go out at debug level, degraded
/// outcomes at warn, and request completion at info.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    source: String,
}

impl TracingObserver {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl EstimationObserver for TracingObserver {
    fn on_event(&self, event: &EstimationEvent<'_>) {
        let name = event.name();
        match *event {
            EstimationEvent::RequestReceived { request } => {
                debug!(
                    event = name,
                    source = %self.source,
                    workload_nature = %request.workload_nature,
                    service_groups = request.service_groups.len(),
                    request = ?request,
                    "Received sizing request"
                );
            }
            EstimationEvent::DefaultsApplied { nature, request } => {
                debug!(
                    event = name,
                    source = %self.source,
                    workload_nature = %nature,
                    dataset = ?request.dataset,
                    workload = ?request.workload,
                    service_groups = request.service_groups.len(),
                    "Applied workload defaults"
                );
            }
            EstimationEvent::UnrecognizedNature { nature } => {
                warn!(
                    event = name,
                    source = %self.source,
                    workload_nature = %nature,
                    "Unrecognized workload nature, using request as given"
                );
            }
            EstimationEvent::ServiceEstimated {
                group,
                service,
                estimate,
            } => {
                debug!(
                    event = name,
                    source = %self.source,
                    group = group,
                    service = %service,
                    ram = estimate.ram,
                    cpu = estimate.cpu,
                    disk = estimate.disk,
                    disk_io = estimate.disk_io,
                    "Estimated service"
                );
            }
            EstimationEvent::UnrecognizedService { group, service } => {
                warn!(
                    event = name,
                    source = %self.source,
                    group = group,
                    service = %service,
                    "Unrecognized service contributes nothing"
                );
            }
            EstimationEvent::ZeroNodeGroup { group } => {
                warn!(
                    event = name,
                    source = %self.source,
                    group = group,
                    "Service group has no nodes"
                );
            }
            EstimationEvent::GroupAggregated {
                group,
                nodes,
                requirement,
            } => {
                debug!(
                    event = name,
                    source = %self.source,
                    group = group,
                    nodes = nodes,
                    ram = requirement.ram,
                    cpu = requirement.cpu,
                    disk = requirement.disk,
                    disk_io = requirement.disk_io,
                    "Aggregated service group"
                );
            }
            EstimationEvent::InstanceSelected { group, instance } => {
                debug!(
                    event = name,
                    source = %self.source,
                    group = group,
                    vcpu = instance.vcpu,
                    ram = instance.ram,
                    "Selected instance"
                );
            }
            EstimationEvent::CatalogExhausted {
                group,
                cpu,
                ram,
                fallback,
            } => {
                warn!(
                    event = name,
                    source = %self.source,
                    group = group,
                    required_cpu = cpu,
                    required_ram = ram,
                    fallback_vcpu = fallback.vcpu,
                    fallback_ram = fallback.ram,
                    "No instance satisfies requirement, using largest"
                );
            }
            EstimationEvent::EstimationCompleted {
                groups,
                nodes_allocated,
                elapsed,
            } => {
                info!(
                    event = name,
                    source = %self.source,
                    groups = groups,
                    nodes_allocated = nodes_allocated,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "Estimation completed"
                );
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_event_names_are_stable() {
        let request = ComputeRequest::default();
        assert_eq!(
            EstimationEvent::RequestReceived { request: &request }.name(),
            "request_received"
        );
        assert_eq!(
            EstimationEvent::CatalogExhausted {
                group: 0,
                cpu: 120.0,
                ram: 1.0,
                fallback: Instance::new(96, 768),
            }
            .name(),
            "catalog_exhausted"
        );
    }

    /// Collects formatted log lines for inspection
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn records(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_tracing_observer_emits_a_record_per_event() {
        let observer = TracingObserver::new("test");
        let request = ComputeRequest::default();
        let events = [
            EstimationEvent::RequestReceived { request: &request },
            EstimationEvent::DefaultsApplied {
                nature: "read",
                request: &request,
            },
            EstimationEvent::UnrecognizedNature { nature: "bursty" },
            EstimationEvent::ServiceEstimated {
                group: 0,
                service: ServiceKind::Data,
                estimate: ServiceEstimate::new(1.0, 4.0, 4.0, 300.0),
            },
            EstimationEvent::UnrecognizedService {
                group: 0,
                service: "backup",
            },
            EstimationEvent::ZeroNodeGroup { group: 1 },
            EstimationEvent::GroupAggregated {
                group: 0,
                nodes: 3,
                requirement: ServiceEstimate::ZERO,
            },
            EstimationEvent::InstanceSelected {
                group: 0,
                instance: Instance::new(4, 16),
            },
            EstimationEvent::CatalogExhausted {
                group: 0,
                cpu: 120.0,
                ram: 2.0,
                fallback: Instance::new(96, 768),
            },
            EstimationEvent::EstimationCompleted {
                groups: 1,
                nodes_allocated: 3,
                elapsed: Duration::from_micros(40),
            },
        ];

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            for event in &events {
                observer.on_event(event);
            }
        });

        let records = logs.records();
        assert_eq!(records.len(), events.len());
        for (record, event) in records.iter().zip(&events) {
            assert_eq!(record["fields"]["event"], event.name());
            assert_eq!(record["fields"]["source"], "test");
        }

        let level = |name: &str| {
            records
                .iter()
                .find(|r| r["fields"]["event"] == name)
                .map(|r| r["level"].as_str().unwrap().to_string())
                .unwrap()
        };
        assert_eq!(level("service_estimated"), "DEBUG");
        assert_eq!(level("catalog_exhausted"), "WARN");
        assert_eq!(level("unrecognized_service"), "WARN");
        assert_eq!(level("estimation_completed"), "INFO");

        let exhausted = records
            .iter()
            .find(|r| r["fields"]["event"] == "catalog_exhausted")
            .unwrap();
        assert_eq!(exhausted["fields"]["fallback_vcpu"], 96);
        assert_eq!(exhausted["fields"]["required_cpu"], 120.0);
    }
}
