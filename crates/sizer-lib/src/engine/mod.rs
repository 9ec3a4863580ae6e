//! Sizing engine facade
//!
//! Wires the defaults resolver, the selected estimator generation, the group
//! aggregator, the instance catalog and the summary composer into a single
//! infallible `estimate` call.


use crate::aggregator::GroupAggregator;
use crate::catalog::InstanceCatalog;
use crate::config::{EngineConfig, ModelVersion};
use crate::defaults::{DefaultsResolver, NaturePresets};
use crate::error::Result;
use crate::estimators::{model_for, EstimatorInput, SizingModel};
use crate::models::{
    ComputeRequest, ComputeResponse, ServiceEstimate, ServiceGroup, ServiceGroupResult,
    ServiceKind,
};
use crate::observer::{EstimationEvent, EstimationObserver, NoopObserver};
use crate::summary::SummaryComposer;
use std::sync::Arc;
use std::time::Instant;

/// Immutable, shareable sizing engine
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests behind an `Arc`.
pub struct SizingEngine {
    model: Box<dyn SizingModel>,
    resolver: DefaultsResolver,
    aggregator: GroupAggregator,
    catalog: InstanceCatalog,
    composer: SummaryComposer,
    observer: Arc<dyn EstimationObserver>,
    config: EngineConfig,
}

impl SizingEngine {
    pub fn builder() -> SizingEngineBuilder {
        SizingEngineBuilder::new()
    }

    /// Engine with the built-in catalog and presets
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn catalog(&self) -> &InstanceCatalog {
        &self.catalog
    }

    pub fn presets(&self) -> &NaturePresets {
        self.resolver.presets()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_version(&self) -> ModelVersion {
        self.model.version()
    }

    /// Size every service group of `request`
    ///
    /// Defaults are resolved on a private copy. Group results keep the
    /// request's group order.
    pub fn estimate(&self, request: &ComputeRequest) -> ComputeResponse {
        let started = Instant::now();
        let observer = self.observer.as_ref();

        observer.on_event(&EstimationEvent::RequestReceived { request });
        let resolved = self.resolver.resolve(request, observer);

        let results = resolved
            .service_groups
            .iter()
            .enumerate()
            .map(|(index, group)| self.estimate_group(index, group, &resolved))
            .collect();

        let response = self.composer.compose(&resolved, results);

        observer.on_event(&EstimationEvent::EstimationCompleted {
            groups: response.service_groups_results.len(),
            nodes_allocated: response.summary.nodes_allocated,
            elapsed: started.elapsed(),
        });
        response
    }

    fn estimate_group(
        &self,
        index: usize,
        group: &ServiceGroup,
        resolved: &ComputeRequest,
    ) -> ServiceGroupResult {
        let observer = self.observer.as_ref();
        let nodes = group.no_of_nodes;

        if nodes == 0 {
            observer.on_event(&EstimationEvent::ZeroNodeGroup { group: index });
            return group_result(group, 0, 0, ServiceEstimate::ZERO, true);
        }

        let input = EstimatorInput {
            dataset: &resolved.dataset,
            workload: &resolved.workload,
            nodes,
        };

        // Unknown names stay in the list as zeros so they still count
        // towards the group's service fan-out.
        let estimates: Vec<ServiceEstimate> = group
            .services
            .iter()
            .map(|name| match name.parse::<ServiceKind>() {
                Ok(kind) => {
                    let estimate = self.model.estimate(kind, &input);
                    observer.on_event(&EstimationEvent::ServiceEstimated {
                        group: index,
                        service: kind,
                        estimate,
                    });
                    estimate
                }
                Err(_) => {
                    observer.on_event(&EstimationEvent::UnrecognizedService {
                        group: index,
                        service: name,
                    });
                    ServiceEstimate::ZERO
                }
            })
            .collect();

        let requirement = self
            .aggregator
            .aggregate(&estimates, nodes, &group.disk_type);
        observer.on_event(&EstimationEvent::GroupAggregated {
            group: index,
            nodes,
            requirement,
        });

        let selection = self.catalog.select(requirement.cpu, requirement.ram);
        if selection.satisfies {
            observer.on_event(&EstimationEvent::InstanceSelected {
                group: index,
                instance: selection.instance,
            });
        } else {
            observer.on_event(&EstimationEvent::CatalogExhausted {
                group: index,
                cpu: requirement.cpu,
                ram: requirement.ram,
                fallback: selection.instance,
            });
        }

        group_result(
            group,
            selection.instance.ram,
            selection.instance.vcpu,
            requirement,
            selection.satisfies,
        )
    }
}

/// Published values are truncated to whole units
fn group_result(
    group: &ServiceGroup,
    ram: u64,
    cpu: u64,
    requirement: ServiceEstimate,
    satisfies: bool,
) -> ServiceGroupResult {
    ServiceGroupResult {
        services: group.services.clone(),
        nodes: group.no_of_nodes,
        estimated_ram: ram,
        estimated_cpu: cpu,
        disk_type: group.disk_type.clone(),
        estimated_disk: requirement.disk as u64,
        estimated_disk_io: requirement.disk_io as u64,
        instance_satisfies_requirement: satisfies,
    }
}

/// Builder for [`SizingEngine`]
pub struct SizingEngineBuilder {
    config: EngineConfig,
    catalog: InstanceCatalog,
    presets: NaturePresets,
    observer: Arc<dyn EstimationObserver>,
    model: Option<Box<dyn SizingModel>>,
}

impl SizingEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: InstanceCatalog::default(),
            presets: NaturePresets::default(),
            observer: Arc::new(NoopObserver),
            model: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for overriding only the model version
    pub fn model_version(mut self, version: ModelVersion) -> Self {
        self.config.model_version = version;
        self
    }

    pub fn catalog(mut self, catalog: InstanceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn presets(mut self, presets: NaturePresets) -> Self {
        self.presets = presets;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn EstimationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use a custom estimator generation instead of the configured one
    pub fn model(mut self, model: Box<dyn SizingModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> Result<SizingEngine> {
        self.config.validate()?;

        let config = self.config;
        let model = match self.model {
            Some(model) => model,
            None => model_for(config.model_version, config.constants.clone()),
        };

        Ok(SizingEngine {
            model,
            resolver: DefaultsResolver::new(self.presets),
            aggregator: GroupAggregator::new(config.aggregation.clone()),
            catalog: self.catalog,
            composer: SummaryComposer::new(config.cluster_option.clone()),
            observer: self.observer,
            config,
        })
    }
}

impl Default for SizingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
