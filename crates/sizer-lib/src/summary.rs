//! Cluster-wide summary assembly

use crate::models::{ComputeRequest, ComputeResponse, ServiceGroupResult, Summary};

#[derive(Debug, Clone)]
pub struct SummaryComposer {
    cluster_option: String,
}

impl SummaryComposer {
    pub fn new(cluster_option: impl Into<String>) -> Self {
        Self {
            cluster_option: cluster_option.into(),
        }
    }

    /// Pair the per-group results with totals derived from the resolved request
    pub fn compose(
        &self,
        resolved: &ComputeRequest,
        results: Vec<ServiceGroupResult>,
    ) -> ComputeResponse {
        let groups = &resolved.service_groups;

        let summary = Summary {
            cluster_option: self.cluster_option.clone(),
            nodes_allocated: groups.iter().map(|g| g.no_of_nodes).sum(),
            service_groups: groups.len() as u64,
            services: groups
                .iter()
                .flat_map(|g| g.services.iter().cloned())
                .collect(),
            workload_type: resolved.workload_nature.clone(),
        };

        ComputeResponse {
            summary,
            service_groups_results: results,
        }
    }
}

impl Default for SummaryComposer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CLUSTER_OPTION)
    }
}
