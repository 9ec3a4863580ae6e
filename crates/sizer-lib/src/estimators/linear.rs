//! Placeholder linear estimators
//!
//! Every service is a share of the dataset or an operation rate times a
//! constant, normalized by the group's node count. Kept selectable so
//! results can be compared against the analytic generation.

use super::{analytics, data, per_node, EstimatorInput, SizingModel, BYTES_PER_GB};
use crate::config::{ModelConstants, ModelVersion};
use crate::models::{ServiceEstimate, ServiceKind};

pub struct LinearModel {
    constants: ModelConstants,
}

impl LinearModel {
    pub fn new(constants: ModelConstants) -> Self {
        Self { constants }
    }

    fn data(&self, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants.data;
        let w = input.workload;
        let ops = (w.read_per_sec + w.writes_per_sec + w.deletes_per_sec) as f64;

        ServiceEstimate::new(
            data::ram_bytes(c, input) / BYTES_PER_GB,
            data::raw_cpu(c, input),
            data::disk_bytes(c, input) / BYTES_PER_GB,
            per_node(ops * self.constants.linear.data_iops_per_op, input.nodes),
        )
    }

    fn index(&self, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants.linear;
        let ram = dataset_share_gb(input, input.dataset.percent_indexes_of_dataset);
        let queries = input.workload.sql_queries_per_sec as f64;

        normalized(
            input.nodes,
            ram,
            queries / c.index_queries_per_core,
            ram * c.index_disk_per_ram,
            queries * c.index_iops_per_query,
        )
    }

    fn query(&self, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants.linear;
        let queries = input.workload.sql_queries_per_sec as f64;
        let ram = queries * c.query_ram_per_query;

        normalized(
            input.nodes,
            ram,
            queries / c.query_queries_per_core,
            ram * c.query_disk_per_ram,
            queries * c.query_iops_per_query,
        )
    }

    fn search(&self, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants.linear;
        let ram = dataset_share_gb(input, input.dataset.percent_full_text_search_of_dataset);
        let ops = (input.workload.read_per_sec + input.workload.writes_per_sec) as f64;

        normalized(
            input.nodes,
            ram,
            ops / c.search_ops_per_core,
            ram * c.search_disk_per_ram,
            ops * c.search_iops_per_op,
        )
    }

    fn eventing(&self, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants.linear;
        let writes = input.workload.writes_per_sec as f64;
        let ram = writes * c.eventing_ram_per_write;

        normalized(
            input.nodes,
            ram,
            writes / c.eventing_writes_per_core,
            ram * c.eventing_disk_per_ram,
            writes * c.eventing_iops_per_write,
        )
    }
}

impl SizingModel for LinearModel {
    fn estimate(&self, kind: ServiceKind, input: &EstimatorInput<'_>) -> ServiceEstimate {
        match kind {
            ServiceKind::Data => self.data(input),
            ServiceKind::Index => self.index(input),
            ServiceKind::Query => self.query(input),
            ServiceKind::Search => self.search(input),
            ServiceKind::Eventing => self.eventing(input),
            ServiceKind::Analytics => analytics::estimate(&self.constants.analytics, input),
        }
    }

    fn version(&self) -> ModelVersion {
        ModelVersion::Linear
    }
}

/// GB of the raw dataset covered by `percent`
fn dataset_share_gb(input: &EstimatorInput<'_>, percent: u64) -> f64 {
    let dataset = input.dataset;
    dataset.no_of_documents as f64 * dataset.average_document_size as f64 * percent as f64
        / (100.0 * BYTES_PER_GB)
}

fn normalized(nodes: u64, ram: f64, cpu: f64, disk: f64, disk_io: f64) -> ServiceEstimate {
    ServiceEstimate::new(
        per_node(ram, nodes),
        per_node(cpu, nodes),
        per_node(disk, nodes),
        per_node(disk_io, nodes),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_dataset, read_workload};
    use super::*;

    fn estimate_at(kind: ServiceKind, nodes: u64) -> ServiceEstimate {
        let dataset = read_dataset();
        let workload = read_workload();
        let input = EstimatorInput {
            dataset: &dataset,
            workload: &workload,
            nodes,
        };
        LinearModel::new(ModelConstants::default()).estimate(kind, &input)
    }

    #[test]
    fn test_query_scales_with_sql_rate() {
        let estimate = estimate_at(ServiceKind::Query, 2);
        // 2000 queries/sec: 100 GB, 25 cores, 6000 IOPS before the split
        assert_eq!(estimate.ram, 50.0);
        assert_eq!(estimate.cpu, 12.5);
        assert_eq!(estimate.disk, 75.0);
        assert_eq!(estimate.disk_io, 3000.0);
    }

    #[test]
    fn test_eventing_scales_with_writes() {
        let estimate = estimate_at(ServiceKind::Eventing, 1);
        assert!((estimate.ram - 10.0).abs() < 1e-9);
        assert_eq!(estimate.cpu, 0.5);
        assert_eq!(estimate.disk_io, 500.0);
    }

    #[test]
    fn test_zero_nodes_yields_zero() {
        for kind in [
            ServiceKind::Index,
            ServiceKind::Query,
            ServiceKind::Search,
            ServiceKind::Eventing,
            ServiceKind::Analytics,
        ] {
            assert_eq!(estimate_at(kind, 0), ServiceEstimate::ZERO, "{}", kind);
        }
        assert_eq!(estimate_at(ServiceKind::Data, 0).disk_io, 0.0);
    }

    #[test]
    fn test_data_uses_unrounded_formulas() {
        let estimate = estimate_at(ServiceKind::Data, 3);
        assert!(estimate.ram > 0.6 && estimate.ram < 0.7);
        assert!((estimate.cpu - 0.015).abs() < 1e-9);
        // 5150 ops/sec at 10 IOPS each, over three nodes
        assert!((estimate.disk_io - 51500.0 / 3.0).abs() < 1e-9);
    }
}
