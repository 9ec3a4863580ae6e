//! Operational analytics service estimator
//!
//! The only analytic estimator that already divides by the group's node
//! count; the others are per-service totals.

use super::{per_node, EstimatorInput, BYTES_PER_GB};
use crate::config::AnalyticsConstants;
use crate::models::ServiceEstimate;

pub(super) fn estimate(c: &AnalyticsConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    let dataset = input.dataset;
    let queries = input.workload.sql_queries_per_sec as f64;

    let ram = dataset.no_of_documents as f64
        * dataset.average_document_size as f64
        * dataset.percent_operational_analytics_of_dataset as f64
        / (100.0 * BYTES_PER_GB);
    let cpu = queries / c.queries_per_core;
    let disk = ram * c.disk_per_ram;
    let disk_io = queries * c.iops_per_query;

    ServiceEstimate::new(
        per_node(ram, input.nodes),
        per_node(cpu, input.nodes),
        per_node(disk, input.nodes),
        per_node(disk_io, input.nodes),
    )
}
