//! Query service estimator
//!
//! CPU only. Each query category is billed against its own per-core
//! throughput and the categories are summed.

use super::EstimatorInput;
use crate::config::QueryConstants;
use crate::models::ServiceEstimate;

pub(super) fn estimate(c: &QueryConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    ServiceEstimate::new(0.0, cpu(c, input), 0.0, 0.0)
}

fn cpu(c: &QueryConstants, input: &EstimatorInput<'_>) -> f64 {
    let simple = c.simple_stale_ok_rate / c.simple_stale_ok_per_core
        + c.simple_stale_false_rate / c.simple_stale_false_per_core;
    let medium = c.medium_stale_ok_rate / c.medium_stale_ok_per_core
        + input.workload.sql_queries_per_sec as f64 / c.medium_stale_false_per_core;
    // No per-core figure exists for complex queries
    let complex = 0.0;

    (simple + medium + complex).ceil()
}
