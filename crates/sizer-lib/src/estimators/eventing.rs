//! Eventing service estimator
//!
//! CPU is the sum of named execution-cost categories, each rounded to three
//! decimals before summing.

use super::{expiry_ops_per_sec, round_to, EstimatorInput};
use crate::config::EventingConstants;
use crate::models::ServiceEstimate;

pub(super) fn estimate(c: &EventingConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    ServiceEstimate::new(0.0, cpu(c, input), 0.0, 0.0)
}

/// CPU per category, in summation order
fn category_cores(c: &EventingConstants, input: &EstimatorInput<'_>) -> [f64; 7] {
    let mutations = input.workload.writes_per_sec as f64
        + input.workload.deletes_per_sec as f64
        + expiry_ops_per_sec(input.dataset.no_of_documents, c.ttl_days);
    let executions = mutations * c.percent_docs_in_function / 100.0;
    let bucket_ops =
        c.read_ops_per_execution + c.write_ops_per_execution + c.delete_ops_per_execution;

    [
        mutations * c.handlers / c.source_mutations_per_core,
        c.handlers / c.handlers_per_core,
        bucket_ops * executions / c.bucket_ops_per_core,
        executions / c.timers_per_core * c.timers_per_execution,
        executions / c.n1ql_per_core * c.n1ql_per_execution,
        executions / c.logs_per_core * c.logs_per_execution,
        executions / c.curls_per_core * c.curls_per_execution,
    ]
    .map(|cores| round_to(cores, 3))
}

fn cpu(c: &EventingConstants, input: &EstimatorInput<'_>) -> f64 {
    category_cores(c, input).iter().sum::<f64>().ceil()
}
