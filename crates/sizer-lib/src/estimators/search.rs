//! Full-text search service estimator

use super::{round_to, EstimatorInput, BYTES_PER_GB, BYTES_PER_MB};
use crate::config::SearchConstants;
use crate::models::ServiceEstimate;

pub(super) fn estimate(c: &SearchConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    ServiceEstimate::new(ram(c), c.partitions.ceil(), disk(c, input), 0.0)
}

/// Memory held by in-flight result sets
fn ram(c: &SearchConstants) -> f64 {
    let per_scan = (c.max_size + c.max_from + c.search_results_size) * c.document_match_size;
    round_to(per_scan / BYTES_PER_GB * c.scans_per_sec, 2).ceil()
}

fn disk(c: &SearchConstants, input: &EstimatorInput<'_>) -> f64 {
    let documents = input.dataset.no_of_documents as f64;
    let indexed = documents * input.dataset.percent_full_text_search_of_dataset as f64 / 100.0;
    let options = c.enabled_options();

    let field_bytes = if options == 0 {
        indexed * c.avg_field_length * c.field_length_factor * 1.3
    } else {
        indexed
            * c.avg_field_length
            * c.field_length_factor
            * options as f64
            * 1.5
            * c.field_length_factor
    };
    let index_mb = round_to((documents * c.avg_key_size + field_bytes) / BYTES_PER_MB, 0);

    (index_mb * (c.num_replicas + 1.0) / 1024.0).ceil()
}
