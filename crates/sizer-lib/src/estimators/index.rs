//! Secondary index service estimator (plasma storage)

use super::{EstimatorInput, BYTES_PER_GB};
use crate::config::IndexConstants;
use crate::models::ServiceEstimate;

pub(super) fn estimate(c: &IndexConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    let cores = cpu(c);
    ServiceEstimate::new(ram(c, input, cores), cores, disk(c, input), 0.0)
}

/// Documents covered by the index
fn indexed_documents(input: &EstimatorInput<'_>) -> f64 {
    input.dataset.no_of_documents as f64 * input.dataset.percent_indexes_of_dataset as f64 / 100.0
}

fn is_array(c: &IndexConstants) -> bool {
    c.array_length != 0.0
}

fn ram(c: &IndexConstants, input: &EstimatorInput<'_>, cores: f64) -> f64 {
    let items = indexed_documents(input);
    let versions = (c.mutation_ingest_rate * c.mvcc_window_secs).min(items * c.mvcc_max_versions_per_item);
    let live_items = items + versions;

    let item_bytes = if c.primary_index {
        (c.avg_key_size + c.data_structure_size) * live_items
    } else if is_array(c) {
        let entry = c.data_structure_size + c.avg_key_size + c.non_array_fields_size;
        let whole = entry + c.array_element_size * c.array_length;
        let per_element = (entry + c.array_element_size) * c.array_length;
        (whole + per_element) * live_items * 1.2
    } else {
        (c.total_secondary_bytes + c.avg_key_size + c.data_structure_size) * live_items * 2.0
    };

    let write_buffer = if c.default_index {
        c.write_buffer_bytes
    } else {
        c.write_buffer_bytes / 100.0
    };

    let entry_bytes = if is_array(c) {
        c.avg_key_size + c.array_element_size * c.array_length + c.non_array_fields_size
    } else {
        c.total_secondary_bytes + c.avg_key_size
    };
    let mutation_buffers = (entry_bytes * (c.mutation_ingest_rate / 1000.0) * 4000.0).ceil();

    let encode_unit = if is_array(c) {
        c.array_encode_buffer_bytes
    } else {
        c.encode_buffer_bytes
    };
    let encode_buffers = encode_unit * (cores * 1.2).ceil();

    let total = versions
        + item_bytes
        + write_buffer
        + mutation_buffers
        + encode_buffers
        + c.mutation_queue_overhead_bytes
        + c.comm_buffer_bytes
        + c.protobuf_allocation_bytes;

    let usage_gb = total * c.runtime_overhead / BYTES_PER_GB;
    let with_replicas = usage_gb + usage_gb * c.num_replicas;
    let resident = with_replicas * c.resident_ratio;

    (resident * c.runtime_overhead).max(1.0).ceil()
}

fn cpu(c: &IndexConstants) -> f64 {
    let mutation_cores = if c.default_index {
        let fanout = if is_array(c) { c.array_length } else { 1.0 };
        c.mutation_ingest_rate * fanout / c.mutation_throughput_per_core
    } else {
        0.0
    };
    let scan_cores = c.scan_rate / c.scan_throughput_per_core;

    let cores = mutation_cores + scan_cores;
    let with_replicas = cores + cores * c.num_replicas;
    (with_replicas * c.cpu_margin).max(1.0).ceil()
}

/// Bytes of a page-structured index holding `items` entries of `entry_bytes`
fn page_layout_bytes(c: &IndexConstants, items: f64, entry_bytes: f64) -> f64 {
    let pages = items * 2.0 / c.items_per_page;
    pages * (entry_bytes + c.page_entry_bytes) * 4.0 + (entry_bytes + c.item_entry_bytes) * items * 2.0
}

fn disk(c: &IndexConstants, input: &EstimatorInput<'_>) -> f64 {
    let items = indexed_documents(input);

    let usage = if c.primary_index {
        page_layout_bytes(c, items, c.avg_key_size) * 2.0
    } else if is_array(c) {
        let whole = c.array_element_size * c.array_length + c.non_array_fields_size + c.avg_key_size;
        let element = c.array_element_size + c.non_array_fields_size + c.avg_key_size;
        let elements = items * c.array_length;
        let element_pages = elements * 2.0 / c.items_per_page * (element + c.page_entry_bytes) * 4.0;
        let element_items = (element + c.item_entry_bytes) * elements * 2.0;
        (page_layout_bytes(c, items, whole) + element_pages + element_items).ceil()
    } else {
        page_layout_bytes(c, items, c.total_secondary_bytes + c.avg_key_size) * 2.0
    };

    let compressed = usage * c.snappy_ratio;
    let fragmentation = usage * c.fragmentation;
    let expected_gb = (compressed + fragmentation) / BYTES_PER_GB;

    let with_margin = expected_gb * c.dgm_overhead;
    let with_replicas = with_margin + with_margin * c.num_replicas;
    with_replicas.max(1.0).ceil()
}
