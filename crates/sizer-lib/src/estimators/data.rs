//! Data service (key-value store) estimator
//!
//! RAM covers the resident share of active and replica data plus metadata,
//! allocator bin overhead and the high-water mark. Disk covers the
//! append-only file layout and tombstones left by deletes and expiries.

use super::{expiry_ops_per_sec, round_to, EstimatorInput, BYTES_PER_GB};
use crate::config::{BucketType, DataConstants, EvictionPolicy, StorageEngine};
use crate::models::ServiceEstimate;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

pub(super) fn estimate(c: &DataConstants, input: &EstimatorInput<'_>) -> ServiceEstimate {
    ServiceEstimate::new(
        (ram_bytes(c, input) / BYTES_PER_GB).ceil(),
        cpu(c, input),
        (disk_bytes(c, input) / BYTES_PER_GB).ceil(),
        disk_io(c, input),
    )
}

/// Deletes plus expiries per second
fn removal_rate(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    input.workload.deletes_per_sec as f64
        + expiry_ops_per_sec(input.dataset.no_of_documents, c.ttl_days)
}

fn mutation_rate(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    input.workload.writes_per_sec as f64 + removal_rate(c, input)
}

fn metadata_bytes_per_doc(c: &DataConstants) -> f64 {
    match c.bucket_type {
        BucketType::Couchbase => c.metadata_bytes_couchbase,
        BucketType::Ephemeral => c.metadata_bytes_ephemeral,
    }
}

/// Active plus replica metadata and keys
fn metadata_keyset_bytes(c: &DataConstants, documents: f64) -> f64 {
    let active = documents * metadata_bytes_per_doc(c) + documents * c.avg_key_size;
    active + active * c.num_replicas
}

/// Tombstone bytes retained until the next purge
fn tombstone_bytes(c: &DataConstants, input: &EstimatorInput<'_>, per_stream: f64) -> f64 {
    (c.avg_key_size + per_stream)
        * c.purge_frequency_days
        * (c.num_replicas + 1.0)
        * removal_rate(c, input)
        * SECONDS_PER_DAY
}

/// Memory footprint in bytes, before conversion to GB
pub(super) fn ram_bytes(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    let documents = input.dataset.no_of_documents as f64;
    let resident = input.dataset.resident_ratio as f64 / 100.0;

    let active = documents * input.dataset.average_document_size as f64 * (1.0 - c.compression_ratio);
    let replica = active * c.num_replicas;
    let metadata = metadata_keyset_bytes(c, documents);

    let with_overhead = match c.eviction_policy {
        EvictionPolicy::Value => {
            let total = resident * (active + replica) + metadata;
            total + total * c.jemalloc_bin_size
        }
        EvictionPolicy::Full => {
            let total = resident * (active + replica + metadata);
            total + total * c.jemalloc_bin_size * resident
        }
    };

    let with_tombstones = match c.bucket_type {
        BucketType::Ephemeral => {
            let streams = c.inbound_xdcr_streams + c.outbound_xdcr_streams;
            with_overhead + tombstone_bytes(c, input, c.tombstone_stream_bytes * streams.max(1.0))
        }
        BucketType::Couchbase => with_overhead,
    };

    with_tombstones / c.high_water_mark
}

/// Cores for one bucket including the per-engine minimum
fn cpu(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    let mut cores = c.inbound_xdcr_streams
        + c.outbound_xdcr_streams
        + mutation_rate(c, input) * c.num_replicas / c.mutations_per_core;

    if c.storage_engine == StorageEngine::Couchstore {
        cores += c.couchstore_cpu_overhead;
    }
    cores = round_to(cores, 1).max(c.buckets * c.guardrail_cpu_per_bucket);
    if c.storage_engine == StorageEngine::Couchstore {
        cores += c.min_cores_per_bucket - 1.0;
    }
    cores.ceil()
}

/// Raw cores from mutation rate alone, as used by the linear generation
pub(super) fn raw_cpu(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    c.inbound_xdcr_streams + c.outbound_xdcr_streams + mutation_rate(c, input) / c.mutations_per_core
}

/// On-disk footprint in bytes, before conversion to GB
pub(super) fn disk_bytes(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    if c.bucket_type == BucketType::Ephemeral {
        return 0.0;
    }

    let documents = input.dataset.no_of_documents as f64;
    let append_only = match c.storage_engine {
        StorageEngine::Couchstore => c.append_only_multiplier_couchstore,
        StorageEngine::Magma => c.append_only_multiplier_magma,
    };

    let configured_streams = [c.inbound_xdcr_streams, c.outbound_xdcr_streams]
        .iter()
        .filter(|streams| **streams > 0.0)
        .count() as f64;
    let tombstones =
        tombstone_bytes(c, input, c.tombstone_stream_bytes * configured_streams.max(1.0)).round();

    let active = documents * input.dataset.average_document_size as f64;
    let replica = active * c.num_replicas;
    let compressed = (active + replica) * (1.0 - c.compression_ratio);

    (compressed + metadata_keyset_bytes(c, documents)) * append_only + tombstones
}

fn disk_io(c: &DataConstants, input: &EstimatorInput<'_>) -> f64 {
    match c.bucket_type {
        BucketType::Ephemeral => 0.0,
        BucketType::Couchbase => mutation_rate(c, input) * (c.num_replicas + 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_dataset, read_workload};
    use super::*;
    use crate::models::{Dataset, Workload};

    fn input<'a>(dataset: &'a Dataset, workload: &'a Workload) -> EstimatorInput<'a> {
        EstimatorInput {
            dataset,
            workload,
            nodes: 3,
        }
    }

    #[test]
    fn test_read_preset_estimate() {
        let dataset = read_dataset();
        let workload = read_workload();
        let estimate = estimate(&DataConstants::default(), &input(&dataset, &workload));

        // 0.64 GB of memory rounds up to 1
        assert_eq!(estimate.ram, 1.0);
        // 150 mutations/sec: 0.015 + 0.4 -> 0.4, plus 3 minimum cores -> 3.4 -> 4
        assert_eq!(estimate.cpu, 4.0);
        // 2.13e9 bytes of data files plus 1.56e9 bytes of tombstones
        assert_eq!(estimate.disk, 4.0);
        assert_eq!(estimate.disk_io, 300.0);
    }

    #[test]
    fn test_cpu_floor_applies_without_mutations() {
        let dataset = read_dataset();
        let workload = Workload::default();
        let c = DataConstants::default();
        assert_eq!(cpu(&c, &input(&dataset, &workload)), 4.0);

        let magma = DataConstants {
            storage_engine: StorageEngine::Magma,
            ..DataConstants::default()
        };
        // Only the guardrail minimum remains
        assert_eq!(cpu(&magma, &input(&dataset, &workload)), 1.0);
    }

    #[test]
    fn test_value_eviction_keeps_metadata_resident() {
        let dataset = Dataset {
            resident_ratio: 10,
            ..read_dataset()
        };
        let workload = read_workload();
        let full = ram_bytes(&DataConstants::default(), &input(&dataset, &workload));
        let value = ram_bytes(
            &DataConstants {
                eviction_policy: EvictionPolicy::Value,
                ..DataConstants::default()
            },
            &input(&dataset, &workload),
        );
        assert!(value > full);
    }

    #[test]
    fn test_ephemeral_bucket_has_no_disk_and_pays_tombstones_in_ram() {
        let dataset = read_dataset();
        let workload = read_workload();
        let ephemeral = DataConstants {
            bucket_type: BucketType::Ephemeral,
            ..DataConstants::default()
        };

        let estimate = estimate(&ephemeral, &input(&dataset, &workload));
        assert_eq!(estimate.disk, 0.0);
        assert_eq!(estimate.disk_io, 0.0);

        let persistent = ram_bytes(&DataConstants::default(), &input(&dataset, &workload));
        assert!(ram_bytes(&ephemeral, &input(&dataset, &workload)) > persistent);
    }

    #[test]
    fn test_magma_uses_smaller_append_only_multiplier() {
        let dataset = read_dataset();
        let workload = Workload::default();
        let couchstore = disk_bytes(&DataConstants::default(), &input(&dataset, &workload));
        let magma = disk_bytes(
            &DataConstants {
                storage_engine: StorageEngine::Magma,
                ..DataConstants::default()
            },
            &input(&dataset, &workload),
        );
        assert!((couchstore / magma - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::default();
        let workload = Workload::default();
        let estimate = estimate(&DataConstants::default(), &input(&dataset, &workload));
        assert_eq!(estimate.ram, 0.0);
        assert_eq!(estimate.disk, 0.0);
        assert_eq!(estimate.disk_io, 0.0);
    }
}
