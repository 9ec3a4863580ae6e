//! Engine configuration
//!
//! Every numeric constant used by the estimators and the aggregator lives
//! here rather than inside the formulas. All structs deserialize with
//! per-field defaults, so a config file only needs to name what it changes.

use crate::error::{Result, SizerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default label published in every summary
pub const DEFAULT_CLUSTER_OPTION: &str = "Custom";

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which estimator generation to run
    pub model_version: ModelVersion,
    pub constants: ModelConstants,
    pub aggregation: AggregationConfig,
    /// Label reported as `cluster_option` in the summary
    pub cluster_option: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_version: ModelVersion::default(),
            constants: ModelConstants::default(),
            aggregation: AggregationConfig::default(),
            cluster_option: DEFAULT_CLUSTER_OPTION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document on top of the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SizerError::ConfigRead(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.aggregation.validate()?;
        self.constants.validate()?;
        Ok(())
    }
}

/// Estimator generation selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVersion {
    /// Detailed per-service analytic formulas
    #[default]
    Analytic,
    /// Placeholder linear formulas normalized by node count
    Linear,
}

impl ModelVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVersion::Analytic => "analytic",
            ModelVersion::Linear => "linear",
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVersion {
    type Err = SizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "analytic" => Ok(ModelVersion::Analytic),
            "linear" => Ok(ModelVersion::Linear),
            _ => Err(SizerError::UnknownModelVersion(s.to_string())),
        }
    }
}

/// Group aggregation policy constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Usable fraction of node RAM once headroom is reserved
    pub ram_headroom: f64,
    pub disk_floor_gb: f64,
    pub disk_ceiling_gb: f64,
    /// Applies to every disk type, known or not
    pub iops_floor: f64,
    /// IOPS ceiling per disk type. Types missing here are left unclamped.
    pub iops_ceilings: BTreeMap<String, f64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            ram_headroom: 0.8,
            disk_floor_gb: 50.0,
            disk_ceiling_gb: 16000.0,
            iops_floor: 3000.0,
            iops_ceilings: BTreeMap::from([
                ("gp3".to_string(), 16000.0),
                ("io2".to_string(), 64000.0),
            ]),
        }
    }
}

impl AggregationConfig {
    fn validate(&self) -> Result<()> {
        if self.ram_headroom <= 0.0 {
            return Err(SizerError::invalid("aggregation.ram_headroom", "must be > 0"));
        }
        if self.disk_floor_gb > self.disk_ceiling_gb {
            return Err(SizerError::invalid(
                "aggregation.disk_floor_gb",
                "must not exceed disk_ceiling_gb",
            ));
        }
        for (disk_type, ceiling) in &self.iops_ceilings {
            if *ceiling < self.iops_floor {
                return Err(SizerError::invalid(
                    format!("aggregation.iops_ceilings.{}", disk_type),
                    "must not be below iops_floor",
                ));
            }
        }
        Ok(())
    }
}

/// Versioned bundle of estimator constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    /// Revision of the sizing methodology these constants replicate
    pub revision: String,
    pub data: DataConstants,
    pub index: IndexConstants,
    pub query: QueryConstants,
    pub eventing: EventingConstants,
    pub search: SearchConstants,
    pub analytics: AnalyticsConstants,
    pub linear: LinearConstants,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            revision: "7.0".to_string(),
            data: DataConstants::default(),
            index: IndexConstants::default(),
            query: QueryConstants::default(),
            eventing: EventingConstants::default(),
            search: SearchConstants::default(),
            analytics: AnalyticsConstants::default(),
            linear: LinearConstants::default(),
        }
    }
}

impl ModelConstants {
    fn validate(&self) -> Result<()> {
        let throughputs = [
            ("data.mutations_per_core", self.data.mutations_per_core),
            ("data.high_water_mark", self.data.high_water_mark),
            ("index.mutation_throughput_per_core", self.index.mutation_throughput_per_core),
            ("index.scan_throughput_per_core", self.index.scan_throughput_per_core),
            ("index.items_per_page", self.index.items_per_page),
            ("query.simple_stale_ok_per_core", self.query.simple_stale_ok_per_core),
            ("query.simple_stale_false_per_core", self.query.simple_stale_false_per_core),
            ("query.medium_stale_ok_per_core", self.query.medium_stale_ok_per_core),
            ("query.medium_stale_false_per_core", self.query.medium_stale_false_per_core),
            ("eventing.source_mutations_per_core", self.eventing.source_mutations_per_core),
            ("eventing.handlers_per_core", self.eventing.handlers_per_core),
            ("eventing.bucket_ops_per_core", self.eventing.bucket_ops_per_core),
            ("eventing.timers_per_core", self.eventing.timers_per_core),
            ("eventing.n1ql_per_core", self.eventing.n1ql_per_core),
            ("eventing.logs_per_core", self.eventing.logs_per_core),
            ("eventing.curls_per_core", self.eventing.curls_per_core),
            ("analytics.queries_per_core", self.analytics.queries_per_core),
            ("linear.index_queries_per_core", self.linear.index_queries_per_core),
            ("linear.query_queries_per_core", self.linear.query_queries_per_core),
            ("linear.search_ops_per_core", self.linear.search_ops_per_core),
            ("linear.eventing_writes_per_core", self.linear.eventing_writes_per_core),
        ];

        for (field, value) in throughputs {
            if value <= 0.0 {
                return Err(SizerError::invalid(field, "must be > 0"));
            }
        }
        if !(0.0..1.0).contains(&self.data.compression_ratio) {
            return Err(SizerError::invalid("data.compression_ratio", "must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Data service bucket flavor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    /// Persistent bucket
    #[default]
    Couchbase,
    /// Memory-only bucket
    Ephemeral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Metadata and values may both be evicted
    #[default]
    Full,
    /// Only values may be evicted; metadata stays resident
    Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    Couchstore,
    Magma,
}

/// Data service constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConstants {
    /// Document TTL in days, 0 disables expiry
    pub ttl_days: f64,
    pub avg_key_size: f64,
    pub inbound_xdcr_streams: f64,
    pub outbound_xdcr_streams: f64,
    /// Metadata purge interval in days
    pub purge_frequency_days: f64,
    pub num_replicas: f64,
    pub bucket_type: BucketType,
    pub metadata_bytes_couchbase: f64,
    pub metadata_bytes_ephemeral: f64,
    pub compression_ratio: f64,
    pub eviction_policy: EvictionPolicy,
    pub jemalloc_bin_size: f64,
    pub high_water_mark: f64,
    pub storage_engine: StorageEngine,
    /// Bytes kept per tombstone per replication stream
    pub tombstone_stream_bytes: f64,
    pub mutations_per_core: f64,
    pub couchstore_cpu_overhead: f64,
    pub buckets: f64,
    pub guardrail_cpu_per_bucket: f64,
    pub min_cores_per_bucket: f64,
    pub append_only_multiplier_couchstore: f64,
    pub append_only_multiplier_magma: f64,
}

impl Default for DataConstants {
    fn default() -> Self {
        Self {
            ttl_days: 0.0,
            avg_key_size: 0.0,
            inbound_xdcr_streams: 0.0,
            outbound_xdcr_streams: 0.0,
            purge_frequency_days: 3.0,
            num_replicas: 1.0,
            bucket_type: BucketType::Couchbase,
            metadata_bytes_couchbase: 56.0,
            metadata_bytes_ephemeral: 72.0,
            compression_ratio: 0.3,
            eviction_policy: EvictionPolicy::Full,
            jemalloc_bin_size: 0.25,
            high_water_mark: 0.85,
            storage_engine: StorageEngine::Couchstore,
            tombstone_stream_bytes: 60.0,
            mutations_per_core: 10000.0,
            couchstore_cpu_overhead: 0.4,
            buckets: 1.0,
            guardrail_cpu_per_bucket: 0.2,
            min_cores_per_bucket: 4.0,
            append_only_multiplier_couchstore: 3.0,
            append_only_multiplier_magma: 2.0,
        }
    }
}

/// Index service constants (plasma storage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConstants {
    pub avg_key_size: f64,
    pub mutation_ingest_rate: f64,
    pub scan_rate: f64,
    pub primary_index: bool,
    /// Whether the index is the default one, which pays for mutation cores
    /// and the full write buffer
    pub default_index: bool,
    pub array_length: f64,
    pub array_element_size: f64,
    pub non_array_fields_size: f64,
    pub total_secondary_bytes: f64,
    pub data_structure_size: f64,
    /// MVCC window in seconds over which mutations produce extra versions
    pub mvcc_window_secs: f64,
    pub mvcc_max_versions_per_item: f64,
    pub write_buffer_bytes: f64,
    pub mutation_queue_overhead_bytes: f64,
    pub comm_buffer_bytes: f64,
    pub protobuf_allocation_bytes: f64,
    pub encode_buffer_bytes: f64,
    pub array_encode_buffer_bytes: f64,
    pub num_replicas: f64,
    /// Resident ratio of the index itself, independent of the dataset's
    pub resident_ratio: f64,
    pub runtime_overhead: f64,
    pub mutation_throughput_per_core: f64,
    pub scan_throughput_per_core: f64,
    pub cpu_margin: f64,
    pub items_per_page: f64,
    pub page_entry_bytes: f64,
    pub item_entry_bytes: f64,
    pub snappy_ratio: f64,
    pub fragmentation: f64,
    /// DGM plus recommended overhead on top of expected disk usage
    pub dgm_overhead: f64,
}

impl Default for IndexConstants {
    fn default() -> Self {
        Self {
            avg_key_size: 0.0,
            mutation_ingest_rate: 0.0,
            scan_rate: 0.0,
            primary_index: false,
            default_index: false,
            array_length: 0.0,
            array_element_size: 0.0,
            non_array_fields_size: 0.0,
            total_secondary_bytes: 0.0,
            data_structure_size: 114.0,
            mvcc_window_secs: 20.0 * 60.0,
            mvcc_max_versions_per_item: 3.0,
            write_buffer_bytes: 8.0 * 1024.0 * 1024.0,
            mutation_queue_overhead_bytes: 256.0 * 1024.0 * 1024.0,
            comm_buffer_bytes: 100.0 * 1024.0 * 1024.0,
            protobuf_allocation_bytes: 150.0 * 1024.0 * 1024.0,
            encode_buffer_bytes: 1794.0,
            array_encode_buffer_bytes: 6660.0,
            num_replicas: 1.0,
            resident_ratio: 0.1,
            runtime_overhead: 1.05,
            mutation_throughput_per_core: 12500.0,
            scan_throughput_per_core: 9000.0,
            cpu_margin: 1.2,
            items_per_page: 400.0,
            page_entry_bytes: 56.0,
            item_entry_bytes: 16.0,
            snappy_ratio: 0.8,
            fragmentation: 0.3,
            dgm_overhead: 1.3,
        }
    }
}

/// Query service constants, expressed as queries per second per core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConstants {
    pub simple_stale_ok_rate: f64,
    pub simple_stale_ok_per_core: f64,
    pub simple_stale_false_rate: f64,
    pub simple_stale_false_per_core: f64,
    pub medium_stale_ok_rate: f64,
    pub medium_stale_ok_per_core: f64,
    /// The request's SQL rate is billed against this category
    pub medium_stale_false_per_core: f64,
}

impl Default for QueryConstants {
    fn default() -> Self {
        Self {
            simple_stale_ok_rate: 0.0,
            simple_stale_ok_per_core: 14000.0 / 24.0,
            simple_stale_false_rate: 0.0,
            simple_stale_false_per_core: 700.0 / 24.0,
            medium_stale_ok_rate: 0.0,
            medium_stale_ok_per_core: 1500.0 / 24.0,
            medium_stale_false_per_core: 400.0 / 24.0,
        }
    }
}

/// Eventing service constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventingConstants {
    pub ttl_days: f64,
    pub handlers: f64,
    /// Share of source documents a handler fires on, in percent
    pub percent_docs_in_function: f64,
    pub read_ops_per_execution: f64,
    pub write_ops_per_execution: f64,
    pub delete_ops_per_execution: f64,
    pub timers_per_execution: f64,
    pub n1ql_per_execution: f64,
    pub logs_per_execution: f64,
    pub curls_per_execution: f64,
    pub source_mutations_per_core: f64,
    pub handlers_per_core: f64,
    pub bucket_ops_per_core: f64,
    pub timers_per_core: f64,
    pub n1ql_per_core: f64,
    pub logs_per_core: f64,
    pub curls_per_core: f64,
}

impl Default for EventingConstants {
    fn default() -> Self {
        Self {
            ttl_days: 0.0,
            handlers: 1.0,
            percent_docs_in_function: 0.0,
            read_ops_per_execution: 0.0,
            write_ops_per_execution: 0.0,
            delete_ops_per_execution: 0.0,
            timers_per_execution: 0.0,
            n1ql_per_execution: 0.0,
            logs_per_execution: 0.0,
            curls_per_execution: 0.0,
            source_mutations_per_core: 115000.0 / 24.0,
            handlers_per_core: 5.0 / 24.0,
            bucket_ops_per_core: 83000.0 / 24.0,
            timers_per_core: 26500.0 / 24.0,
            n1ql_per_core: 8500.0 / 24.0,
            logs_per_core: 105500.0 / 24.0,
            curls_per_core: 1100.0 / 24.0,
        }
    }
}

/// Full-text search service constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConstants {
    pub max_size: f64,
    pub max_from: f64,
    pub search_results_size: f64,
    pub document_match_size: f64,
    pub scans_per_sec: f64,
    pub partitions: f64,
    pub index_field: bool,
    pub store_field: bool,
    pub include_in_all: bool,
    pub include_term_vectors: bool,
    pub doc_values: bool,
    pub avg_key_size: f64,
    pub avg_field_length: f64,
    pub field_length_factor: f64,
    pub num_replicas: f64,
}

impl Default for SearchConstants {
    fn default() -> Self {
        Self {
            max_size: 0.0,
            max_from: 0.0,
            search_results_size: 112.0,
            document_match_size: 160.0,
            scans_per_sec: 0.0,
            partitions: 1.0,
            index_field: false,
            store_field: false,
            include_in_all: false,
            include_term_vectors: false,
            doc_values: false,
            avg_key_size: 0.0,
            avg_field_length: 0.0,
            field_length_factor: 1.21,
            num_replicas: 0.0,
        }
    }
}

impl SearchConstants {
    /// Number of enabled field options
    pub fn enabled_options(&self) -> u32 {
        [
            self.index_field,
            self.store_field,
            self.include_in_all,
            self.include_term_vectors,
            self.doc_values,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count() as u32
    }
}

/// Operational analytics service constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConstants {
    pub queries_per_core: f64,
    pub disk_per_ram: f64,
    pub iops_per_query: f64,
}

impl Default for AnalyticsConstants {
    fn default() -> Self {
        Self {
            queries_per_core: 50.0,
            disk_per_ram: 3.0,
            iops_per_query: 6.0,
        }
    }
}

/// Constants of the placeholder linear generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConstants {
    pub data_iops_per_op: f64,
    pub index_queries_per_core: f64,
    pub index_disk_per_ram: f64,
    pub index_iops_per_query: f64,
    pub query_ram_per_query: f64,
    pub query_queries_per_core: f64,
    pub query_disk_per_ram: f64,
    pub query_iops_per_query: f64,
    pub search_ops_per_core: f64,
    pub search_disk_per_ram: f64,
    pub search_iops_per_op: f64,
    pub eventing_ram_per_write: f64,
    pub eventing_writes_per_core: f64,
    pub eventing_disk_per_ram: f64,
    pub eventing_iops_per_write: f64,
}

impl Default for LinearConstants {
    fn default() -> Self {
        Self {
            data_iops_per_op: 10.0,
            index_queries_per_core: 100.0,
            index_disk_per_ram: 2.0,
            index_iops_per_query: 5.0,
            query_ram_per_query: 0.05,
            query_queries_per_core: 80.0,
            query_disk_per_ram: 1.5,
            query_iops_per_query: 3.0,
            search_ops_per_core: 150.0,
            search_disk_per_ram: 2.5,
            search_iops_per_op: 8.0,
            eventing_ram_per_write: 0.1,
            eventing_writes_per_core: 200.0,
            eventing_disk_per_ram: 1.2,
            eventing_iops_per_write: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster_option, "Custom");
        assert_eq!(config.model_version, ModelVersion::Analytic);
        assert_eq!(config.aggregation.iops_ceilings["gp3"], 16000.0);
        assert_eq!(config.aggregation.iops_ceilings["io2"], 64000.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{"model_version": "linear", "aggregation": {"ram_headroom": 0.7}}"#,
        )
        .unwrap();

        assert_eq!(config.model_version, ModelVersion::Linear);
        assert_eq!(config.aggregation.ram_headroom, 0.7);
        assert_eq!(config.aggregation.disk_floor_gb, 50.0);
        assert_eq!(config.constants.data.metadata_bytes_couchbase, 56.0);
    }

    #[test]
    fn test_invalid_headroom_rejected() {
        let err = EngineConfig::from_json(r#"{"aggregation": {"ram_headroom": 0.0}}"#).unwrap_err();
        assert!(matches!(err, SizerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_zero_throughput_rejected() {
        let mut config = EngineConfig::default();
        config.constants.query.medium_stale_false_per_core = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, SizerError::ConfigRead(_)));
    }

    #[test]
    fn test_model_version_parse() {
        assert_eq!("Linear".parse::<ModelVersion>().unwrap(), ModelVersion::Linear);
        assert!(matches!(
            "v3".parse::<ModelVersion>(),
            Err(SizerError::UnknownModelVersion(_))
        ));
    }

    #[test]
    fn test_search_enabled_options() {
        let mut search = SearchConstants::default();
        assert_eq!(search.enabled_options(), 0);
        search.store_field = true;
        search.doc_values = true;
        assert_eq!(search.enabled_options(), 2);
    }
}
