//! Core data models for the sizing engine
//!
//! Field names follow the JSON wire format of the estimate endpoint, so the
//! same types are decoded by the service and handed straight to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dataset characteristics used by every estimator
///
/// Percentages are taken as given. Values above 100 are not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub no_of_documents: u64,
    /// Average document size in bytes
    #[serde(default)]
    pub average_document_size: u64,
    /// Percentage of the active dataset that must stay memory-resident
    #[serde(default)]
    pub resident_ratio: u64,
    #[serde(default)]
    pub percent_indexes_of_dataset: u64,
    #[serde(default)]
    pub percent_full_text_search_of_dataset: u64,
    #[serde(default)]
    pub percent_operational_analytics_of_dataset: u64,
}

/// Expected operation rates, all per second
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub read_per_sec: u64,
    #[serde(default)]
    pub writes_per_sec: u64,
    #[serde(default)]
    pub deletes_per_sec: u64,
    #[serde(default)]
    pub sql_queries_per_sec: u64,
}

/// A deployment unit: co-located services sharing a node count and disk type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    #[serde(default)]
    pub name: String,
    pub services: Vec<String>,
    pub no_of_nodes: u64,
    pub disk_type: String,
}

impl ServiceGroup {
    pub fn new(services: &[ServiceKind], no_of_nodes: u64, disk_type: &str) -> Self {
        Self {
            name: String::new(),
            services: services.iter().map(ToString::to_string).collect(),
            no_of_nodes,
            disk_type: disk_type.to_string(),
        }
    }
}

/// Input to a single estimation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequest {
    #[serde(default)]
    pub service_groups: Vec<ServiceGroup>,
    #[serde(default)]
    pub dataset: Dataset,
    #[serde(default)]
    pub workload: Workload,
    #[serde(default)]
    pub workload_nature: String,
}

/// Cluster-wide overview of an estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub cluster_option: String,
    pub nodes_allocated: u64,
    pub service_groups: u64,
    /// Every service of every group, in request order, duplicates kept
    pub services: Vec<String>,
    pub workload_type: String,
}

/// Published requirement for one service group
///
/// `estimated_ram` and `estimated_cpu` are always the selected instance's
/// values, never the raw aggregated requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroupResult {
    pub services: Vec<String>,
    pub nodes: u64,
    pub estimated_ram: u64,
    pub estimated_cpu: u64,
    pub disk_type: String,
    pub estimated_disk: u64,
    pub estimated_disk_io: u64,
    /// False when the catalog ran out and the largest instance was returned
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub instance_satisfies_requirement: bool,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Output of a single estimation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub summary: Summary,
    pub service_groups_results: Vec<ServiceGroupResult>,
}

/// Resource requirement of one service in isolation, or of a whole group
/// after aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEstimate {
    /// RAM in GB
    pub ram: f64,
    pub cpu: f64,
    /// Disk capacity in GB
    pub disk: f64,
    pub disk_io: f64,
}

impl ServiceEstimate {
    pub const ZERO: Self = Self {
        ram: 0.0,
        cpu: 0.0,
        disk: 0.0,
        disk_io: 0.0,
    };

    pub fn new(ram: f64, cpu: f64, disk: f64, disk_io: f64) -> Self {
        Self {
            ram,
            cpu,
            disk,
            disk_io,
        }
    }
}

/// Service kinds the engine knows how to size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Data,
    Index,
    Query,
    Search,
    Eventing,
    Analytics,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Data,
        ServiceKind::Index,
        ServiceKind::Query,
        ServiceKind::Search,
        ServiceKind::Eventing,
        ServiceKind::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Data => "data",
            ServiceKind::Index => "index",
            ServiceKind::Query => "query",
            ServiceKind::Search => "search",
            ServiceKind::Eventing => "eventing",
            ServiceKind::Analytics => "analytics",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown service kind: {}", s))
    }
}

/// Workload character used to pick a preset bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadNature {
    Read,
    Write,
    #[serde(rename = "readwrite")]
    ReadWrite,
    /// Use every caller-supplied value verbatim
    Override,
}

impl WorkloadNature {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadNature::Read => "read",
            WorkloadNature::Write => "write",
            WorkloadNature::ReadWrite => "readwrite",
            WorkloadNature::Override => "override",
        }
    }
}

impl fmt::Display for WorkloadNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadNature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(WorkloadNature::Read),
            "write" => Ok(WorkloadNature::Write),
            "readwrite" => Ok(WorkloadNature::ReadWrite),
            "override" => Ok(WorkloadNature::Override),
            other => Err(format!("unknown workload nature: {}", other)),
        }
    }
}
