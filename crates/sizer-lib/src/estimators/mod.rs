//! Per-service resource estimators
//!
//! Each service kind has a closed-form estimator mapping the dataset, the
//! workload and the owning group's node count to a [`ServiceEstimate`].
//! Estimators are grouped into generations behind the [`SizingModel`]
//! trait so a new generation can be introduced next to the old one and
//! selected by configuration.

mod analytics;
mod data;
mod eventing;
mod index;
mod linear;
mod query;
mod search;

pub use linear::LinearModel;

use crate::config::{ModelConstants, ModelVersion};
use crate::models::{Dataset, ServiceEstimate, ServiceKind, Workload};

/// Bytes per GB as used throughout the sizing formulas
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes per MB
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Everything an estimator may look at
#[derive(Debug, Clone, Copy)]
pub struct EstimatorInput<'a> {
    pub dataset: &'a Dataset,
    pub workload: &'a Workload,
    /// Node count of the group the service is assigned to
    pub nodes: u64,
}

/// A generation of service estimators
pub trait SizingModel: Send + Sync {
    /// Estimate the requirement of one service kind in isolation
    fn estimate(&self, kind: ServiceKind, input: &EstimatorInput<'_>) -> ServiceEstimate;

    /// Version selector this model answers to
    fn version(&self) -> ModelVersion;
}

/// Build the model selected by `version`
pub fn model_for(version: ModelVersion, constants: ModelConstants) -> Box<dyn SizingModel> {
    match version {
        ModelVersion::Analytic => Box::new(AnalyticModel::new(constants)),
        ModelVersion::Linear => Box::new(LinearModel::new(constants)),
    }
}

/// Detailed analytic estimators
pub struct AnalyticModel {
    constants: ModelConstants,
}

impl AnalyticModel {
    pub fn new(constants: ModelConstants) -> Self {
        Self { constants }
    }
}

impl Default for AnalyticModel {
    fn default() -> Self {
        Self::new(ModelConstants::default())
    }
}

impl SizingModel for AnalyticModel {
    fn estimate(&self, kind: ServiceKind, input: &EstimatorInput<'_>) -> ServiceEstimate {
        let c = &self.constants;
        match kind {
            ServiceKind::Data => data::estimate(&c.data, input),
            ServiceKind::Index => index::estimate(&c.index, input),
            ServiceKind::Query => query::estimate(&c.query, input),
            ServiceKind::Search => search::estimate(&c.search, input),
            ServiceKind::Eventing => eventing::estimate(&c.eventing, input),
            ServiceKind::Analytics => analytics::estimate(&c.analytics, input),
        }
    }

    fn version(&self) -> ModelVersion {
        ModelVersion::Analytic
    }
}

/// Divide a group-wide value across `nodes`, yielding 0 for an empty group
pub fn per_node(value: f64, nodes: u64) -> f64 {
    if nodes == 0 {
        0.0
    } else {
        value / nodes as f64
    }
}

/// Round half away from zero to `precision` decimal places
pub(crate) fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Expiry operations per second implied by a document TTL
pub(crate) fn expiry_ops_per_sec(documents: u64, ttl_days: f64) -> f64 {
    if ttl_days > 0.0 {
        (documents as f64 / (ttl_days * SECONDS_PER_DAY)).round()
    } else {
        0.0
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_per_node_zero_nodes() {
        assert_eq!(per_node(120.0, 0), 0.0);
        assert_eq!(per_node(120.0, 4), 30.0);
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(0.415, 1), 0.4);
        assert_eq!(round_to(0.45, 1), 0.5);
        assert_eq!(round_to(1.25159, 3), 1.252);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_expiry_ops() {
        assert_eq!(expiry_ops_per_sec(1_000_000, 0.0), 0.0);
        // 864_000 docs expiring over one day is 10/sec
        assert_eq!(expiry_ops_per_sec(864_000, 1.0), 10.0);
    }

    #[test]
    fn test_model_for_selects_generation() {
        let analytic = model_for(ModelVersion::Analytic, ModelConstants::default());
        let linear = model_for(ModelVersion::Linear, ModelConstants::default());
        assert_eq!(analytic.version(), ModelVersion::Analytic);
        assert_eq!(linear.version(), ModelVersion::Linear);
    }

    #[test]
    fn test_every_kind_yields_finite_values() {
        let dataset = read_dataset();
        let workload = read_workload();
        let models = [
            model_for(ModelVersion::Analytic, ModelConstants::default()),
            model_for(ModelVersion::Linear, ModelConstants::default()),
        ];

        for model in &models {
            for nodes in [0, 1, 3] {
                let input = EstimatorInput {
                    dataset: &dataset,
                    workload: &workload,
                    nodes,
                };
                for kind in ServiceKind::ALL {
                    let e = model.estimate(kind, &input);
                    for value in [e.ram, e.cpu, e.disk, e.disk_io] {
                        assert!(
                            value.is_finite() && value >= 0.0,
                            "{} {} at {} nodes produced {}",
                            model.version(),
                            kind,
                            nodes,
                            value
                        );
                    }
                }
            }
        }
    }
}
