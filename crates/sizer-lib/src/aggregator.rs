//! Group-level aggregation of per-service requirements
//!
//! RAM and CPU are shared by co-located services, so the group needs the
//! largest scaled demand. Disk capacity and IOPS are consumed by every
//! service, so they add up before being clamped to device limits.

use crate::config::AggregationConfig;
use crate::estimators::per_node;
use crate::models::ServiceEstimate;

#[derive(Debug, Clone, Default)]
pub struct GroupAggregator {
    config: AggregationConfig,
}

impl GroupAggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Combine one group's per-service estimates
    ///
    /// A group with no nodes yields all zeros instead of dividing by zero.
    pub fn aggregate(
        &self,
        estimates: &[ServiceEstimate],
        nodes: u64,
        disk_type: &str,
    ) -> ServiceEstimate {
        if nodes == 0 {
            return ServiceEstimate::ZERO;
        }

        let services = estimates.len() as f64;
        let ram_divisor = nodes as f64 * self.config.ram_headroom;

        let ram = estimates
            .iter()
            .map(|e| e.ram * services / ram_divisor)
            .fold(0.0, f64::max);
        let cpu = estimates
            .iter()
            .map(|e| per_node(e.cpu * services, nodes))
            .fold(0.0, f64::max);

        let disk_sum: f64 = estimates.iter().map(|e| e.disk).sum();
        let io_sum: f64 = estimates.iter().map(|e| e.disk_io).sum();

        ServiceEstimate::new(
            ram,
            cpu,
            self.clamp_disk(per_node(disk_sum, nodes).ceil()),
            self.clamp_iops(per_node(io_sum, nodes), disk_type),
        )
    }

    fn clamp_disk(&self, gb: f64) -> f64 {
        gb.max(self.config.disk_floor_gb)
            .min(self.config.disk_ceiling_gb)
    }

    /// Ceiling by disk type first, then the universal floor
    fn clamp_iops(&self, iops: f64, disk_type: &str) -> f64 {
        let capped = match self.config.iops_ceilings.get(disk_type) {
            Some(ceiling) => iops.min(*ceiling),
            None => iops,
        };
        capped.max(self.config.iops_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> GroupAggregator {
        GroupAggregator::default()
    }

    #[test]
    fn test_ram_and_cpu_take_the_max_not_the_sum() {
        let estimates = [
            ServiceEstimate::new(1.0, 4.0, 4.0, 300.0),
            ServiceEstimate::new(1.0, 1.0, 1.0, 0.0),
            ServiceEstimate::new(0.0, 120.0, 0.0, 0.0),
        ];
        let result = aggregator().aggregate(&estimates, 3, "gp3");

        // 1 GB * 3 services / (3 nodes * 0.8)
        assert!((result.ram - 1.25).abs() < 1e-9);
        // 120 cores * 3 services / 3 nodes
        assert_eq!(result.cpu, 120.0);
    }

    #[test]
    fn test_disk_and_iops_are_summed_then_clamped() {
        let estimates = [
            ServiceEstimate::new(0.0, 0.0, 400.0, 20_000.0),
            ServiceEstimate::new(0.0, 0.0, 200.0, 10_000.0),
        ];
        let result = aggregator().aggregate(&estimates, 4, "io2");
        assert_eq!(result.disk, 150.0);
        assert_eq!(result.disk_io, 7_500.0);

        let small = aggregator().aggregate(&[ServiceEstimate::new(0.0, 0.0, 5.0, 100.0)], 3, "gp3");
        assert_eq!(small.disk, 50.0);
        assert_eq!(small.disk_io, 3_000.0);
    }

    #[test]
    fn test_disk_rounds_up_before_clamping() {
        let estimates = [ServiceEstimate::new(0.0, 0.0, 301.0, 0.0)];
        assert_eq!(aggregator().aggregate(&estimates, 2, "gp3").disk, 151.0);
    }

    #[test]
    fn test_bounds_hold_for_extreme_inputs() {
        for (disk_type, ceiling) in [("gp3", 16_000.0), ("io2", 64_000.0)] {
            for value in [0.0, 1.0, 1e3, 1e6, 1e9] {
                for nodes in [1, 3, 100] {
                    let estimate = ServiceEstimate::new(value, value, value, value);
                    let result = aggregator().aggregate(&[estimate, estimate], nodes, disk_type);
                    assert!((50.0..=16_000.0).contains(&result.disk));
                    assert!((3_000.0..=ceiling).contains(&result.disk_io));
                }
            }
        }
    }

    #[test]
    fn test_unknown_disk_type_skips_ceiling_but_keeps_floor() {
        let high = [ServiceEstimate::new(0.0, 0.0, 0.0, 1e6)];
        assert_eq!(aggregator().aggregate(&high, 1, "st1").disk_io, 1e6);

        let low = [ServiceEstimate::new(0.0, 0.0, 0.0, 10.0)];
        assert_eq!(aggregator().aggregate(&low, 1, "st1").disk_io, 3_000.0);
    }

    #[test]
    fn test_zero_nodes_is_all_zero() {
        let estimates = [ServiceEstimate::new(8.0, 8.0, 800.0, 8_000.0)];
        assert_eq!(
            aggregator().aggregate(&estimates, 0, "gp3"),
            ServiceEstimate::ZERO
        );
    }

    #[test]
    fn test_empty_group_gets_floors() {
        let result = aggregator().aggregate(&[], 2, "gp3");
        assert_eq!(result.ram, 0.0);
        assert_eq!(result.cpu, 0.0);
        assert_eq!(result.disk, 50.0);
        assert_eq!(result.disk_io, 3_000.0);
    }
}
