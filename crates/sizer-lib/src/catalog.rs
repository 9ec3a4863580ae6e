//! Hardware SKU catalog and instance selection

use crate::error::{Result, SizerError};
use serde::{Deserialize, Serialize};

/// A purchasable hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    pub vcpu: u64,
    /// RAM in GB
    pub ram: u64,
}

impl Instance {
    pub const fn new(vcpu: u64, ram: u64) -> Self {
        Self { vcpu, ram }
    }

    /// Whether this instance covers a (vCPU, RAM) requirement
    pub fn satisfies(&self, cpu: f64, ram: f64) -> bool {
        self.vcpu as f64 >= cpu && self.ram as f64 >= ram
    }
}

/// Built-in catalog, ascending by vCPU
pub const DEFAULT_INSTANCES: [Instance; 20] = [
    Instance::new(4, 16),
    Instance::new(4, 32),
    Instance::new(8, 16),
    Instance::new(8, 32),
    Instance::new(8, 64),
    Instance::new(16, 32),
    Instance::new(16, 64),
    Instance::new(16, 128),
    Instance::new(32, 128),
    Instance::new(32, 256),
    Instance::new(36, 72),
    Instance::new(48, 96),
    Instance::new(48, 192),
    Instance::new(48, 384),
    Instance::new(64, 256),
    Instance::new(64, 512),
    Instance::new(72, 144),
    Instance::new(96, 192),
    Instance::new(96, 384),
    Instance::new(96, 768),
];

/// Outcome of a catalog lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub instance: Instance,
    /// False when nothing fit and the largest instance was returned instead
    pub satisfies: bool,
}

/// Immutable, non-empty list of instances ordered by vCPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstanceCatalog {
    instances: Vec<Instance>,
}

impl InstanceCatalog {
    /// Build a catalog, rejecting empty or out-of-order lists
    pub fn new(instances: Vec<Instance>) -> Result<Self> {
        if instances.is_empty() {
            return Err(SizerError::EmptyCatalog);
        }
        for (index, pair) in instances.windows(2).enumerate() {
            if pair[1].vcpu < pair[0].vcpu {
                return Err(SizerError::UnorderedCatalog {
                    index: index + 1,
                    previous: pair[0].vcpu,
                    current: pair[1].vcpu,
                });
            }
        }
        Ok(Self { instances })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The last entry, which is the fallback when nothing fits
    pub fn largest(&self) -> Instance {
        // Non-empty by construction
        self.instances[self.instances.len() - 1]
    }

    /// First instance covering both `cpu` and `ram`, else the largest one
    pub fn select(&self, cpu: f64, ram: f64) -> Selection {
        match self.instances.iter().find(|i| i.satisfies(cpu, ram)) {
            Some(instance) => Selection {
                instance: *instance,
                satisfies: true,
            },
            None => Selection {
                instance: self.largest(),
                satisfies: false,
            },
        }
    }
}

impl Default for InstanceCatalog {
    fn default() -> Self {
        Self {
            instances: DEFAULT_INSTANCES.to_vec(),
        }
    }
}

impl<'de> Deserialize<'de> for InstanceCatalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let instances = Vec::<Instance>::deserialize(deserializer)?;
        InstanceCatalog::new(instances).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = InstanceCatalog::default();
        assert_eq!(
            InstanceCatalog::new(DEFAULT_INSTANCES.to_vec()).unwrap(),
            catalog
        );
        assert_eq!(catalog.instances().len(), 20);
        assert_eq!(catalog.largest(), Instance::new(96, 768));
    }

    #[test]
    fn test_first_fit_selection() {
        let catalog = InstanceCatalog::default();

        let selection = catalog.select(4.0, 1.25);
        assert_eq!(selection.instance, Instance::new(4, 16));
        assert!(selection.satisfies);

        // RAM is the binding constraint, CPU is over-provisioned
        assert_eq!(catalog.select(1.0, 100.0).instance, Instance::new(16, 128));

        // Fractional requirements round up to the next SKU
        assert_eq!(catalog.select(8.5, 20.0).instance, Instance::new(16, 32));

        // 36 vCPU fits a larger-RAM 32 vCPU entry only on RAM, so 36/72 wins
        assert_eq!(catalog.select(33.0, 64.0).instance, Instance::new(36, 72));
    }

    #[test]
    fn test_exhausted_catalog_returns_largest() {
        let catalog = InstanceCatalog::default();

        let selection = catalog.select(120.0, 1.25);
        assert_eq!(selection.instance, Instance::new(96, 768));
        assert!(!selection.satisfies);

        let selection = catalog.select(4.0, 1024.0);
        assert_eq!(selection.instance, Instance::new(96, 768));
        assert!(!selection.satisfies);
    }

    #[test]
    fn test_selection_meets_requirement_whenever_possible() {
        let catalog = InstanceCatalog::default();
        for cpu in [0.0, 1.0, 3.5, 16.0, 40.0, 95.0, 96.0, 97.0] {
            for ram in [0.0, 8.0, 64.0, 200.0, 700.0, 800.0] {
                let selection = catalog.select(cpu, ram);
                let exists = catalog.instances().iter().any(|i| i.satisfies(cpu, ram));
                assert_eq!(selection.satisfies, exists);
                if exists {
                    assert!(selection.instance.satisfies(cpu, ram));
                } else {
                    assert_eq!(selection.instance, catalog.largest());
                }
            }
        }
    }

    #[test]
    fn test_invalid_catalogs_rejected() {
        assert!(matches!(
            InstanceCatalog::new(vec![]),
            Err(SizerError::EmptyCatalog)
        ));
        assert!(matches!(
            InstanceCatalog::new(vec![Instance::new(8, 16), Instance::new(4, 16)]),
            Err(SizerError::UnorderedCatalog { index: 1, .. })
        ));
    }

    #[test]
    fn test_synthetic_catalog_from_json() {
        let catalog: InstanceCatalog =
            serde_json::from_str(r#"[{"vcpu": 2, "ram": 4}, {"vcpu": 4, "ram": 8}]"#).unwrap();
        assert_eq!(catalog.select(3.0, 2.0).instance, Instance::new(4, 8));
        assert!(serde_json::from_str::<InstanceCatalog>("[]").is_err());
    }
}
