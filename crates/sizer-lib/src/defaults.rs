//! Workload-nature presets
//!
//! A preset replaces the whole topology, dataset shape, and workload of a
//! request. Only the document count and average document size survive from
//! the caller, since no preset can know them.

use crate::models::{ComputeRequest, Dataset, ServiceGroup, ServiceKind, Workload, WorkloadNature};
use crate::observer::{EstimationEvent, EstimationObserver};
use serde::{Deserialize, Serialize};

/// One nature's default bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub service_groups: Vec<ServiceGroup>,
    /// Document count and size are ignored when applied
    pub dataset: Dataset,
    pub workload: Workload,
}

impl Preset {
    fn apply(&self, request: &mut ComputeRequest) {
        let Dataset {
            no_of_documents,
            average_document_size,
            ..
        } = request.dataset;

        request.service_groups = self.service_groups.clone();
        request.dataset = Dataset {
            no_of_documents,
            average_document_size,
            ..self.dataset.clone()
        };
        request.workload = self.workload.clone();
    }
}

/// Preset bundles for the read, write and readwrite natures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturePresets {
    pub read: Preset,
    pub write: Preset,
    pub readwrite: Preset,
}

impl NaturePresets {
    /// The bundle for `nature`, or `None` for override
    pub fn get(&self, nature: WorkloadNature) -> Option<&Preset> {
        match nature {
            WorkloadNature::Read => Some(&self.read),
            WorkloadNature::Write => Some(&self.write),
            WorkloadNature::ReadWrite => Some(&self.readwrite),
            WorkloadNature::Override => None,
        }
    }
}

impl Default for NaturePresets {
    fn default() -> Self {
        use ServiceKind::*;

        Self {
            read: Preset {
                service_groups: vec![
                    ServiceGroup::new(&[Data, Index, Query], 3, "gp3"),
                    ServiceGroup::new(&[Search], 2, "gp3"),
                ],
                dataset: Dataset {
                    resident_ratio: 70,
                    percent_indexes_of_dataset: 15,
                    percent_full_text_search_of_dataset: 15,
                    ..Dataset::default()
                },
                workload: Workload {
                    read_per_sec: 5000,
                    writes_per_sec: 100,
                    deletes_per_sec: 50,
                    sql_queries_per_sec: 2000,
                },
            },
            write: Preset {
                service_groups: vec![
                    ServiceGroup::new(&[Data], 3, "gp3"),
                    ServiceGroup::new(&[Eventing], 2, "gp3"),
                ],
                dataset: Dataset {
                    resident_ratio: 80,
                    ..Dataset::default()
                },
                workload: Workload {
                    read_per_sec: 500,
                    writes_per_sec: 5000,
                    deletes_per_sec: 1000,
                    sql_queries_per_sec: 500,
                },
            },
            readwrite: Preset {
                service_groups: vec![
                    ServiceGroup::new(&[Data, Index, Query], 3, "gp3"),
                    ServiceGroup::new(&[Search, Eventing], 2, "gp3"),
                ],
                dataset: Dataset {
                    resident_ratio: 60,
                    percent_indexes_of_dataset: 40,
                    ..Dataset::default()
                },
                workload: Workload {
                    read_per_sec: 2000,
                    writes_per_sec: 2000,
                    deletes_per_sec: 500,
                    sql_queries_per_sec: 1500,
                },
            },
        }
    }
}

/// Applies a nature preset to a private copy of the request
#[derive(Debug, Clone, Default)]
pub struct DefaultsResolver {
    presets: NaturePresets,
}

impl DefaultsResolver {
    pub fn new(presets: NaturePresets) -> Self {
        Self { presets }
    }

    pub fn presets(&self) -> &NaturePresets {
        &self.presets
    }

    /// Resolve the request's defaults
    ///
    /// The caller's request is never touched. Unknown natures pass the
    /// request through unchanged.
    pub fn resolve(
        &self,
        request: &ComputeRequest,
        observer: &dyn EstimationObserver,
    ) -> ComputeRequest {
        let mut resolved = request.clone();

        match request.workload_nature.parse::<WorkloadNature>() {
            Ok(nature) => {
                if let Some(preset) = self.presets.get(nature) {
                    preset.apply(&mut resolved);
                }
                observer.on_event(&EstimationEvent::DefaultsApplied {
                    nature: nature.as_str(),
                    request: &resolved,
                });
            }
            Err(_) => observer.on_event(&EstimationEvent::UnrecognizedNature {
                nature: &request.workload_nature,
            }),
        }

        resolved
    }
}
