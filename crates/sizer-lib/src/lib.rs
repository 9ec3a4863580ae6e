//! Workload hardware sizing engine
//!
//! Turns a dataset and workload description into per-group hardware
//! requirements snapped to a catalog of purchasable instances:
//! - Workload-nature defaults
//! - Per-service estimators in pluggable generations
//! - Group aggregation and instance selection
//! - Health checks, metrics and structured estimation events

pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod estimators;
pub mod health;
pub mod models;
pub mod observability;
pub mod observer;
pub mod summary;

pub use catalog::{Instance, InstanceCatalog, Selection};
pub use config::{EngineConfig, ModelVersion};
pub use defaults::{DefaultsResolver, NaturePresets};
pub use engine::{SizingEngine, SizingEngineBuilder};
pub use error::{Result, SizerError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{MetricsObserver, SizerMetrics};
pub use observer::{EstimationEvent, EstimationObserver, NoopObserver, TracingObserver};
