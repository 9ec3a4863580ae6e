//! Health tracking for the sizing service
//!
//! Backs the liveness and readiness probes of the HTTP service.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Serving, with reduced fidelity
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        if components
            .values()
            .any(|health| health.status == ComponentStatus::Degraded)
        {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const ENGINE: &str = "engine";
    pub const CATALOG: &str = "catalog";
}

/// Shared registry of component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component as healthy
    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    /// Track whether the last estimate fit inside the catalog
    ///
    /// The catalog is degraded while groups need more than its largest
    /// instance, and healthy again after the next estimate that fits.
    pub async fn record_catalog_fit(&self, undersized_groups: usize) {
        let health = if undersized_groups == 0 {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded(format!(
                "{} group(s) exceed the largest instance",
                undersized_groups
            ))
        };
        self.update(components::CATALOG, health).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once the engine is built; a degraded catalog still serves
    pub async fn readiness(&self) -> ReadinessResponse {
        let ready = *self.ready.read().await;

        ReadinessResponse {
            ready,
            reason: (!ready).then(|| "Sizing engine not yet initialized".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_engine_and_catalog_registration() {
        let registry = HealthRegistry::new();
        registry.register(components::ENGINE).await;
        registry.register(components::CATALOG).await;

        let health = registry.health().await;
        assert_eq!(health.components.len(), 2);
        assert_eq!(
            health.components[components::CATALOG].status,
            ComponentStatus::Healthy
        );
    }

    #[tokio::test]
    async fn test_degraded_catalog_keeps_service_ready() {
        let registry = HealthRegistry::new();
        registry.register(components::ENGINE).await;
        registry.register(components::CATALOG).await;
        registry.set_ready(true).await;

        registry.record_catalog_fit(2).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[components::CATALOG].message.as_deref(),
            Some("2 group(s) exceed the largest instance")
        );
        assert_eq!(
            health.components[components::ENGINE].status,
            ComponentStatus::Healthy
        );
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_catalog_recovers_after_fitting_estimate() {
        let registry = HealthRegistry::new();
        registry.register(components::CATALOG).await;

        registry.record_catalog_fit(1).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);

        registry.record_catalog_fit(0).await;
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components[components::CATALOG].message.is_none());
    }

    #[test]
    fn test_readiness_not_ready_initially() {
        let registry = HealthRegistry::new();
        let readiness = tokio_test::block_on(registry.readiness());

        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_readiness_after_initialization() {
        let registry = HealthRegistry::new();
        registry.register(components::ENGINE).await;
        registry.set_ready(true).await;

        let readiness = registry.readiness().await;
        assert!(readiness.ready);
        assert!(readiness.reason.is_none());
    }
}
