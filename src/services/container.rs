use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend, StorageConfig};
use crate::flows::{FlowContext, Navigator};
use crate::metrics::GatewayMetrics;
use crate::services::{
    AuthGateway, CredentialStore, FileStorage, GatewayError, HttpAuthGateway, KeyValueStorage, MemoryStorage,
};

/// Errors raised while wiring services
#[derive(Debug, thiserror::Error)]
pub enum ServiceInitError {
    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Failed to create gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage misconfigured: {0}")]
    Storage(String),
}

/// Service container for dependency injection
///
/// Holds the credential store, the backend gateway and the metrics registry
/// shared by every screen controller.
#[derive(Clone)]
pub struct ServiceContainer {
    store: CredentialStore,
    gateway: Arc<dyn AuthGateway>,
    metrics: GatewayMetrics,
}

impl ServiceContainer {
    /// Build every service from configuration
    pub fn new(config: &AppConfig) -> Result<Self, ServiceInitError> {
        let metrics = GatewayMetrics::new()?;
        let storage = build_storage(&config.storage)?;
        let gateway = HttpAuthGateway::new(&config.api, Some(metrics.clone()))?;

        Ok(Self {
            store: CredentialStore::new(storage),
            gateway: Arc::new(gateway),
            metrics,
        })
    }

    pub fn store(&self) -> CredentialStore {
        self.store.clone()
    }

    pub fn gateway(&self) -> Arc<dyn AuthGateway> {
        self.gateway.clone()
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Controller context that navigates through `navigator`
    pub fn flow_context(&self, navigator: Arc<dyn Navigator>) -> FlowContext {
        FlowContext::new(self.gateway(), self.store(), navigator)
    }
}

/// Application state: configuration plus the wired services
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceContainer,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ServiceInitError> {
        let services = ServiceContainer::new(&config)?;
        Ok(Self { services, config })
    }

    pub fn flow_context(&self, navigator: Arc<dyn Navigator>) -> FlowContext {
        self.services.flow_context(navigator)
    }
}

fn build_storage(config: &StorageConfig) -> Result<Arc<dyn KeyValueStorage>, ServiceInitError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => {
            let path = config
                .path
                .clone()
                .ok_or_else(|| ServiceInitError::Storage("file backend needs a path".to_string()))?;
            Ok(Arc::new(FileStorage::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::RecordingNavigator;
    use crate::models::{Session, UserInfo};

    fn session() -> Session {
        Session {
            access_token: "T1".to_string(),
            refresh_token: "R1".to_string(),
            token_type: "bearer".to_string(),
            user: UserInfo {
                user_id: 1,
                email: "a@b.com".to_string(),
                user_role: "citizen".to_string(),
                picture: None,
                name: None,
            },
        }
    }

    #[test]
    fn test_default_config_uses_memory_store() {
        let container = ServiceContainer::new(&AppConfig::default()).unwrap();
        container.store().save(&session()).unwrap();
        assert!(container.store().load().unwrap().is_some());
    }

    #[test]
    fn test_file_backend_shares_state_between_containers() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage = StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("state.json")),
        };

        ServiceContainer::new(&config).unwrap().store().save(&session()).unwrap();

        let reopened = ServiceContainer::new(&config).unwrap();
        assert_eq!(reopened.store().load().unwrap(), Some(session()));
    }

    #[test]
    fn test_file_backend_without_path_is_rejected() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::File;

        assert!(matches!(
            ServiceContainer::new(&config),
            Err(ServiceInitError::Storage(_))
        ));
    }

    #[test]
    fn test_flow_context_shares_store() {
        let state = AppState::new(AppConfig::default()).unwrap();
        let ctx = state.flow_context(Arc::new(RecordingNavigator::new()));
        ctx.store.save(&session()).unwrap();

        assert!(state.services.store().load().unwrap().is_some());
    }
}
