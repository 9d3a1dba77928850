//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::services::{AnalyticsService, ProfileProvisioner, SlugService};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; hands out per-request service values built
/// over the shared document store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BackendConfig,
    store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: BackendConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Access the configuration.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Access the shared document store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.store)
    }

    /// Profile provisioning service.
    #[must_use]
    pub fn provisioner(&self) -> ProfileProvisioner {
        let collections = &self.inner.config.collections;
        ProfileProvisioner::new(
            self.store(),
            collections.profiles.as_str(),
            collections.preferences.as_str(),
            self.inner.config.default_locale.as_str(),
        )
    }

    /// Slug validation service.
    #[must_use]
    pub fn slugs(&self) -> SlugService {
        SlugService::new(self.store(), self.inner.config.collections.storefronts.as_str())
    }

    /// Analytics aggregation service.
    #[must_use]
    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.store(), self.inner.config.collections.analytics.as_str())
    }
}
