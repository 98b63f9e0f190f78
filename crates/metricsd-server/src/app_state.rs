//! Shared application state for metricsd.
//!
//! Owns the metrics service and the config it was started with. Collectors
//! listed under `collect:` are declared here through the same path remote
//! callers use, so startup fails on exactly the errors a Declare call would.

use std::sync::Arc;

use metricsd_core::error::Result;

use crate::config::ServerConfig;
use crate::exposition::{Exposition, PrometheusExposition};
use crate::service::MetricsService;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    service: Arc<MetricsService>,
}

struct AppStateInner {
    cfg: ServerConfig,
}

impl AppState {
    /// Build application state with a fresh Prometheus registry.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_exposition(cfg, Arc::new(PrometheusExposition::new()))
    }

    pub fn with_exposition(cfg: ServerConfig, exposition: Arc<dyn Exposition>) -> Result<Self> {
        let service = MetricsService::new(exposition);

        for desc in cfg.descriptors() {
            if let Err(e) = service.declare(&desc) {
                tracing::error!(
                    collector = %desc.name,
                    code = e.client_code().as_str(),
                    "startup declaration failed: {e}"
                );
                return Err(e);
            }
        }
        if !cfg.collect.is_empty() {
            tracing::info!(count = cfg.collect.len(), "startup collectors declared");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            service: Arc::new(service),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn service(&self) -> Arc<MetricsService> {
        Arc::clone(&self.service)
    }
}
