//! Shared application state for the faultline server.
//!
//! Holds the config, the process-wide metrics registry and the dependency
//! client. Cloned into every request; all fields sit behind one `Arc`.

use std::sync::Arc;

use faultline_core::error::Result;

use crate::config::ServiceConfig;
use crate::dependency::{DependencyClient, ReqwestDependencyClient};
use crate::obs::{BuildLabels, ServiceMetrics, SharedRecorder};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    metrics: Arc<ServiceMetrics>,
    client: Arc<dyn DependencyClient>,
}

impl AppState {
    /// Build state with the reqwest dependency client.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let client = ReqwestDependencyClient::new(cfg.dependency.timeout())?;
        Ok(Self::with_client(cfg, Arc::new(client)))
    }

    /// Build state around an arbitrary dependency client.
    pub fn with_client(cfg: ServiceConfig, client: Arc<dyn DependencyClient>) -> Self {
        let metrics = Arc::new(ServiceMetrics::new(&BuildLabels {
            version: cfg.build.version.clone(),
            branch: cfg.build.branch.clone(),
            rustversion: crate::RUST_VERSION.to_string(),
        }));

        Self {
            inner: Arc::new(AppStateInner { cfg, metrics, client }),
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Write-only view of the registry for the instrumentation chain.
    pub fn recorder(&self) -> SharedRecorder {
        self.metrics()
    }

    pub fn dependency_client(&self) -> Arc<dyn DependencyClient> {
        Arc::clone(&self.inner.client)
    }

    pub fn self_authority(&self) -> String {
        self.inner.cfg.self_authority()
    }
}
