//! reqwest-backed dependency client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use faultline_core::error::{FaultlineError, Result};
use faultline_core::DependencyOutcome;

use super::{transport_error, DependencyClient};

/// Dependency client reusing one connection pool for every call.
#[derive(Debug, Clone)]
pub struct ReqwestDependencyClient {
    client: Client,
}

impl ReqwestDependencyClient {
    /// Build a client. `timeout` of `None` keeps reqwest's default (none).
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("faultline/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            tracing::debug!(timeout_ms = t.as_millis() as u64, "dependency client timeout set");
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| FaultlineError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DependencyClient for ReqwestDependencyClient {
    async fn get(&self, url: &str) -> Result<DependencyOutcome> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(DependencyOutcome::new(res.status().as_u16()))
    }
}
