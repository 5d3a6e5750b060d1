//! Dependency invoker.
//!
//! A request may name a path to call on the same host before answering. The
//! invoker issues exactly one GET through a [`DependencyClient`] and folds the
//! result into the request: transport failures and non-2xx statuses are
//! checked independently and both fail the outer request. No retries.

pub mod client;

use async_trait::async_trait;

use faultline_core::error::{FaultlineError, Result};
use faultline_core::DependencyOutcome;

pub use client::ReqwestDependencyClient;

/// HTTP client capability used for dependency calls.
#[async_trait]
pub trait DependencyClient: Send + Sync {
    /// Issue one GET to `url` and report the status received.
    ///
    /// Transport failures are returned as
    /// [`FaultlineError::DependencyTransport`]; a received status, whatever
    /// it is, is `Ok`.
    async fn get(&self, url: &str) -> Result<DependencyOutcome>;
}

/// Dependency URL for `path` on `host`. The path is appended verbatim.
pub fn dependency_url(host: &str, path: &str) -> String {
    format!("http://{host}{path}")
}

/// Call `path` on `host` once and require a 2xx answer.
pub async fn invoke(
    client: &dyn DependencyClient,
    host: &str,
    path: &str,
) -> Result<DependencyOutcome> {
    let url = dependency_url(host, path);

    let outcome = match client.get(&url).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(%url, error = %e, "dependency unreachable");
            return Err(e);
        }
    };

    outcome.ensure_success().map_err(|e| {
        tracing::warn!(%url, status = outcome.status, "dependency returned non-2xx");
        e
    })
}

/// Transport error helper shared by client implementations.
pub fn transport_error(url: &str, reason: impl ToString) -> FaultlineError {
    FaultlineError::DependencyTransport {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
