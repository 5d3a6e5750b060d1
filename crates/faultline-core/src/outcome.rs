//! Dependency outcomes and the per-request result summary.

use std::fmt;
use std::time::Duration;

use crate::error::{FaultlineError, Result};
use crate::plan::ExecutionPlan;

/// Status returned by one dependency call. Consumed once, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyOutcome {
    pub status: u16,
}

impl DependencyOutcome {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`FaultlineError::DependencyStatus`] unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FaultlineError::DependencyStatus {
                status: self.status,
            })
        }
    }
}

/// What one request did; rendered as the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    pub name: String,
    pub elapsed: Duration,
    pub sleep_millis: u64,
    pub dependency_path: String,
    pub final_status: u16,
}

impl RequestResult {
    pub fn from_plan(plan: &ExecutionPlan, elapsed: Duration) -> Self {
        Self {
            name: plan.name.clone(),
            elapsed,
            sleep_millis: plan.slept_millis(),
            dependency_path: plan.dependency_path.clone(),
            final_status: plan.status_code.unwrap_or(200),
        }
    }

    /// Single-line human readable summary, newline terminated.
    pub fn summary(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for RequestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Elapsed: {:.3} ms, Slept: {} ms, with dep: {}",
            self.name,
            self.elapsed.as_secs_f64() * 1000.0,
            self.sleep_millis,
            self.dependency_path
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_is_success() {
        assert!(DependencyOutcome::new(204).ensure_success().is_ok());
        let err = DependencyOutcome::new(500).ensure_success().unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(DependencyOutcome::new(301).ensure_success().is_err());
    }

    #[test]
    fn summary_line() {
        let plan = ExecutionPlan {
            name: "alice".into(),
            dependency_path: "/?sleep=5".into(),
            sleep_millis: Some(100),
            status_code: Some(404),
        };
        let result = RequestResult::from_plan(&plan, Duration::from_micros(101_250));
        assert_eq!(result.final_status, 404);
        assert_eq!(
            result.summary(),
            "Name: alice, Elapsed: 101.250 ms, Slept: 100 ms, with dep: /?sleep=5\n"
        );
    }
}
