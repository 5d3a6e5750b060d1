//! Request observability.
//!
//! `metrics` holds the process-wide registry rendered by `/metrics`; `chain`
//! is the middleware stack that feeds it for every root request.

pub mod chain;
pub mod metrics;

pub use chain::{instrument, ROOT_HANDLER};
pub use metrics::{BuildLabels, MetricsRecorder, ServiceMetrics, SharedRecorder};
