//! faultline core: transport-agnostic request semantics and error types.
//!
//! This crate turns raw query parameters into an execution plan, resolves
//! caller identities, classifies dependency outcomes and composes the summary
//! line returned to callers. It carries no transport or runtime dependencies
//! so the semantics can be tested without a server.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `FaultlineError`/`Result` so a bad
//! request can never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod identity;
pub mod outcome;
pub mod plan;

/// Shared result type.
pub use error::{FaultlineError, Result};
pub use outcome::{DependencyOutcome, RequestResult};
pub use plan::{ExecutionPlan, RequestParameters};
