//! faultline server library entry.
//!
//! This crate wires configuration, the metrics registry, the instrumentation
//! chain, the dependency invoker and the root handler into an axum app. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dependency;
pub mod handler;
pub mod obs;
pub mod ops;
pub mod router;

/// `rustc` version the binary was built with (build-info label).
pub const RUST_VERSION: &str = env!("FAULTLINE_RUSTC_VERSION");
