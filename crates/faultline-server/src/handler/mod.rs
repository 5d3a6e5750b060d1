//! Root request handler.
//!
//! - `root`: interpret -> (dependency) -> sleep -> compose
//! - `respond`: summary responses and the error-to-response boundary

pub mod respond;
pub mod root;

pub use respond::HttpError;
pub use root::root;
