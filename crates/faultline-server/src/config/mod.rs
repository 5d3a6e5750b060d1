//! Service config loader.
//!
//! `PORT` is mandatory and always comes from the environment. Everything else
//! has defaults and may be overridden by a strict YAML file named by
//! `FAULTLINE_CONFIG`; `VERSION` and `BRANCH` override the build labels.

pub mod schema;

use std::fs;

use faultline_core::error::{FaultlineError, Result};

pub use schema::{BuildSection, DependencySection, ServerSection, ServiceConfig};

pub const PORT_VAR: &str = "PORT";
pub const CONFIG_PATH_VAR: &str = "FAULTLINE_CONFIG";
pub const VERSION_VAR: &str = "VERSION";
pub const BRANCH_VAR: &str = "BRANCH";

pub fn load_from_env() -> Result<ServiceConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using `lookup` as the environment.
pub fn load_with<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup(CONFIG_PATH_VAR) {
        Some(path) if !path.is_empty() => load_from_file(&path)?,
        _ => ServiceConfig::default(),
    };

    let port = lookup(PORT_VAR)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| FaultlineError::Config(format!("{PORT_VAR} is not set")))?;
    cfg.server.port = port
        .trim()
        .parse()
        .map_err(|e| FaultlineError::Config(format!("{PORT_VAR}={port:?}: {e}")))?;

    if let Some(v) = lookup(VERSION_VAR) {
        cfg.build.version = v;
    }
    if let Some(b) = lookup(BRANCH_VAR) {
        cfg.build.branch = b;
    }

    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| FaultlineError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

/// Parse a config file body. The port is not part of the file.
pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| FaultlineError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate_sections()?;
    Ok(cfg)
}
