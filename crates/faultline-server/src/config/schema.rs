use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use faultline_core::error::{FaultlineError, Result};

const MAX_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub dependency: DependencySection,

    #[serde(default)]
    pub build: BuildSection,
}

impl ServiceConfig {
    /// Validate everything, including the port taken from the environment.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(FaultlineError::Config("PORT must be between 1 and 65535".into()));
        }
        self.validate_sections()
    }

    /// Validate the parts that can come from a config file.
    pub fn validate_sections(&self) -> Result<()> {
        self.server.validate()?;
        self.dependency.validate()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|e| FaultlineError::Config(format!("server.bind: {e}")))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Authority used for dependency calls when a request carries no Host.
    pub fn self_authority(&self) -> String {
        format!("127.0.0.1:{}", self.server.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Always taken from `PORT`.
    #[serde(skip)]
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,

    /// 0 disables the request timeout.
    #[serde(default)]
    pub request_timeout_ms: u64,

    /// 0 disables the global concurrency limit.
    #[serde(default)]
    pub max_in_flight: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: 0,
            bind: default_bind(),
            request_timeout_ms: 0,
            max_in_flight: 0,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.bind.parse::<IpAddr>().is_err() {
            return Err(FaultlineError::Config(format!(
                "server.bind must be an IP address, got {:?}",
                self.bind
            )));
        }
        if self.request_timeout_ms > MAX_TIMEOUT_MS {
            return Err(FaultlineError::Config(
                "server.request_timeout_ms must be at most 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_in_flight > 0).then_some(self.max_in_flight)
    }
}

fn default_bind() -> String {
    "0.0.0.0".into()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySection {
    /// 0 keeps the HTTP client default.
    #[serde(default)]
    pub timeout_ms: u64,
}

impl DependencySection {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(FaultlineError::Config(
                "dependency.timeout_ms must be at most 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub branch: String,
}
