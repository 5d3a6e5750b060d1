//! Shared error type across faultline crates.

use thiserror::Error;

/// Status used when a failure has no better HTTP mapping.
const BAD_GATEWAY: u16 = 502;

/// Shared result type.
pub type Result<T> = std::result::Result<T, FaultlineError>;

/// Unified error type used by core and server.
///
/// Every variant produced while handling a request is converted into an HTTP
/// response by the server; none of them is allowed to end the process.
#[derive(Debug, Error)]
pub enum FaultlineError {
    /// The `dep` query value is not valid base64 (or not a UTF-8 path).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    /// The dependency could not be reached at the transport level.
    #[error("dependency transport failure calling {url}: {reason}")]
    DependencyTransport { url: String, reason: String },
    /// The dependency answered, but not with a 2xx status.
    #[error("not OK response")]
    DependencyStatus { status: u16 },
    /// Startup configuration problem.
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl FaultlineError {
    /// Map the error to the HTTP status sent to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            FaultlineError::InvalidEncoding(_) => 400,
            FaultlineError::DependencyTransport { .. } => BAD_GATEWAY,
            FaultlineError::DependencyStatus { status } => {
                if (400..=999).contains(status) {
                    *status
                } else {
                    BAD_GATEWAY
                }
            }
            FaultlineError::Config(_) | FaultlineError::Internal(_) => 500,
        }
    }

    /// True for failures caused by the caller's input rather than the chain.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FaultlineError::InvalidEncoding(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dependency_status_is_forwarded() {
        let err = FaultlineError::DependencyStatus { status: 503 };
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "not OK response");
    }

    #[test]
    fn non_error_dependency_status_becomes_bad_gateway() {
        // a 3xx the client did not follow must still fail the outer request
        let err = FaultlineError::DependencyStatus { status: 304 };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn transport_and_encoding_codes() {
        let t = FaultlineError::DependencyTransport {
            url: "http://x/".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(t.status_code(), 502);
        assert!(!t.is_client_error());

        let e = FaultlineError::InvalidEncoding("bad".into());
        assert_eq!(e.status_code(), 400);
        assert!(e.is_client_error());
    }
}
