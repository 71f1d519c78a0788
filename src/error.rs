//! Error types.
//!
//! Configuration errors are fatal at startup. Fetch and extraction errors
//! never leave a probe: they are folded into a `ProbeFailure` at the
//! work-item boundary.

use crate::models::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// Problems loading or validating the monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the HTTP fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

impl FetchError {
    /// The failure class a probe records for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Connect(_) | FetchError::Request(_) => FailureKind::Network,
            FetchError::Status(_) => FailureKind::HttpStatus,
        }
    }
}

/// Errors raised by the HTML extraction collaborator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid CSS selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

/// Errors that prevent a cycle from being built at all.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("no targets configured")]
    NoTargets,

    #[error("blank {0} in configuration")]
    Blank(&'static str),

    #[error("duplicate {kind} `{value}` in configuration")]
    Duplicate { kind: &'static str, value: String },

    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::Timeout(5).kind(), FailureKind::Timeout);
        assert_eq!(
            FetchError::Connect("refused".to_string()).kind(),
            FailureKind::Network
        );
        assert_eq!(
            FetchError::Request("reset".to_string()).kind(),
            FailureKind::Network
        );
        assert_eq!(FetchError::Status(503).kind(), FailureKind::HttpStatus);
    }

    #[test]
    fn test_error_messages() {
        let err = CycleError::Duplicate {
            kind: "target",
            value: "example.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate target `example.com` in configuration"
        );
        assert_eq!(
            FetchError::Status(404).to_string(),
            "unexpected HTTP status 404"
        );
    }
}
