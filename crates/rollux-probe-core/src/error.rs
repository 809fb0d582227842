//! Error types
//!
//! Failures below the check layer are kept distinct here for diagnostics and
//! collapsed to "absent" or `false` where the checks consume them.

use std::time::Duration;

/// Configuration-level failures surfaced to the caller
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid RPC URL: {0}")]
    InvalidEndpoint(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// JSON-RPC call failures
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("no result in response")]
    MissingResult,
}

/// TCP probe failures
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("DNS resolution failed for {host}: {reason}")]
    Dns { host: String, reason: String },
    #[error("connection refused")]
    Refused,
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("connect failed: {0}")]
    Io(#[from] std::io::Error),
}
