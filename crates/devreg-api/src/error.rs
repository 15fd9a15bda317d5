use devreg_core::{CoreError, ServiceError};
use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for the `devreg-api` crate.
///
/// Only failures to obtain an outcome end up here. A registry answering
/// with an error status is not an `Error`: that status is returned as the
/// `OperationResult` status.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be used as a registry base: {0}")]
    InvalidBaseUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Response body could not be decoded, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Credentials could not be encoded for the request body.
    #[error("Invalid credentials payload: {0}")]
    Payload(#[source] CoreError),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<Error> for ServiceError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let service_error = match &err {
            Error::Timeout { .. } => ServiceError::gateway_timeout(message),
            Error::Transport(e) if e.is_timeout() => ServiceError::gateway_timeout(message),
            Error::Transport(e) if e.is_connect() => ServiceError::unavailable(message),
            Error::Transport(_) | Error::Deserialization { .. } => {
                ServiceError::bad_gateway(message)
            }
            Error::InvalidBaseUrl(_) | Error::Tls(_) | Error::Payload(_) => {
                ServiceError::internal(message)
            }
        };
        service_error.with_cause(err)
    }
}

impl From<Error> for CoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Payload(core) => core,
            other => CoreError::Service(other.into()),
        }
    }
}
