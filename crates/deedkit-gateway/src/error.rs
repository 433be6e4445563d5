//! Error types for the gateway.

use thiserror::Error;

/// Errors raised while talking to the ledger REST surface.
///
/// Nothing here is retried by the gateway; retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The ledger answered 404 for a named resource (or URL).
    #[error("no such resource: {resource}")]
    NotFound { resource: String },

    /// Any other non-success HTTP status.
    #[error("ledger request to {url} failed: {status} {reason}")]
    Request {
        url: String,
        status: u16,
        reason: String,
    },

    /// The ledger could not be reached.
    #[error("failed to connect to ledger at {url}: {message}")]
    Connectivity { url: String, message: String },

    /// The configured base URL is unusable.
    #[error("invalid ledger url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Anything else the transport or response handling threw.
    #[error("ledger error: {0}")]
    Ledger(String),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
