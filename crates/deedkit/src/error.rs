//! Error types for the deed client.

use std::path::PathBuf;

use deedkit_core::{CoreError, ValidationError};
use deedkit_gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A write was attempted without a signing identity.
    #[error("no signing key configured; pass --key-file or set key_file")]
    SigningUnavailable,

    /// The key file could not be read.
    #[error("failed to read key file {path}: {source}")]
    KeyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No deed with this name exists in state.
    #[error("no deed named {0:?}")]
    ResourceNotFound(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
