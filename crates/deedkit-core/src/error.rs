//! Error types for deedkit core.

use thiserror::Error;

/// Errors raised while building, encoding or decoding envelopes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed private key: {0}")]
    KeyFormat(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("payload hash mismatch: expected {expected}, got {actual}")]
    PayloadHashMismatch { expected: String, actual: String },

    #[error("a batch must contain at least one transaction")]
    EmptyBatch,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Validation errors for signed transactions and batches.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("transaction signature verification failed")]
    SignatureFailed,

    #[error("batch signature verification failed")]
    BatchSignatureFailed,

    #[error("payload hash does not match header")]
    PayloadHashMismatch,

    #[error("transaction id mismatch at index {index}: header lists {expected}, batch holds {got}")]
    TransactionIdMismatch {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::SignatureFailed
            }
            CoreError::PayloadHashMismatch { .. } => ValidationError::PayloadHashMismatch,
            other => ValidationError::StructuralError(other.to_string()),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
