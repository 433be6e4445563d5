//! # deedkit core
//!
//! Pure primitives for building deed transactions: addressing, signing and
//! canonical envelopes.
//!
//! This crate contains no I/O and no networking.
//!
//! ## Key Types
//!
//! - [`Address`] - Namespaced state address derived from a resource name
//! - [`Identity`] - Ed25519 signing key, passed explicitly to every build
//! - [`EnvelopeBuilder`] - Produces signed [`Transaction`]s and [`Batch`]es
//! - [`BatchList`] - The wire body posted to the ledger
//!
//! ## Canonicalization
//!
//! Headers and wire bodies are deterministic CBOR. See [`canonical`].

pub mod address;
pub mod canonical;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod validation;

pub use address::{address_for, namespace_prefix, Address};
pub use crypto::{Identity, PublicKey, Sha512Hash, Signature};
pub use envelope::{
    Batch, BatchHeader, BatchId, BatchList, EnvelopeBuilder, Nonce, Transaction,
    TransactionHeader, FAMILY_NAME, FAMILY_VERSION,
};
pub use error::{CoreError, Result, ValidationError};
pub use payload::{Action, Payload};
pub use validation::{validate_batch, validate_transaction};
