//! Transactions, batches and the builder that signs them.
//!
//! A transaction is immutable once built: its header is serialized exactly
//! once, those bytes are signed, and the same bytes are what goes on the
//! wire. The types expose read accessors only.

use bytes::Bytes;
use std::fmt;

use crate::address::{address_for, Address};
use crate::canonical::{
    batch_header_bytes, batch_list_bytes, decode_batch_header, decode_batch_list,
    decode_transaction_header, transaction_header_bytes,
};
use crate::crypto::{Identity, PublicKey, Sha512Hash, Signature};
use crate::error::{CoreError, Result};
use crate::payload::Payload;

/// Transaction family name.
pub const FAMILY_NAME: &str = "deed";

/// Transaction family version.
pub const FAMILY_VERSION: &str = "1.0";

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 16;

/// Per-transaction uniqueness value.
///
/// Drawn from the OS-seeded thread RNG, so two transactions with the same
/// signer and payload still get distinct header bytes and signatures.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    /// Draw a fresh random nonce.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::MalformedEnvelope(format!("nonce: {}", e)))?;
        let arr: [u8; NONCE_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::MalformedEnvelope("bad nonce length".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHeader {
    pub signer_public_key: PublicKey,
    pub batcher_public_key: PublicKey,
    pub family_name: String,
    pub family_version: String,
    pub inputs: Vec<Address>,
    pub outputs: Vec<Address>,
    pub dependencies: Vec<String>,
    /// Hex SHA-512 of the payload bytes.
    pub payload_sha512: String,
    pub nonce: Nonce,
}

impl TransactionHeader {
    /// Canonical bytes of this header.
    pub fn to_bytes(&self) -> Vec<u8> {
        transaction_header_bytes(self)
    }

    /// Decode a header from canonical bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_transaction_header(bytes)
    }
}

/// A signed transaction: header bytes, payload, and header signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    header: TransactionHeader,
    header_bytes: Bytes,
    payload: Bytes,
    signature: Signature,
}

impl Transaction {
    /// Reassemble a transaction received in wire form.
    ///
    /// The header is decoded from `header_bytes`; nothing is verified.
    pub fn from_parts(header_bytes: Bytes, payload: Bytes, signature: Signature) -> Result<Self> {
        let header = TransactionHeader::from_bytes(&header_bytes)?;
        Ok(Self {
            header,
            header_bytes,
            payload,
            signature,
        })
    }

    pub fn header(&self) -> &TransactionHeader {
        &self.header
    }

    /// The exact bytes that were signed.
    pub fn header_bytes(&self) -> &Bytes {
        &self.header_bytes
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The header signature, which doubles as the transaction id.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The state address this transaction reads and writes.
    pub fn address(&self) -> Option<&Address> {
        self.header.outputs.first()
    }
}

/// The signed part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    pub signer_public_key: PublicKey,
    /// Transaction header signatures, in execution order.
    pub transaction_ids: Vec<Signature>,
}

impl BatchHeader {
    /// Canonical bytes of this header.
    pub fn to_bytes(&self) -> Vec<u8> {
        batch_header_bytes(self)
    }

    /// Decode a header from canonical bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_batch_header(bytes)
    }
}

/// Identifier of a batch: its header signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(pub Signature);

impl BatchId {
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An atomic, signed group of transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    header: BatchHeader,
    header_bytes: Bytes,
    transactions: Vec<Transaction>,
    signature: Signature,
}

impl Batch {
    /// Reassemble a batch received in wire form. Nothing is verified.
    pub fn from_parts(
        header_bytes: Bytes,
        transactions: Vec<Transaction>,
        signature: Signature,
    ) -> Result<Self> {
        let header = BatchHeader::from_bytes(&header_bytes)?;
        Ok(Self {
            header,
            header_bytes,
            transactions,
            signature,
        })
    }

    pub fn header(&self) -> &BatchHeader {
        &self.header
    }

    pub fn header_bytes(&self) -> &Bytes {
        &self.header_bytes
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn id(&self) -> BatchId {
        BatchId(self.signature)
    }
}

/// The body posted to the `batches` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchList {
    pub batches: Vec<Batch>,
}

impl BatchList {
    /// Wrap a single batch.
    pub fn single(batch: Batch) -> Self {
        Self {
            batches: vec![batch],
        }
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        batch_list_bytes(self)
    }

    /// Deserialize from wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_batch_list(bytes)
    }
}

/// Builds payloads, signed transactions and signed batches for one
/// transaction family.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    family_name: String,
    family_version: String,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeBuilder {
    /// Builder for the deed family.
    pub fn new() -> Self {
        Self {
            family_name: FAMILY_NAME.to_string(),
            family_version: FAMILY_VERSION.to_string(),
        }
    }

    /// Override the family version stamped into headers.
    pub fn family_version(mut self, version: impl Into<String>) -> Self {
        self.family_version = version.into();
        self
    }

    /// Join the three request fields into payload bytes.
    pub fn build_payload(&self, resource_name: &str, action: &str, owner: &str) -> Bytes {
        Payload::new(resource_name, action, owner).to_bytes()
    }

    /// Build and sign a transaction with a fresh nonce.
    pub fn build_transaction(
        &self,
        identity: &Identity,
        resource_name: &str,
        action: &str,
        owner: &str,
    ) -> Transaction {
        self.build_transaction_with_nonce(identity, resource_name, action, owner, Nonce::generate())
    }

    /// Build and sign a transaction with a caller-chosen nonce.
    ///
    /// Reusing a nonce for the same signer and payload yields byte-identical
    /// transactions; only golden vectors should do that.
    pub fn build_transaction_with_nonce(
        &self,
        identity: &Identity,
        resource_name: &str,
        action: &str,
        owner: &str,
        nonce: Nonce,
    ) -> Transaction {
        let address = address_for(resource_name);
        let payload = self.build_payload(resource_name, action, owner);
        let public_key = identity.public_key();

        let header = TransactionHeader {
            signer_public_key: public_key,
            batcher_public_key: public_key,
            family_name: self.family_name.clone(),
            family_version: self.family_version.clone(),
            inputs: vec![address.clone()],
            outputs: vec![address],
            dependencies: Vec::new(),
            payload_sha512: Sha512Hash::hash(&payload).to_hex(),
            nonce,
        };

        let header_bytes = Bytes::from(header.to_bytes());
        let signature = identity.sign(&header_bytes);

        Transaction {
            header,
            header_bytes,
            payload,
            signature,
        }
    }

    /// Wrap transactions into a signed batch, preserving their order.
    pub fn build_batch(
        &self,
        transactions: Vec<Transaction>,
        identity: &Identity,
    ) -> Result<Batch> {
        if transactions.is_empty() {
            return Err(CoreError::EmptyBatch);
        }

        let header = BatchHeader {
            signer_public_key: identity.public_key(),
            transaction_ids: transactions.iter().map(|tx| tx.signature).collect(),
        };

        let header_bytes = Bytes::from(header.to_bytes());
        let signature = identity.sign(&header_bytes);

        Ok(Batch {
            header,
            header_bytes,
            transactions,
            signature,
        })
    }
}
