//! Envelope validation: signature verification and structural checks.
//!
//! Checks run against the carried header bytes, decoded afresh, so a
//! transaction is judged by exactly what was signed.

use crate::crypto::Sha512Hash;
use crate::envelope::{Batch, BatchHeader, Transaction, TransactionHeader};
use crate::error::ValidationError;

/// Validate a single transaction.
///
/// This performs:
/// - Header decode from the signed bytes
/// - Payload hash verification
/// - Signature verification against the declared signer key
pub fn validate_transaction(tx: &Transaction) -> Result<(), ValidationError> {
    let header = TransactionHeader::from_bytes(tx.header_bytes())?;

    let computed = Sha512Hash::hash(tx.payload()).to_hex();
    if computed != header.payload_sha512 {
        return Err(ValidationError::PayloadHashMismatch);
    }

    header
        .signer_public_key
        .verify(tx.header_bytes(), tx.signature())
        .map_err(|_| ValidationError::SignatureFailed)
}

/// Validate a batch and every transaction in it.
pub fn validate_batch(batch: &Batch) -> Result<(), ValidationError> {
    let header = BatchHeader::from_bytes(batch.header_bytes())?;

    if header.transaction_ids.len() != batch.transactions().len() {
        return Err(ValidationError::StructuralError(format!(
            "header lists {} transactions, batch holds {}",
            header.transaction_ids.len(),
            batch.transactions().len()
        )));
    }

    for (index, (expected, tx)) in header
        .transaction_ids
        .iter()
        .zip(batch.transactions())
        .enumerate()
    {
        if expected != tx.signature() {
            return Err(ValidationError::TransactionIdMismatch {
                index,
                expected: expected.to_hex(),
                got: tx.signature().to_hex(),
            });
        }
    }

    header
        .signer_public_key
        .verify(batch.header_bytes(), batch.signature())
        .map_err(|_| ValidationError::BatchSignatureFailed)?;

    batch
        .transactions()
        .iter()
        .try_for_each(validate_transaction)
}
