//! Canonical CBOR encoding for signed headers and the batch wire format.
//!
//! Encoding follows RFC 8949 Core Deterministic Encoding:
//! - Map keys are text, sorted by their encoded bytes
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//!
//! Header bytes are produced once, signed, and carried verbatim on the wire,
//! so the transaction processor verifies exactly the bytes that were signed.
//! **This encoding is frozen.** Any change invalidates existing signatures.

use bytes::Bytes;
use ciborium::value::Value;

use crate::address::Address;
use crate::crypto::{PublicKey, Signature};
use crate::envelope::{Batch, BatchHeader, BatchList, Nonce, Transaction, TransactionHeader};
use crate::error::{CoreError, Result};

/// CBOR map key names.
mod keys {
    pub const BATCHER_PUBLIC_KEY: &str = "batcher_public_key";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const FAMILY_NAME: &str = "family_name";
    pub const FAMILY_VERSION: &str = "family_version";
    pub const INPUTS: &str = "inputs";
    pub const NONCE: &str = "nonce";
    pub const OUTPUTS: &str = "outputs";
    pub const PAYLOAD_SHA512: &str = "payload_sha512";
    pub const SIGNER_PUBLIC_KEY: &str = "signer_public_key";
    pub const TRANSACTION_IDS: &str = "transaction_ids";

    pub const HEADER: &str = "header";
    pub const HEADER_SIGNATURE: &str = "header_signature";
    pub const PAYLOAD: &str = "payload";
    pub const TRANSACTIONS: &str = "transactions";
    pub const BATCHES: &str = "batches";
}

/// Encode a transaction header to canonical CBOR bytes.
pub fn transaction_header_bytes(header: &TransactionHeader) -> Vec<u8> {
    let entries = vec![
        text_entry(keys::SIGNER_PUBLIC_KEY, header.signer_public_key.to_hex()),
        text_entry(keys::BATCHER_PUBLIC_KEY, header.batcher_public_key.to_hex()),
        text_entry(keys::FAMILY_NAME, header.family_name.clone()),
        text_entry(keys::FAMILY_VERSION, header.family_version.clone()),
        text_array_entry(keys::INPUTS, header.inputs.iter().map(Address::to_string)),
        text_array_entry(keys::OUTPUTS, header.outputs.iter().map(Address::to_string)),
        text_array_entry(keys::DEPENDENCIES, header.dependencies.iter().cloned()),
        text_entry(keys::PAYLOAD_SHA512, header.payload_sha512.clone()),
        text_entry(keys::NONCE, header.nonce.to_hex()),
    ];
    encode_cbor_canonical(&Value::Map(entries))
}

/// Decode a transaction header from its canonical bytes.
pub fn decode_transaction_header(bytes: &[u8]) -> Result<TransactionHeader> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "transaction header")?;

    let addresses = |key: &str| -> Result<Vec<Address>> {
        text_array_field(map, key)?
            .iter()
            .map(|s| Address::parse(s))
            .collect()
    };

    Ok(TransactionHeader {
        signer_public_key: PublicKey::from_hex(text_field(map, keys::SIGNER_PUBLIC_KEY)?)?,
        batcher_public_key: PublicKey::from_hex(text_field(map, keys::BATCHER_PUBLIC_KEY)?)?,
        family_name: text_field(map, keys::FAMILY_NAME)?.to_string(),
        family_version: text_field(map, keys::FAMILY_VERSION)?.to_string(),
        inputs: addresses(keys::INPUTS)?,
        outputs: addresses(keys::OUTPUTS)?,
        dependencies: text_array_field(map, keys::DEPENDENCIES)?,
        payload_sha512: text_field(map, keys::PAYLOAD_SHA512)?.to_string(),
        nonce: Nonce::from_hex(text_field(map, keys::NONCE)?)?,
    })
}

/// Encode a batch header to canonical CBOR bytes.
pub fn batch_header_bytes(header: &BatchHeader) -> Vec<u8> {
    let entries = vec![
        text_entry(keys::SIGNER_PUBLIC_KEY, header.signer_public_key.to_hex()),
        text_array_entry(
            keys::TRANSACTION_IDS,
            header.transaction_ids.iter().map(Signature::to_hex),
        ),
    ];
    encode_cbor_canonical(&Value::Map(entries))
}

/// Decode a batch header from its canonical bytes.
pub fn decode_batch_header(bytes: &[u8]) -> Result<BatchHeader> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "batch header")?;

    let transaction_ids = text_array_field(map, keys::TRANSACTION_IDS)?
        .iter()
        .map(|s| Signature::from_hex(s))
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchHeader {
        signer_public_key: PublicKey::from_hex(text_field(map, keys::SIGNER_PUBLIC_KEY)?)?,
        transaction_ids,
    })
}

/// Encode a batch list to the bytes posted to the `batches` endpoint.
pub fn batch_list_bytes(list: &BatchList) -> Vec<u8> {
    let batches = list.batches.iter().map(batch_to_value).collect();
    let entries = vec![(Value::Text(keys::BATCHES.into()), Value::Array(batches))];
    encode_cbor_canonical(&Value::Map(entries))
}

/// Decode a batch list from its wire bytes.
///
/// Headers are decoded from the embedded header bytes; signatures are not
/// checked here (see [`crate::validation`]).
pub fn decode_batch_list(bytes: &[u8]) -> Result<BatchList> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "batch list")?;

    let batches = match field(map, keys::BATCHES)? {
        Value::Array(items) => items
            .iter()
            .map(value_to_batch)
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(malformed("batches is not an array")),
    };

    Ok(BatchList { batches })
}

fn transaction_to_value(tx: &Transaction) -> Value {
    Value::Map(vec![
        (
            Value::Text(keys::HEADER.into()),
            Value::Bytes(tx.header_bytes().to_vec()),
        ),
        text_entry(keys::HEADER_SIGNATURE, tx.signature().to_hex()),
        (
            Value::Text(keys::PAYLOAD.into()),
            Value::Bytes(tx.payload().to_vec()),
        ),
    ])
}

fn batch_to_value(batch: &Batch) -> Value {
    let txs = batch.transactions();
    Value::Map(vec![
        (
            Value::Text(keys::HEADER.into()),
            Value::Bytes(batch.header_bytes().to_vec()),
        ),
        text_entry(keys::HEADER_SIGNATURE, batch.signature().to_hex()),
        (
            Value::Text(keys::TRANSACTIONS.into()),
            Value::Array(txs.iter().map(transaction_to_value).collect()),
        ),
    ])
}

fn value_to_transaction(value: &Value) -> Result<Transaction> {
    let map = as_map(value, "transaction")?;
    Transaction::from_parts(
        Bytes::from(bytes_field(map, keys::HEADER)?.to_vec()),
        Bytes::from(bytes_field(map, keys::PAYLOAD)?.to_vec()),
        Signature::from_hex(text_field(map, keys::HEADER_SIGNATURE)?)?,
    )
}

fn value_to_batch(value: &Value) -> Result<Batch> {
    let map = as_map(value, "batch")?;
    let transactions = match field(map, keys::TRANSACTIONS)? {
        Value::Array(items) => items
            .iter()
            .map(value_to_transaction)
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(malformed("transactions is not an array")),
    };
    Batch::from_parts(
        Bytes::from(bytes_field(map, keys::HEADER)?.to_vec()),
        transactions,
        Signature::from_hex(text_field(map, keys::HEADER_SIGNATURE)?)?,
    )
}

fn text_entry(key: &str, value: String) -> (Value, Value) {
    (Value::Text(key.to_string()), Value::Text(value))
}

fn text_array_entry(key: &str, values: impl Iterator<Item = String>) -> (Value, Value) {
    (
        Value::Text(key.to_string()),
        Value::Array(values.map(Value::Text).collect()),
    )
}

fn malformed(msg: &str) -> CoreError {
    CoreError::MalformedEnvelope(msg.to_string())
}

fn decode_value(bytes: &[u8]) -> Result<Value> {
    ciborium::from_reader(bytes)
        .map_err(|e| CoreError::DecodingError(e.to_string()))
}

fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)]> {
    match value {
        Value::Map(entries) => Ok(entries),
        _ => Err(CoreError::MalformedEnvelope(format!(
            "{} is not a map",
            what
        ))),
    }
}

fn field<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Text(t) if t == key))
        .map(|(_, v)| v)
        .ok_or_else(|| CoreError::MalformedEnvelope(format!("missing {}", key)))
}

fn text_field<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a str> {
    match field(map, key)? {
        Value::Text(s) => Ok(s),
        _ => Err(CoreError::MalformedEnvelope(format!("{} is not text", key))),
    }
}

fn bytes_field<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a [u8]> {
    match field(map, key)? {
        Value::Bytes(b) => Ok(b),
        _ => Err(CoreError::MalformedEnvelope(format!(
            "{} is not bytes",
            key
        ))),
    }
}

fn text_array_field(map: &[(Value, Value)], key: &str) -> Result<Vec<String>> {
    match field(map, key)? {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Text(s) => Ok(s.clone()),
                _ => Err(CoreError::MalformedEnvelope(format!(
                    "{} holds a non-text item",
                    key
                ))),
            })
            .collect(),
        _ => Err(CoreError::MalformedEnvelope(format!(
            "{} is not an array",
            key
        ))),
    }
}

/// Encode a CBOR Value to canonical bytes.
fn encode_cbor_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        _ => panic!("unsupported CBOR value type in canonical encoding"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Identity;
    use crate::envelope::EnvelopeBuilder;

    fn sample_header() -> TransactionHeader {
        let identity = Identity::from_seed(&[0x42; 32]);
        EnvelopeBuilder::new()
            .build_transaction_with_nonce(
                &identity,
                "house1",
                "create",
                "alice",
                Nonce::from_bytes([0x01; 16]),
            )
            .header()
            .clone()
    }

    #[test]
    fn test_header_encoding_deterministic() {
        let header = sample_header();
        assert_eq!(
            transaction_header_bytes(&header),
            transaction_header_bytes(&header)
        );
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let bytes = transaction_header_bytes(&header);
        assert_eq!(decode_transaction_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_map_keys_sorted_by_encoding() {
        let mut buf = Vec::new();
        let entries = vec![
            (Value::Text("nonce".into()), Value::Integer(1.into())),
            (Value::Text("inputs".into()), Value::Integer(2.into())),
            (Value::Text("family_name".into()), Value::Integer(3.into())),
        ];
        encode_map_canonical(&mut buf, &entries);

        // Shorter keys encode with a smaller length byte, so they sort first.
        assert_eq!(buf[0], 0xa3);
        assert_eq!(buf[1], 0x65);
        assert_eq!(&buf[2..7], b"nonce");
        assert_eq!(buf[8], 0x66);
        assert_eq!(&buf[9..15], b"inputs");
        assert_eq!(buf[16], 0x6b);
        assert_eq!(&buf[17..28], b"family_name");
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);
    }

    #[test]
    fn test_decode_rejects_non_map() {
        let mut buf = Vec::new();
        encode_value_to(&mut buf, &Value::Array(vec![]));
        assert!(matches!(
            decode_transaction_header(&buf),
            Err(CoreError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let mut buf = Vec::new();
        encode_value_to(
            &mut buf,
            &Value::Map(vec![text_entry(keys::SIGNER_PUBLIC_KEY, "00".repeat(32))]),
        );
        assert!(decode_batch_header(&buf).is_err());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_batch_list(&[0xff, 0x00, 0x13]),
            Err(CoreError::DecodingError(_)) | Err(CoreError::MalformedEnvelope(_))
        ));
    }
}
