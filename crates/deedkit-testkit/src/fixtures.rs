//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests.

use deedkit_core::{
    address_for, Action, Address, Batch, EnvelopeBuilder, Identity, Nonce, PublicKey, Transaction,
};

/// A signer with a builder for the deed family.
pub struct TestFixture {
    pub identity: Identity,
    pub builder: EnvelopeBuilder,
}

impl TestFixture {
    /// Create a new test fixture with a random identity.
    pub fn new() -> Self {
        Self {
            identity: Identity::generate(),
            builder: EnvelopeBuilder::new(),
        }
    }

    /// Create with a deterministic identity from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            identity: Identity::from_seed(&seed),
            builder: EnvelopeBuilder::new(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    pub fn address(&self, name: &str) -> Address {
        address_for(name)
    }

    /// Build a signed transaction with a fresh nonce.
    pub fn make_transaction(&self, name: &str, action: Action, owner: &str) -> Transaction {
        self.builder
            .build_transaction(&self.identity, name, action.as_str(), owner)
    }

    /// Build a signed transaction with a fixed nonce.
    pub fn make_transaction_with_nonce(
        &self,
        name: &str,
        action: Action,
        owner: &str,
        nonce: [u8; 16],
    ) -> Transaction {
        self.builder.build_transaction_with_nonce(
            &self.identity,
            name,
            action.as_str(),
            owner,
            Nonce::from_bytes(nonce),
        )
    }

    /// Sign a batch over the given transactions.
    pub fn make_batch(&self, transactions: Vec<Transaction>) -> Batch {
        self.builder
            .build_batch(transactions, &self.identity)
            .expect("fixture batches are never empty")
    }

    /// A one-transaction batch, as the client submits it.
    pub fn single_batch(&self, name: &str, action: Action, owner: &str) -> Batch {
        let tx = self.make_transaction(name, action, owner);
        self.make_batch(vec![tx])
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Canned ledger REST responses.
pub mod ledger {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use deedkit_gateway::transport::mock::MockTransport;
    use deedkit_gateway::{HttpResponse, Method};
    use serde_json::json;

    /// Body the `batches` endpoint answers with.
    pub const ACCEPTED: &str = r#"{"link":"http://ledger/batch_statuses?id=batch"}"#;

    /// `GET /batch_statuses` body reporting `status` for `batch_id`.
    pub fn status_body(batch_id: &str, status: &str) -> String {
        let body = json!({ "data": [{ "id": batch_id, "status": status }] });
        body.to_string()
    }

    /// `GET /state?address=` body listing the given entries.
    pub fn state_list_body(entries: &[(&str, &[u8])]) -> String {
        let data: Vec<_> = entries
            .iter()
            .map(|(address, state)| {
                json!({ "address": address, "data": BASE64.encode(state) })
            })
            .collect();
        json!({ "data": data }).to_string()
    }

    /// `GET /state/{address}` body.
    pub fn state_body(state: &[u8]) -> String {
        json!({ "data": BASE64.encode(state) }).to_string()
    }

    /// A ledger that accepts every batch with 202.
    pub fn accepting() -> MockTransport {
        MockTransport::new().respond(
            Method::Post,
            "/batches",
            HttpResponse::with_status(202, ACCEPTED),
        )
    }

    /// A ledger that accepts every batch and reports `status` for whichever
    /// batch id a status query names.
    pub fn settling(status: &str) -> MockTransport {
        let status = status.to_string();
        accepting().respond_with(Method::Get, "/batch_statuses", move |request| {
            let id = queried_batch_id(&request.url).unwrap_or_default();
            HttpResponse::ok(status_body(id, &status))
        })
    }

    /// The `id` query parameter of a status URL.
    pub fn queried_batch_id(url: &str) -> Option<&str> {
        let (_, query) = url.split_once('?')?;
        query.split('&').find_map(|pair| pair.strip_prefix("id="))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deedkit_core::{validate_batch, validate_transaction};

    #[test]
    fn test_fixture_transactions_validate() {
        let fixture = TestFixture::new();
        let tx = fixture.make_transaction("house1", Action::Create, "alice");

        assert_eq!(tx.address(), Some(&fixture.address("house1")));
        assert_eq!(tx.header().signer_public_key, fixture.public_key());
        validate_transaction(&tx).unwrap();
    }

    #[test]
    fn test_fixture_batch() {
        let fixture = TestFixture::with_seed([0x42; 32]);
        let batch = fixture.single_batch("house1", Action::Transfer, "bob");

        assert_eq!(batch.transactions().len(), 1);
        validate_batch(&batch).unwrap();
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }

    #[test]
    fn test_ledger_bodies() {
        let body = ledger::state_list_body(&[("abc", &b"house1,alice"[..])]);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["data"][0]["address"], "abc");
        assert_eq!(parsed["data"][0]["data"], "aG91c2UxLGFsaWNl");

        let status: serde_json::Value =
            serde_json::from_str(&ledger::status_body("ab12", "COMMITTED")).unwrap();
        assert_eq!(status["data"][0]["id"], "ab12");
        assert_eq!(status["data"][0]["status"], "COMMITTED");
    }

    #[test]
    fn test_queried_batch_id() {
        assert_eq!(
            ledger::queried_batch_id("http://ledger/batch_statuses?id=ab12&wait=5"),
            Some("ab12")
        );
        let bare = "http://ledger/batch_statuses";
        assert_eq!(ledger::queried_batch_id(bare), None);
    }
}
