//! # deedkit testkit
//!
//! Testing utilities for deedkit.
//!
//! - **Golden vectors**: fixed inputs with known addresses, signatures and
//!   batch ids
//! - **Generators**: proptest strategies for identities, names and
//!   transactions
//! - **Fixtures**: a seeded signer plus canned ledger responses for
//!   [`MockTransport`](deedkit_gateway::transport::mock::MockTransport)
//!
//! ## Golden Vectors
//!
//! ```rust
//! use deedkit_testkit::vectors::{all_vectors, generate_batch_from_vector};
//!
//! for vector in all_vectors() {
//!     let batch = generate_batch_from_vector(&vector);
//!     assert_eq!(batch.id().to_hex(), vector.expected_batch_id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use deedkit_testkit::generators::{tx_from_params, TxParams};
//!
//! proptest! {
//!     #[test]
//!     fn transactions_validate(params: TxParams) {
//!         let tx = tx_from_params(&params);
//!         prop_assert!(deedkit_core::validate_transaction(&tx).is_ok());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{ledger, multi_party_fixtures, TestFixture};
pub use generators::{tx_from_params, TxParams};
pub use vectors::{
    address_vectors, all_vectors, generate_batch_from_vector, generate_transaction_from_vector,
    verify_all_vectors, AddressVector, GoldenVector,
};
