//! # deedkit
//!
//! Client for the deed transaction family: build signed transactions,
//! submit them to a ledger over REST, and wait for them to commit.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use deedkit::{ClientConfig, DeedClient};
//!
//! async fn example() -> deedkit::Result<()> {
//!     let config = ClientConfig::from_file("deedkit.toml")?.with_env_overrides();
//!     let client = DeedClient::from_config(&config)?;
//!
//!     let report = client
//!         .create("house1", "alice", Some(Duration::from_secs(10)))
//!         .await?;
//!     println!("{}", report.receipt.acknowledgement);
//!
//!     for deed in client.list().await? {
//!         println!("{} -> {}", deed.name, deed.owner);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `deedkit::core` - addressing, signing and envelopes
//! - `deedkit::gateway` - REST gateway and commit waiting

pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod record;

pub use deedkit_core as core;
pub use deedkit_gateway as gateway;

pub use client::DeedClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use keys::{default_key_path, load_identity, write_identity};
pub use record::DeedRecord;

pub use deedkit_core::{address_for, namespace_prefix, Action, Address, Identity};
pub use deedkit_gateway::{
    CommitStatus, LedgerGateway, SubmissionReceipt, WaitOutcome, WaitReport,
};
