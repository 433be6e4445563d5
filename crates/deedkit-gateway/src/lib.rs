//! # deedkit gateway
//!
//! Async client for the ledger REST surface: batch submission, status
//! queries, state reads and commit waiting.
//!
//! All HTTP goes through an [`HttpTransport`]; [`ReqwestTransport`] is the
//! production implementation and [`transport::mock::MockTransport`] the
//! scripted one used by tests.

pub mod error;
pub mod gateway;
pub mod status;
pub mod transport;
pub mod waiter;

pub use error::{GatewayError, Result};
pub use gateway::{
    normalize_base_url, BasicAuth, LedgerGateway, SubmissionReceipt, BATCH_CONTENT_TYPE,
};
pub use status::CommitStatus;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};
pub use waiter::{CommitWaiter, WaitOutcome, WaitReport};
