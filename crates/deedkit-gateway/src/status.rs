//! Commit status and the JSON bodies returned by the ledger REST API.

use serde::Deserialize;
use std::fmt;

/// Where a submitted batch stands on the ledger.
///
/// Only `Pending` is load-bearing for the client: anything else means the
/// batch has left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitStatus {
    Pending,
    Committed,
    Invalid,
    Unknown,
}

impl CommitStatus {
    /// Map a ledger status string; unrecognized values become `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "PENDING" => CommitStatus::Pending,
            "COMMITTED" => CommitStatus::Committed,
            "INVALID" => CommitStatus::Invalid,
            _ => CommitStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommitStatus::Pending => "PENDING",
            CommitStatus::Committed => "COMMITTED",
            CommitStatus::Invalid => "INVALID",
            CommitStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_pending(self) -> bool {
        self == CommitStatus::Pending
    }
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /batch_statuses` body.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchStatusResponse {
    pub data: Vec<BatchStatusEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchStatusEntry {
    pub id: String,
    pub status: String,
}

impl BatchStatusResponse {
    /// Status of `batch_id`; `Unknown` when the body does not mention it.
    pub fn status_of(&self, batch_id: &str) -> CommitStatus {
        self.data
            .iter()
            .find(|entry| entry.id == batch_id)
            .map(|entry| CommitStatus::from_wire(&entry.status))
            .unwrap_or(CommitStatus::Unknown)
    }
}

/// `GET /state?address=` body.
#[derive(Debug, Deserialize)]
pub(crate) struct StateListResponse {
    pub data: Vec<StateEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateEntry {
    pub data: String,
}

/// `GET /state/{address}` body.
#[derive(Debug, Deserialize)]
pub(crate) struct StateResponse {
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire() {
        assert_eq!(CommitStatus::from_wire("PENDING"), CommitStatus::Pending);
        assert_eq!(
            CommitStatus::from_wire("COMMITTED"),
            CommitStatus::Committed
        );
        assert_eq!(CommitStatus::from_wire("INVALID"), CommitStatus::Invalid);
        assert_eq!(CommitStatus::from_wire("UNKNOWN"), CommitStatus::Unknown);
        assert_eq!(CommitStatus::from_wire("weird"), CommitStatus::Unknown);
        assert!(CommitStatus::Pending.is_pending());
        assert!(!CommitStatus::Unknown.is_pending());
    }

    #[test]
    fn test_status_of_matches_id() {
        let body = r#"{"data":[
            {"id":"aa","status":"PENDING"},
            {"id":"bb","status":"COMMITTED"}
        ]}"#;
        let response: BatchStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status_of("bb"), CommitStatus::Committed);
        assert_eq!(response.status_of("aa"), CommitStatus::Pending);
        assert_eq!(response.status_of("cc"), CommitStatus::Unknown);
    }

    #[test]
    fn test_status_of_empty() {
        let response: BatchStatusResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(response.status_of("aa"), CommitStatus::Unknown);
    }
}
