//! Deed records as stored in ledger state.
//!
//! The state at one address is a `|`-separated list of `name,owner`
//! records; more than one record only appears when two names share an
//! address.

use std::fmt;

use deedkit_core::CoreError;

use crate::error::{ClientError, Result};

const RECORD_SEPARATOR: &str = "|";
const FIELD_SEPARATOR: char = ',';

/// One deed: a resource name and its current owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeedRecord {
    pub name: String,
    pub owner: String,
}

impl DeedRecord {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
        }
    }

    /// Decode every record stored at one address.
    pub fn parse_all(state: &[u8]) -> Result<Vec<DeedRecord>> {
        let text = std::str::from_utf8(state)
            .map_err(|e| malformed(format!("state is not UTF-8: {}", e)))?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        text.split(RECORD_SEPARATOR).map(Self::parse_one).collect()
    }

    fn parse_one(record: &str) -> Result<DeedRecord> {
        match record.split_once(FIELD_SEPARATOR) {
            Some((name, owner)) if !name.is_empty() && !owner.contains(FIELD_SEPARATOR) => {
                Ok(DeedRecord::new(name, owner))
            }
            _ => Err(malformed(format!("bad deed record {:?}", record))),
        }
    }

    /// Encode records the way the ledger stores them.
    pub fn serialize_all(records: &[DeedRecord]) -> Vec<u8> {
        records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
            .into_bytes()
    }
}

fn malformed(detail: String) -> ClientError {
    CoreError::MalformedPayload(detail).into()
}

impl fmt::Display for DeedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, FIELD_SEPARATOR, self.owner)
    }
}
