//! Deed payloads: `resource_name,action,owner` as UTF-8.
//!
//! The delimiter is not escaped. A field containing `,` produces a payload
//! the transaction processor cannot split back into three fields.

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Field delimiter inside a payload.
pub const DELIMITER: char = ',';

/// The action a deed transaction asks the ledger to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Register a new resource with an owner.
    Create,
    /// Hand an existing resource to a new owner.
    Transfer,
    /// Remove a resource.
    Delete,
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Transfer => "transfer",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Action::Create),
            "transfer" => Ok(Action::Transfer),
            "delete" => Ok(Action::Delete),
            other => Err(CoreError::MalformedPayload(format!(
                "unknown action: {}",
                other
            ))),
        }
    }
}

/// An ordered `(resource_name, action, owner)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub resource_name: String,
    pub action: String,
    pub owner: String,
}

impl Payload {
    /// Create a payload from its three fields.
    pub fn new(
        resource_name: impl Into<String>,
        action: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            action: action.into(),
            owner: owner.into(),
        }
    }

    /// Join the fields with the delimiter.
    pub fn to_bytes(&self) -> Bytes {
        let joined = format!(
            "{}{d}{}{d}{}",
            self.resource_name,
            self.action,
            self.owner,
            d = DELIMITER
        );
        Bytes::from(joined)
    }

    /// Split payload bytes back into fields.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoreError::MalformedPayload(format!("not UTF-8: {}", e)))?;
        let fields: Vec<&str> = text.split(DELIMITER).collect();
        match fields.as_slice() {
            [name, action, owner] => Ok(Self::new(*name, *action, *owner)),
            _ => Err(CoreError::MalformedPayload(format!(
                "expected 3 fields, got {}",
                fields.len()
            ))),
        }
    }

    /// Whether every field is free of the delimiter.
    pub fn is_unambiguous(&self) -> bool {
        [&self.resource_name, &self.action, &self.owner]
            .iter()
            .all(|field| !field.contains(DELIMITER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_bytes() {
        let payload = Payload::new("house1", Action::Create.as_str(), "alice");
        assert_eq!(payload.to_bytes().as_ref(), b"house1,create,alice");
    }

    #[test]
    fn test_payload_decode() {
        let payload = Payload::decode(b"house1,transfer,bob").unwrap();
        assert_eq!(payload.resource_name, "house1");
        assert_eq!(payload.action.parse::<Action>().unwrap(), Action::Transfer);
        assert_eq!(payload.owner, "bob");
    }

    #[test]
    fn test_delimiter_in_field_is_ambiguous() {
        let payload = Payload::new("house,1", "create", "alice");
        assert!(!payload.is_unambiguous());
        assert!(Payload::decode(&payload.to_bytes()).is_err());
    }

    #[test]
    fn test_empty_owner_is_allowed() {
        let payload = Payload::new("house1", "delete", "");
        assert_eq!(payload.to_bytes().as_ref(), b"house1,delete,");
        assert_eq!(Payload::decode(&payload.to_bytes()).unwrap(), payload);
    }

    #[test]
    fn test_unknown_action() {
        assert!("burn".parse::<Action>().is_err());
    }
}
