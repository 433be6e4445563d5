//! Deterministic, namespaced state addresses.
//!
//! An address is 70 lowercase hex characters: the first 6 hex characters of
//! SHA-512 of the family namespace, followed by the first 64 hex characters
//! of SHA-512 of the resource name.

use std::fmt;

use crate::crypto::Sha512Hash;
use crate::envelope::FAMILY_NAME;
use crate::error::{CoreError, Result};

/// Namespace string hashed into every address prefix.
pub const NAMESPACE: &str = FAMILY_NAME;

/// Hex length of the namespace prefix.
pub const PREFIX_LEN: usize = 6;

/// Hex length of the resource part.
pub const RESOURCE_HASH_LEN: usize = 64;

/// Total hex length of an address.
pub const ADDRESS_LEN: usize = PREFIX_LEN + RESOURCE_HASH_LEN;

/// The 6-hex-char prefix shared by every address of this family.
pub fn namespace_prefix() -> String {
    let digest = Sha512Hash::hash(NAMESPACE.as_bytes()).to_hex();
    digest[..PREFIX_LEN].to_string()
}

/// Derive the state address of a resource.
pub fn address_for(resource_name: &str) -> Address {
    let resource_hash = Sha512Hash::hash(resource_name.as_bytes()).to_hex();
    let mut address = namespace_prefix();
    address.push_str(&resource_hash[..RESOURCE_HASH_LEN]);
    Address(address)
}

/// A 70-character state address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Parse and check an address string.
    ///
    /// The string must be 70 lowercase hex characters and carry this
    /// family's namespace prefix.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };

        if s.len() != ADDRESS_LEN {
            return Err(invalid("wrong length"));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(invalid("not lowercase hex"));
        }
        if s[..PREFIX_LEN] != namespace_prefix() {
            return Err(invalid("foreign namespace"));
        }
        Ok(Self(s.to_string()))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part.
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.0[..16])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
