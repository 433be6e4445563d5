//! Cryptographic primitives: Ed25519 signing and SHA-512 hashing.
//!
//! SHA-512 is shared between address derivation and payload content hashes,
//! so both are reproducible by the transaction processor from the same
//! digest family.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha512};
use std::fmt;

use crate::error::{CoreError, Result};

/// A 64-byte SHA-512 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha512Hash(pub [u8; 64]);

impl Sha512Hash {
    /// Compute the SHA-512 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(data);
        let mut out = [0u8; 64];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to lowercase hex (128 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha512Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA512({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Sha512Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidPublicKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidPublicKey)?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = DalekSignature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidSignature)?;
        let arr: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidSignature)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A signing identity: an Ed25519 private key and its public key.
///
/// Identities are passed explicitly into every signing operation; nothing in
/// this crate keeps one as ambient state.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a hex-encoded private key. Surrounding whitespace is ignored.
    pub fn from_hex(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let bytes = hex::decode(trimmed)
            .map_err(|e| CoreError::KeyFormat(format!("not valid hex: {}", e)))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::KeyFormat(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(&seed))
    }

    /// Load key material that is either 32 raw bytes or a hex line.
    pub fn load(material: &[u8]) -> Result<Self> {
        if let Ok(seed) = <[u8; 32]>::try_from(material) {
            return Ok(Self::from_seed(&seed));
        }
        let text = std::str::from_utf8(material)
            .map_err(|_| CoreError::KeyFormat("key material is not hex".into()))?;
        Self::from_hex(text)
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Hex encoding of the public key.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Hex encoding of the private key, in the key-file format.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let identity = Identity::generate();
        let message = b"hello world";
        let signature = identity.sign(message);

        identity.public_key().verify(message, &signature).unwrap();

        let tampered = b"hello worlD";
        assert!(identity.public_key().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_deterministic_from_seed() {
        let id1 = Identity::from_seed(&[0x42; 32]);
        let id2 = Identity::from_seed(&[0x42; 32]);
        assert_eq!(id1.public_key(), id2.public_key());
        assert_eq!(id1.sign(b"m"), id2.sign(b"m"));
    }

    #[test]
    fn test_from_hex_trims_whitespace() {
        let line = format!("  {}\n", "42".repeat(32));
        let identity = Identity::from_hex(&line).unwrap();
        assert_eq!(
            identity.public_key(),
            Identity::from_seed(&[0x42; 32]).public_key()
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_material() {
        assert!(matches!(
            Identity::from_hex("zz"),
            Err(CoreError::KeyFormat(_))
        ));
        assert!(matches!(
            Identity::from_hex(&"ab".repeat(31)),
            Err(CoreError::KeyFormat(_))
        ));
    }

    #[test]
    fn test_load_raw_and_hex() {
        let raw = Identity::load(&[0x07; 32]).unwrap();
        let hexed = Identity::load("07".repeat(32).as_bytes()).unwrap();
        assert_eq!(raw.public_key(), hexed.public_key());
        assert!(Identity::load(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let identity = Identity::generate();
        let recovered = Identity::from_hex(&identity.secret_hex()).unwrap();
        assert_eq!(identity.public_key(), recovered.public_key());
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = Identity::from_seed(&[0x11; 32]);
        let debug = format!("{:?}", identity);
        assert!(debug.starts_with("Identity(PublicKey("));
        assert!(!debug.contains(&identity.secret_hex()));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Identity::generate().public_key();
        assert_eq!(PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(PublicKey::from_hex("abcd").is_err());
    }

    #[test]
    fn test_sha512_known_vector() {
        assert_eq!(
            Sha512Hash::hash(b"house1").to_hex(),
            "63ecabc5eabca65c623afb0c2c00d9adbddf1eeee233edcda62e2934ee8d4f14\
             061e4af7467e34d175d580d73268c1732888d56597343e3b48d5ddec8201bbc5"
        );
    }
}
