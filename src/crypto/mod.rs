//! Signing and hashing primitives.
//!
//! The pipeline only talks to the [`Signer`] trait. The shipped backend is
//! CRYSTALS-Dilithium (level 3), a lattice signature scheme that holds up
//! against both classical and quantum adversaries.

pub mod digest;
pub mod dilithium;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use digest::{canonical_json, sha256_digest, sha256_hex};
pub use dilithium::DilithiumSigner;

/// A user's signing key pair, both halves as opaque bytes
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub private_key: Vec<u8>,
}

impl KeyPair {
    pub fn new(public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }
}

// Keep private key bytes out of logs
impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &format!("{} bytes", self.public_key.len()))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Signature primitive boundary
pub trait Signer: Send + Sync {
    /// Algorithm identifier recorded alongside signatures
    fn algorithm(&self) -> &'static str;

    /// Generate a fresh key pair
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Produce a detached signature over `data`
    fn sign(&self, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Check a detached signature.
    ///
    /// A malformed public key is an error; a signature that does not verify
    /// (including one of the wrong length) is `Ok(false)`.
    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool>;
}

/// Serde adapter storing byte strings as lowercase hex
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
