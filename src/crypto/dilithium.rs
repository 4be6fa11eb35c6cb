//! Dilithium3 signer backed by `pqcrypto-dilithium`.

use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

use super::{KeyPair, Signer};
use crate::error::{ProofaError, Result};

/// CRYSTALS-Dilithium, NIST security level 3
#[derive(Debug, Clone, Copy, Default)]
pub struct DilithiumSigner;

impl DilithiumSigner {
    pub fn new() -> Self {
        Self
    }
}

impl Signer for DilithiumSigner {
    fn algorithm(&self) -> &'static str {
        "dilithium3"
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let (public_key, secret_key) = dilithium3::keypair();
        Ok(KeyPair::new(
            public_key.as_bytes().to_vec(),
            secret_key.as_bytes().to_vec(),
        ))
    }

    fn sign(&self, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let secret_key = dilithium3::SecretKey::from_bytes(private_key)
            .map_err(|e| ProofaError::Signing(format!("invalid private key: {:?}", e)))?;

        let signature = dilithium3::detached_sign(data, &secret_key);
        Ok(signature.as_bytes().to_vec())
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
        let public_key = dilithium3::PublicKey::from_bytes(public_key)
            .map_err(|e| ProofaError::Signing(format!("invalid public key: {:?}", e)))?;

        let signature = match dilithium3::DetachedSignature::from_bytes(signature) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };

        Ok(dilithium3::verify_detached_signature(&signature, data, &public_key).is_ok())
    }
}
