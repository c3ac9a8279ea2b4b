//! ECDSA key management for ledger accounts
//!
//! Keys are secp256k1 and derived from a 16-byte family seed: the seed
//! yields a root key, and the account key is the root key plus the first
//! valid scalar of the root public key's index-0 family. Signatures are
//! DER-encoded with low S.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Scalar, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::{account_hash, sha512_half};

/// Length of a family seed payload
pub const SEED_LEN: usize = 16;

/// Family index of the account key derived from a root key
const ACCOUNT_FAMILY_INDEX: u32 = 0;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Checksum mismatch")]
    InvalidChecksum,
    #[error("Key derivation exhausted the sequence space")]
    DerivationFailed,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Derive the account key pair of a family seed
    pub fn from_family_seed(seed: &[u8; SEED_LEN]) -> Result<Self, KeyError> {
        let secp = Secp256k1::new();

        let root = derive_scalar(|seq| sha512_half(&[seed, &seq.to_be_bytes()]))?;
        let root_public = PublicKey::from_secret_key(&secp, &root).serialize();

        let tweak = derive_scalar(|seq| {
            sha512_half(&[
                &root_public,
                &ACCOUNT_FAMILY_INDEX.to_be_bytes(),
                &seq.to_be_bytes(),
            ])
        })?;
        let tweak = Scalar::from_be_bytes(tweak.secret_bytes())
            .map_err(|_| KeyError::DerivationFailed)?;

        let secret_key = root.add_tweak(&tweak)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Compressed public key (33 bytes)
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// Get the public key as upper-case hex, the form the ledger's JSON uses
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key_bytes())
    }

    /// RIPEMD160(SHA256(compressed public key))
    pub fn account_id(&self) -> [u8; 20] {
        account_hash(&self.public_key_bytes())
    }

    /// Sign a 32-byte digest, returning a DER-encoded signature
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        sign_digest(&self.secret_key, digest)
    }

    /// Verify a DER signature against this key pair's public key
    pub fn verify(&self, digest: &[u8; 32], signature: &[u8]) -> Result<bool, KeyError> {
        verify_signature(&self.public_key_bytes(), digest, signature)
    }
}

/// First sequence number whose hash is a valid non-zero scalar
fn derive_scalar<F>(hash_at: F) -> Result<SecretKey, KeyError>
where
    F: Fn(u32) -> [u8; 32],
{
    for seq in 0..=u32::MAX {
        if let Ok(key) = SecretKey::from_slice(&hash_at(seq)) {
            return Ok(key);
        }
    }
    Err(KeyError::DerivationFailed)
}

/// Parse a compressed or uncompressed public key
pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey, KeyError> {
    PublicKey::from_slice(bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a digest with a secret key (DER, low S)
pub fn sign_digest(secret_key: &SecretKey, digest: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest_slice(digest)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_der().to_vec())
}

/// Verify a DER signature over a digest
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and
/// an error when the key or signature cannot be parsed.
pub fn verify_signature(
    public_key: &[u8],
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();
    let public_key = public_key_from_bytes(public_key)?;
    let message = Message::from_digest_slice(digest)?;
    let signature = Signature::from_der(signature).map_err(|_| KeyError::InvalidSignature)?;

    match secp.verify_ecdsa(&message, &signature, &public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha512_half;

    fn fixture_seed() -> [u8; SEED_LEN] {
        let bytes = hex::decode("9d97823891a7b1b0818d35aa7f982eff").unwrap();
        bytes.try_into().unwrap()
    }

    #[test]
    fn test_family_seed_derivation() {
        let kp = KeyPair::from_family_seed(&fixture_seed()).unwrap();
        assert_eq!(
            kp.public_key_hex(),
            "038B71C30DF7D4E9259732247AF169CCFACA1C0210784CEBD2884C0003B91CF33A"
        );
        assert_eq!(
            hex::encode(kp.account_id()),
            "d9d0d4aed31322299796abc1ccc3661b957b2caa"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let kp1 = KeyPair::from_family_seed(&fixture_seed()).unwrap();
        let kp2 = KeyPair::from_family_seed(&fixture_seed()).unwrap();
        assert_eq!(kp1, kp2);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::from_family_seed(&fixture_seed()).unwrap();
        let digest = sha512_half(&[b"Hello, ledger!"]);

        let signature = kp.sign(&digest).unwrap();
        // DER sequence tag
        assert_eq!(signature[0], 0x30);
        assert!(kp.verify(&digest, &signature).unwrap());

        let other = sha512_half(&[b"Another message"]);
        assert!(!kp.verify(&other, &signature).unwrap());
    }

    #[test]
    fn test_garbage_signature_is_an_error() {
        let kp = KeyPair::from_family_seed(&fixture_seed()).unwrap();
        let digest = sha512_half(&[b"msg"]);
        assert!(matches!(
            kp.verify(&digest, &[0x01, 0x02, 0x03]),
            Err(KeyError::InvalidSignature)
        ));
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(public_key_from_bytes(&[0x05; 33]).is_err());
    }
}
