//! Hashing utilities for the ledger protocol
//!
//! Provides SHA-256, SHA-512Half and the RIPEMD-160 account hash, plus the
//! four-byte prefixes that domain-separate transaction hashes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Prefix for the transaction id hash ("TXN\0")
pub const HASH_PREFIX_TRANSACTION_ID: [u8; 4] = *b"TXN\0";

/// Prefix for single-signature signing data ("STX\0")
pub const HASH_PREFIX_TX_SIGN: [u8; 4] = *b"STX\0";

/// Prefix for multi-signature signing data ("SMT\0")
pub const HASH_PREFIX_TX_MULTI_SIGN: [u8; 4] = *b"SMT\0";

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for base58check checksums
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// First 32 bytes of SHA-512 over the concatenation of `parts`
pub fn sha512_half(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();

    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    half
}

/// RIPEMD160(SHA256(data)), the account id of a public key
pub fn account_hash(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));

    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha512_half_matches_single_buffer() {
        let joined = sha512_half(&[b"hello world"]);
        let split = sha512_half(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, split);
        assert_eq!(
            hex::encode(joined),
            "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f"
        );
    }

    #[test]
    fn test_hash_prefixes() {
        assert_eq!(u32::from_be_bytes(HASH_PREFIX_TRANSACTION_ID), 0x5458_4E00);
        assert_eq!(u32::from_be_bytes(HASH_PREFIX_TX_SIGN), 0x5354_5800);
        assert_eq!(u32::from_be_bytes(HASH_PREFIX_TX_MULTI_SIGN), 0x534D_5400);
    }

    #[test]
    fn test_account_hash_length() {
        assert_eq!(account_hash(&[0x02; 33]).len(), 20);
    }
}
