//! Cryptographic utilities for the ledger protocol
//!
//! This module provides:
//! - SHA-256 / SHA-512Half hashing and transaction hash prefixes
//! - Base58Check in the Ripple alphabet
//! - secp256k1 key derivation from family seeds, DER signing and verification

pub mod base58;
pub mod hash;
pub mod keys;

pub use base58::{decode_check, encode_check, VERSION_ACCOUNT_ID, VERSION_FAMILY_SEED};
pub use hash::{
    account_hash, double_sha256, sha256, sha512_half, HASH_PREFIX_TRANSACTION_ID,
    HASH_PREFIX_TX_MULTI_SIGN, HASH_PREFIX_TX_SIGN,
};
pub use keys::{
    public_key_from_bytes, sign_digest, verify_signature, KeyError, KeyPair, SEED_LEN,
};
