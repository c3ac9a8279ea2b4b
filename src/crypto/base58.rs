//! Base58Check in the Ripple alphabet
//!
//! Addresses and family seeds share the Bitcoin checksum scheme but use
//! the Ripple alphabet, so `r` plays the role of the zero digit.

use super::hash::double_sha256;
use super::keys::KeyError;

/// Version byte for account ids (addresses start with `r`)
pub const VERSION_ACCOUNT_ID: u8 = 0x00;

/// Version byte for secp256k1 family seeds (secrets start with `s`)
pub const VERSION_FAMILY_SEED: u8 = 0x21;

const CHECKSUM_LEN: usize = 4;

/// Encode `version || payload || checksum` with the Ripple alphabet
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    bytes.push(version);
    bytes.extend_from_slice(payload);

    let checksum = double_sha256(&bytes);
    bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode a base58check string, checking version byte, payload length and checksum
pub fn decode_check(encoded: &str, version: u8, payload_len: usize) -> Result<Vec<u8>, KeyError> {
    let bytes = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;

    if bytes.len() != 1 + payload_len + CHECKSUM_LEN {
        return Err(KeyError::InvalidEncoding(format!(
            "expected {} bytes, decoded {}",
            1 + payload_len + CHECKSUM_LEN,
            bytes.len()
        )));
    }

    let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if double_sha256(body)[..CHECKSUM_LEN] != *checksum {
        return Err(KeyError::InvalidChecksum);
    }
    if body[0] != version {
        return Err(KeyError::InvalidEncoding(format!(
            "version byte {:#04x}, expected {:#04x}",
            body[0], version
        )));
    }

    Ok(body[1..].to_vec())
}
