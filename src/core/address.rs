//! Account identifiers
//!
//! An account id is the 20-byte RIPEMD160(SHA256(pubkey)) hash. Its
//! human-readable form is the base58check address starting with `r`.

use crate::crypto::{account_hash, decode_check, encode_check, KeyError, VERSION_ACCOUNT_ID};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an account id in bytes
pub const ACCOUNT_ID_LEN: usize = 20;

/// A 160-bit account identifier
///
/// Ordering is the big-endian numeric order of the id, which is the order
/// the ledger expects for `Signers` arrays.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Account id owned by a compressed public key
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(account_hash(public_key))
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; ACCOUNT_ID_LEN] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Parse an `r...` address
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        let payload = decode_check(address, VERSION_ACCOUNT_ID, ACCOUNT_ID_LEN)?;
        Self::from_slice(&payload).ok_or_else(|| KeyError::InvalidEncoding(address.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    pub fn to_address(&self) -> String {
        encode_check(VERSION_ACCOUNT_ID, &self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl FromStr for AccountId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_address())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let address = String::deserialize(deserializer)?;
        Self::from_address(&address).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip() {
        let account: AccountId = "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9".parse().unwrap();
        assert_eq!(
            hex::encode(account.as_bytes()),
            "1911020795da799386af26f1cacc0ef6582b7d2c"
        );
        assert_eq!(account.to_string(), "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9");
    }

    #[test]
    fn test_from_public_key() {
        let pubkey =
            hex::decode("038b71c30df7d4e9259732247af169ccfaca1c0210784cebd2884c0003b91cf33a")
                .unwrap();
        let account = AccountId::from_public_key(&pubkey);
        assert_eq!(account.to_address(), "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF");
    }

    #[test]
    fn test_ordering_is_numeric() {
        let low = AccountId::from_bytes([0u8; 20]);
        let mut high_bytes = [0u8; 20];
        high_bytes[0] = 1;
        let high = AccountId::from_bytes(high_bytes);
        assert!(low < high);
    }

    #[test]
    fn test_serde_as_address() {
        let account = AccountId::from_bytes([0u8; 20]);
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, "\"rrrrrrrrrrrrrrrrrrrrrhoLvTp\"");

        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
        assert!(serde_json::from_str::<AccountId>("\"not-an-address\"").is_err());
    }
}
