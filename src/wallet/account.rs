//! Ledger accounts
//!
//! An `Account` couples an account id with the key pair that controls it.
//! Accounts are imported from a base58 family seed (`s...`) or generated
//! from fresh OS randomness.

use crate::core::{AccountId, Payment, TxError};
use crate::crypto::{decode_check, encode_check, KeyError, KeyPair, SEED_LEN, VERSION_FAMILY_SEED};
use crate::multisig::{
    append_signer, deserialize_raw_multisign_tx, sign_for, PermissivePolicy, SignerPolicy,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Account-related errors
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid secret: {0}")]
    InvalidSecret(#[source] KeyError),
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(#[source] KeyError),
}

/// Export form of a freshly generated account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    /// Base58 family seed; keep this secret
    pub seed: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("seed", &"<redacted>")
            .finish()
    }
}

/// A ledger account and its signing key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    account_id: AccountId,
    key_pair: KeyPair,
}

impl Account {
    pub fn from_key_pair(key_pair: KeyPair) -> Self {
        Self {
            account_id: AccountId::from_bytes(key_pair.account_id()),
            key_pair,
        }
    }

    /// Import an account from its base58 family seed
    pub fn import(secret: &str) -> Result<Self, AccountError> {
        let payload = decode_check(secret.trim(), VERSION_FAMILY_SEED, SEED_LEN)
            .map_err(AccountError::InvalidSecret)?;
        let mut seed = [0u8; SEED_LEN];
        seed.copy_from_slice(&payload);
        Self::from_seed(&seed)
    }

    /// Generate a new account from OS randomness
    pub fn generate() -> Result<(Self, Wallet), AccountError> {
        let mut seed = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut seed);

        let account = Self::from_seed(&seed)?;
        let wallet = Wallet {
            address: account.address(),
            seed: encode_check(VERSION_FAMILY_SEED, &seed),
        };
        log::info!("Generated account {}", wallet.address);
        Ok((account, wallet))
    }

    fn from_seed(seed: &[u8; SEED_LEN]) -> Result<Self, AccountError> {
        let key_pair =
            KeyPair::from_family_seed(seed).map_err(AccountError::KeyDerivationFailed)?;
        Ok(Self::from_key_pair(key_pair))
    }

    pub fn address(&self) -> String {
        self.account_id.to_address()
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Compressed public key, upper-case hex
    pub fn public_key_hex(&self) -> String {
        self.key_pair.public_key_hex()
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Single-sign a raw payment
    ///
    /// Returns the upper-case transaction hash and the lower-case hex of the
    /// signed transaction. The payment's account must be this account.
    pub fn sign_tx(&self, raw_hex: &str) -> Result<(String, String), TxError> {
        let payment = Payment::from_hex(raw_hex)?;
        if payment.account != self.account_id {
            return Err(TxError::AccountMismatch {
                expected: self.account_id,
                actual: payment.account,
            });
        }

        let signed = payment.sign(&self.key_pair)?;
        let hash = signed
            .transaction_hash()
            .map_err(TxError::SerializationFailed)?;
        log::debug!("Signed transaction {}", hex::encode_upper(hash));
        Ok((hex::encode_upper(hash), signed.to_hex()?))
    }

    /// Add this account's signer entry to a raw multisign payment
    pub fn multi_sign_tx(&self, raw_hex: &str) -> Result<Payment, TxError> {
        self.multi_sign_tx_with_policy(raw_hex, &PermissivePolicy)
    }

    /// Like `multi_sign_tx`, consulting `policy` before appending
    pub fn multi_sign_tx_with_policy(
        &self,
        raw_hex: &str,
        policy: &dyn SignerPolicy,
    ) -> Result<Payment, TxError> {
        let payment = deserialize_raw_multisign_tx(raw_hex)?;
        let signer = sign_for(&payment, &self.key_pair)?;
        append_signer(&payment, signer, policy)
    }
}
