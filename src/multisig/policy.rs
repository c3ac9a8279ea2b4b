//! Signer admission policies
//!
//! The aggregator consults a `SignerPolicy` before appending a co-signer.
//! `PermissivePolicy` admits everyone, including repeated signers.
//! `SignerListPolicy` mirrors an on-ledger signer list: member accounts with
//! weights and a quorum. `MasterKeyPolicy` refuses keys other than the
//! signer account's own.

use crate::core::{AccountId, Payment, Signer, TxError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised while building a signer list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerListError {
    #[error("Invalid quorum: {0}")]
    InvalidQuorum(String),
    #[error("Signer list must contain at least one entry")]
    Empty,
    #[error("Duplicate signer list entry: {0}")]
    DuplicateEntry(AccountId),
    #[error("Signer weight must be at least 1: {0}")]
    ZeroWeight(AccountId),
}

/// Decides whether a signer may be appended to a payment
pub trait SignerPolicy: Send + Sync {
    /// `Err(TxError::PolicyRejected)` when `signer` must not be appended
    fn check(&self, payment: &Payment, signer: &Signer) -> Result<(), TxError>;
}

/// Admits every signer
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissivePolicy;

impl SignerPolicy for PermissivePolicy {
    fn check(&self, _payment: &Payment, _signer: &Signer) -> Result<(), TxError> {
        Ok(())
    }
}

/// Admits only signers whose public key hashes to their account
///
/// Rejects regular-key signatures, which the ledger itself would accept.
#[derive(Clone, Copy, Debug, Default)]
pub struct MasterKeyPolicy;

impl SignerPolicy for MasterKeyPolicy {
    fn check(&self, _payment: &Payment, signer: &Signer) -> Result<(), TxError> {
        let owner = AccountId::from_public_key(&signer.signing_pub_key);
        if owner != signer.account {
            return Err(TxError::PolicyRejected(format!(
                "public key belongs to {}, not {}",
                owner, signer.account
            )));
        }
        Ok(())
    }
}

/// Weighted signer list with a quorum
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerListPolicy {
    weights: HashMap<AccountId, u16>,
    quorum: u32,
    reject_duplicates: bool,
}

impl SignerListPolicy {
    /// Build a signer list
    ///
    /// # Errors
    /// Fails on an empty list, a repeated account, a zero weight, or a quorum
    /// of zero or above the total weight.
    pub fn new(quorum: u32, entries: &[(AccountId, u16)]) -> Result<Self, SignerListError> {
        if entries.is_empty() {
            return Err(SignerListError::Empty);
        }
        if quorum == 0 {
            return Err(SignerListError::InvalidQuorum(
                "quorum must be at least 1".to_string(),
            ));
        }

        let mut weights = HashMap::with_capacity(entries.len());
        for (account, weight) in entries {
            if *weight == 0 {
                return Err(SignerListError::ZeroWeight(*account));
            }
            if weights.insert(*account, *weight).is_some() {
                return Err(SignerListError::DuplicateEntry(*account));
            }
        }

        let total: u32 = weights.values().map(|w| u32::from(*w)).sum();
        if quorum > total {
            return Err(SignerListError::InvalidQuorum(format!(
                "quorum {} exceeds total weight {}",
                quorum, total
            )));
        }

        Ok(Self {
            weights,
            quorum,
            reject_duplicates: false,
        })
    }

    /// Also reject a signer already present on the payment
    pub fn reject_duplicates(mut self, reject: bool) -> Self {
        self.reject_duplicates = reject;
        self
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    pub fn weight(&self, account: &AccountId) -> Option<u16> {
        self.weights.get(account).copied()
    }

    /// Summed weight of the distinct member accounts that signed
    pub fn signed_weight(&self, payment: &Payment) -> u32 {
        let signed: HashSet<&AccountId> = payment.signers.iter().map(|s| &s.account).collect();
        signed
            .into_iter()
            .filter_map(|account| self.weight(account))
            .map(u32::from)
            .sum()
    }

    pub fn quorum_reached(&self, payment: &Payment) -> bool {
        self.signed_weight(payment) >= self.quorum
    }
}

impl SignerPolicy for SignerListPolicy {
    fn check(&self, payment: &Payment, signer: &Signer) -> Result<(), TxError> {
        if self.weight(&signer.account).is_none() {
            return Err(TxError::PolicyRejected(format!(
                "{} is not on the signer list",
                signer.account
            )));
        }
        if self.reject_duplicates && payment.signers.iter().any(|s| s.account == signer.account) {
            return Err(TxError::PolicyRejected(format!(
                "{} has already signed",
                signer.account
            )));
        }
        Ok(())
    }
}
