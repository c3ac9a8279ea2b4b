//! Multisign aggregation
//!
//! Co-signers pass a hex-encoded payment between processes. Each one
//! deserializes it, appends its own `Signer`, and re-serializes. The final
//! holder can verify every contribution and merge parallel copies before
//! submitting.

use super::policy::SignerPolicy;
use crate::core::{AccountId, Payment, Signer, TxError};
use crate::crypto::{verify_signature, KeyPair};

/// Decode a raw payment and prepare it for multi-signing
///
/// The signing public key is cleared and any direct signature dropped, so
/// the multisign hash of the result matches what every co-signer signs.
pub fn deserialize_raw_multisign_tx(raw_hex: &str) -> Result<Payment, TxError> {
    let payment = Payment::from_hex(raw_hex)?;
    Ok(payment.prepare_for_multisign())
}

/// Produce `key`'s signer entry for `payment`
pub fn sign_for(payment: &Payment, key: &KeyPair) -> Result<Signer, TxError> {
    let account = AccountId::from_bytes(key.account_id());
    let digest = payment
        .multisign_hash(&account)
        .map_err(TxError::SerializationFailed)?;

    log::debug!("Signing multisign hash for {}", account);
    Ok(Signer {
        account,
        signing_pub_key: key.public_key_bytes().to_vec(),
        txn_signature: key.sign(&digest)?,
    })
}

/// Verify that `signer` is a valid contribution to `payment`
///
/// Only the signature is checked, against the multisign hash scoped to
/// `signer.account`. The key may be the account's regular key, so it is not
/// required to hash to that account; `MasterKeyPolicy` enforces that.
pub fn verify_signer(payment: &Payment, signer: &Signer) -> Result<(), TxError> {
    let digest = payment
        .multisign_hash(&signer.account)
        .map_err(TxError::SerializationFailed)?;

    match verify_signature(&signer.signing_pub_key, &digest, &signer.txn_signature) {
        Ok(true) => Ok(()),
        Ok(false) => Err(TxError::VerificationFailed(format!(
            "signature does not match for {}",
            signer.account
        ))),
        Err(e) => Err(TxError::VerificationFailed(e.to_string())),
    }
}

/// Verify one co-signer's contribution to a raw payment
///
/// Malformed input fails with `MalformedHex` or `DeserializationFailed`; a
/// well-formed transaction with a bad key or signature fails with
/// `VerificationFailed`.
pub fn check_multisign(
    raw_hex: &str,
    signer: &AccountId,
    public_key: &[u8],
    signature: &[u8],
) -> Result<(), TxError> {
    let payment = deserialize_raw_multisign_tx(raw_hex)?;
    verify_signer(
        &payment,
        &Signer {
            account: *signer,
            signing_pub_key: public_key.to_vec(),
            txn_signature: signature.to_vec(),
        },
    )
}

/// Append `signer` after the policy admits it
///
/// The input is left untouched; the returned payment carries every previous
/// signer followed by the new one.
pub fn append_signer(
    payment: &Payment,
    signer: Signer,
    policy: &dyn SignerPolicy,
) -> Result<Payment, TxError> {
    policy.check(payment, &signer)?;
    log::debug!(
        "Appending signer {} ({} already present)",
        signer.account,
        payment.signers.len()
    );
    payment.with_signer(signer)
}

/// Merge co-signer copies of one payment
///
/// Every copy must carry the same transaction apart from its signers. The
/// merged signers are verified, exact repeats collapsed, and the result
/// ordered by account id as the ledger requires for submission. Two
/// different entries for one account make the copies `Incompatible`.
pub fn combine_signatures(payments: &[Payment]) -> Result<Payment, TxError> {
    let (first, rest) = payments
        .split_first()
        .ok_or_else(|| TxError::Incompatible("no transactions to combine".to_string()))?;

    let base = unsigned_copy(first);
    let mut signers: Vec<Signer> = Vec::new();

    for (index, payment) in payments.iter().enumerate() {
        if index > 0 && unsigned_copy(payment) != base {
            return Err(TxError::Incompatible(format!(
                "transaction {} differs from the first",
                index
            )));
        }
        for signer in &payment.signers {
            match signers.iter().find(|s| s.account == signer.account) {
                Some(existing) if existing == signer => {}
                Some(_) => {
                    return Err(TxError::Incompatible(format!(
                        "conflicting signer entries for {}",
                        signer.account
                    )));
                }
                None => {
                    verify_signer(&base, signer)?;
                    signers.push(signer.clone());
                }
            }
        }
    }

    signers.sort_by(|a, b| a.account.cmp(&b.account));
    log::debug!(
        "Combined {} signers from {} transactions",
        signers.len(),
        rest.len() + 1
    );

    let mut combined = base;
    combined.signers = signers;
    combined.hash = Some(
        combined
            .transaction_hash()
            .map_err(TxError::SerializationFailed)?,
    );
    Ok(combined)
}

fn unsigned_copy(payment: &Payment) -> Payment {
    let mut copy = payment.prepare_for_multisign();
    copy.signers.clear();
    copy.hash = None;
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Amount, Memo};
    use crate::multisig::{PermissivePolicy, SignerListPolicy};

    fn key(fill: u8) -> KeyPair {
        KeyPair::from_family_seed(&[fill; 16]).unwrap()
    }

    fn raw_payment() -> String {
        let mut payment = Payment::new(
            "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9".parse().unwrap(),
            "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF".parse().unwrap(),
            Amount::Native(1_000_000),
        );
        payment.fee = Some(Amount::Native(30));
        payment.sequence = Some(11);
        payment.memos.push(Memo::new(b"polyhash", b"deadbeef"));
        payment.to_hex().unwrap()
    }

    #[test]
    fn test_deserialize_prepares_for_multisign() {
        let mut payment = Payment::from_hex(&raw_payment()).unwrap();
        payment.signing_pub_key = Some(vec![0x02; 33]);
        payment.txn_signature = Some(vec![0x30, 0x00]);

        let prepared = deserialize_raw_multisign_tx(&payment.to_hex().unwrap()).unwrap();
        assert_eq!(prepared.signing_pub_key, Some(Vec::new()));
        assert!(prepared.txn_signature.is_none());
    }

    #[test]
    fn test_check_multisign_accepts_valid_signer() {
        let raw = raw_payment();
        let payment = deserialize_raw_multisign_tx(&raw).unwrap();
        let signer = sign_for(&payment, &key(1)).unwrap();

        check_multisign(
            &raw,
            &signer.account,
            &signer.signing_pub_key,
            &signer.txn_signature,
        )
        .unwrap();
    }

    #[test]
    fn test_check_multisign_accepts_regular_key() {
        let raw = raw_payment();
        let payment = deserialize_raw_multisign_tx(&raw).unwrap();
        let listed = AccountId::from_bytes(key(1).account_id());

        // key(2) acts as the regular key of the listed account
        let regular = key(2);
        let digest = payment.multisign_hash(&listed).unwrap();
        let signature = regular.sign(&digest).unwrap();

        check_multisign(&raw, &listed, &regular.public_key_bytes(), &signature).unwrap();
    }

    #[test]
    fn test_check_multisign_rejects_mutated_signature() {
        let raw = raw_payment();
        let payment = deserialize_raw_multisign_tx(&raw).unwrap();
        let signer = sign_for(&payment, &key(1)).unwrap();

        let mut signature = signer.txn_signature.clone();
        let last = signature.len() - 1;
        signature[last] ^= 0x01;

        let result = check_multisign(&raw, &signer.account, &signer.signing_pub_key, &signature);
        assert!(matches!(result, Err(TxError::VerificationFailed(_))));
    }

    #[test]
    fn test_check_multisign_rejects_wrong_signer_account() {
        let raw = raw_payment();
        let payment = deserialize_raw_multisign_tx(&raw).unwrap();
        let signer = sign_for(&payment, &key(1)).unwrap();
        let other = AccountId::from_bytes(key(2).account_id());

        let result = check_multisign(&raw, &other, &signer.signing_pub_key, &signer.txn_signature);
        assert!(matches!(result, Err(TxError::VerificationFailed(_))));
    }

    #[test]
    fn test_malformed_input_is_distinct_from_bad_signature() {
        let signer = AccountId::default();
        assert!(matches!(
            check_multisign("not hex", &signer, &[0x02; 33], &[0x30]),
            Err(TxError::MalformedHex(_))
        ));
        assert!(matches!(
            check_multisign("1200", &signer, &[0x02; 33], &[0x30]),
            Err(TxError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn test_multisign_signature_is_not_a_single_signature() {
        let raw = raw_payment();
        let payment = deserialize_raw_multisign_tx(&raw).unwrap();
        let signer = sign_for(&payment, &key(1)).unwrap();

        let single_digest = payment.signing_hash().unwrap();
        assert!(!key(1)
            .verify(&single_digest, &signer.txn_signature)
            .unwrap());
    }

    #[test]
    fn test_append_signer_preserves_order_and_input() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let first = sign_for(&payment, &key(1)).unwrap();
        let second = sign_for(&payment, &key(2)).unwrap();

        let one = append_signer(&payment, first.clone(), &PermissivePolicy).unwrap();
        let two = append_signer(&one, second.clone(), &PermissivePolicy).unwrap();

        assert!(payment.signers.is_empty());
        assert_eq!(one.signers, vec![first.clone()]);
        assert_eq!(two.signers, vec![first, second]);

        // Reserialized payment still verifies for each signer
        let raw = two.to_hex().unwrap();
        for signer in &two.signers {
            check_multisign(&raw, &signer.account, &signer.signing_pub_key, &signer.txn_signature)
                .unwrap();
        }
    }

    #[test]
    fn test_append_signer_allows_duplicates_by_default() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let signer = sign_for(&payment, &key(1)).unwrap();

        let once = append_signer(&payment, signer.clone(), &PermissivePolicy).unwrap();
        let twice = append_signer(&once, signer, &PermissivePolicy).unwrap();
        assert_eq!(twice.signers.len(), 2);
    }

    #[test]
    fn test_append_signer_policy_rejection() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let member = AccountId::from_bytes(key(1).account_id());
        let policy = SignerListPolicy::new(1, &[(member, 1)]).unwrap();

        let outsider = sign_for(&payment, &key(2)).unwrap();
        assert!(matches!(
            append_signer(&payment, outsider, &policy),
            Err(TxError::PolicyRejected(_))
        ));
    }

    #[test]
    fn test_combine_signatures_sorts_and_merges() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let copies: Vec<Payment> = (1..=3)
            .map(|fill| {
                let signer = sign_for(&payment, &key(fill)).unwrap();
                append_signer(&payment, signer, &PermissivePolicy).unwrap()
            })
            .collect();

        let combined = combine_signatures(&copies).unwrap();
        assert_eq!(combined.signers.len(), 3);
        assert!(combined
            .signers
            .windows(2)
            .all(|pair| pair[0].account < pair[1].account));
        assert_eq!(combined.hash, Some(combined.transaction_hash().unwrap()));
    }

    #[test]
    fn test_combine_collapses_repeated_entries() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let a = append_signer(&payment, sign_for(&payment, &key(1)).unwrap(), &PermissivePolicy)
            .unwrap();
        let ab = append_signer(&a, sign_for(&payment, &key(2)).unwrap(), &PermissivePolicy)
            .unwrap();

        let combined = combine_signatures(&[a, ab]).unwrap();
        assert_eq!(combined.signers.len(), 2);
    }

    #[test]
    fn test_combine_rejects_mismatched_transactions() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let mut other = payment.clone();
        other.sequence = Some(12);

        assert!(matches!(
            combine_signatures(&[payment, other]),
            Err(TxError::Incompatible(_))
        ));
        assert!(matches!(
            combine_signatures(&[]),
            Err(TxError::Incompatible(_))
        ));
    }

    #[test]
    fn test_combine_rejects_conflicting_entries() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let listed = AccountId::from_bytes(key(1).account_id());
        let master = sign_for(&payment, &key(1)).unwrap();

        let regular = key(2);
        let digest = payment.multisign_hash(&listed).unwrap();
        let other = Signer {
            account: listed,
            signing_pub_key: regular.public_key_bytes().to_vec(),
            txn_signature: regular.sign(&digest).unwrap(),
        };

        let a = payment.with_signer(master).unwrap();
        let b = payment.with_signer(other).unwrap();
        assert!(matches!(
            combine_signatures(&[a, b]),
            Err(TxError::Incompatible(_))
        ));
    }

    #[test]
    fn test_combine_rejects_forged_signer() {
        let payment = deserialize_raw_multisign_tx(&raw_payment()).unwrap();
        let mut forged = sign_for(&payment, &key(1)).unwrap();
        forged.txn_signature = sign_for(&payment, &key(2)).unwrap().txn_signature;

        let copy = payment.with_signer(forged).unwrap();
        assert!(matches!(
            combine_signatures(&[copy]),
            Err(TxError::VerificationFailed(_))
        ));
    }
}
