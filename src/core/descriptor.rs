//! JSON transaction descriptors
//!
//! The human-readable forms exchanged with nodes (`sign`, `sign_for`,
//! `submit_multisigned`) and with co-signers for off-line signing. Field
//! names follow the ledger's PascalCase convention; blobs are upper-case hex.

use crate::core::address::AccountId;
use crate::core::amount::Amount;
use crate::core::codec::CodecError;
use crate::core::transaction::{Memo, Payment, Signer, TransactionType, TxError};
use serde::{Deserialize, Serialize};

/// Single-sign payment descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentTx {
    pub transaction_type: TransactionType,
    pub account: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl PaymentTx {
    pub fn new(account: AccountId, destination: AccountId, amount: Amount) -> Self {
        Self {
            transaction_type: TransactionType::Payment,
            account,
            destination,
            amount,
            fee: None,
            hash: None,
        }
    }
}

impl From<&Payment> for PaymentTx {
    fn from(payment: &Payment) -> Self {
        Self {
            transaction_type: payment.transaction_type(),
            account: payment.account,
            destination: payment.destination,
            amount: payment.amount.clone(),
            fee: payment.fee.clone(),
            hash: payment.hash_hex(),
        }
    }
}

/// Multi-sign payment descriptor
///
/// `SigningPubKey` is always present and empty until the transaction is
/// fully signed, which tells a remote signer to attach a `Signer` instead of
/// a direct signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultisignPayment {
    pub transaction_type: TransactionType,
    pub account: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_sequence: Option<u32>,
    #[serde(rename = "NetworkID", default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<u32>,
    #[serde(rename = "InvoiceID", default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_max: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_min: Option<Amount>,
    #[serde(default)]
    pub signing_pub_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signers: Vec<SignerEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memos: Vec<MemoEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl MultisignPayment {
    pub fn new(
        account: AccountId,
        destination: AccountId,
        amount: Amount,
        fee: Amount,
        sequence: u32,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Payment,
            account,
            destination,
            amount,
            fee: Some(fee),
            sequence,
            flags: None,
            source_tag: None,
            destination_tag: None,
            last_ledger_sequence: None,
            ticket_sequence: None,
            network_id: None,
            invoice_id: None,
            send_max: None,
            deliver_min: None,
            signing_pub_key: String::new(),
            signers: Vec::new(),
            memos: Vec::new(),
            hash: None,
        }
    }

    /// Convert a payment; the sequence number is required
    pub fn from_payment(payment: &Payment) -> Result<Self, TxError> {
        let sequence = payment
            .sequence
            .ok_or(TxError::SerializationFailed(CodecError::MissingField("Sequence")))?;

        Ok(Self {
            transaction_type: payment.transaction_type(),
            account: payment.account,
            destination: payment.destination,
            amount: payment.amount.clone(),
            fee: payment.fee.clone(),
            sequence,
            flags: payment.flags,
            source_tag: payment.source_tag,
            destination_tag: payment.destination_tag,
            last_ledger_sequence: payment.last_ledger_sequence,
            ticket_sequence: payment.ticket_sequence,
            network_id: payment.network_id,
            invoice_id: payment.invoice_id.map(hex::encode_upper),
            send_max: payment.send_max.clone(),
            deliver_min: payment.deliver_min.clone(),
            signing_pub_key: hex::encode_upper(payment.signing_pub_key.as_deref().unwrap_or(&[])),
            signers: payment.signers.iter().map(SignerEntry::from).collect(),
            memos: payment.memos.iter().map(MemoEntry::from).collect(),
            hash: payment.hash_hex(),
        })
    }

    /// Canonical payment carrying the same fields
    pub fn to_payment(&self) -> Result<Payment, TxError> {
        let mut payment = Payment::new(self.account, self.destination, self.amount.clone());
        payment.fee = self.fee.clone();
        payment.sequence = Some(self.sequence);
        payment.flags = self.flags;
        payment.source_tag = self.source_tag;
        payment.destination_tag = self.destination_tag;
        payment.last_ledger_sequence = self.last_ledger_sequence;
        payment.ticket_sequence = self.ticket_sequence;
        payment.network_id = self.network_id;
        payment.invoice_id = self
            .invoice_id
            .as_deref()
            .map(decode_hash256)
            .transpose()?;
        payment.send_max = self.send_max.clone();
        payment.deliver_min = self.deliver_min.clone();
        payment.signing_pub_key = Some(hex::decode(&self.signing_pub_key)?);
        payment.signers = self
            .signers
            .iter()
            .map(SignerEntry::to_signer)
            .collect::<Result<_, _>>()?;
        payment.memos = self
            .memos
            .iter()
            .map(MemoEntry::to_memo)
            .collect::<Result<_, _>>()?;
        Ok(payment)
    }
}

fn decode_hash256(text: &str) -> Result<[u8; 32], TxError> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(text, &mut bytes)?;
    Ok(bytes)
}

/// `{"Signer": {...}}` wrapper used by the `Signers` array
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    #[serde(rename = "Signer")]
    pub signer: SignerJson,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignerJson {
    pub account: AccountId,
    pub signing_pub_key: String,
    pub txn_signature: String,
}

impl From<&Signer> for SignerEntry {
    fn from(signer: &Signer) -> Self {
        Self {
            signer: SignerJson {
                account: signer.account,
                signing_pub_key: hex::encode_upper(&signer.signing_pub_key),
                txn_signature: hex::encode_upper(&signer.txn_signature),
            },
        }
    }
}

impl SignerEntry {
    pub fn to_signer(&self) -> Result<Signer, TxError> {
        Ok(Signer {
            account: self.signer.account,
            signing_pub_key: hex::decode(&self.signer.signing_pub_key)?,
            txn_signature: hex::decode(&self.signer.txn_signature)?,
        })
    }
}

/// `{"Memo": {...}}` wrapper used by the `Memos` array
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEntry {
    #[serde(rename = "Memo")]
    pub memo: MemoJson,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_format: Option<String>,
}

impl From<&Memo> for MemoEntry {
    fn from(memo: &Memo) -> Self {
        Self {
            memo: MemoJson {
                memo_type: memo.memo_type.as_ref().map(hex::encode_upper),
                memo_data: memo.memo_data.as_ref().map(hex::encode_upper),
                memo_format: memo.memo_format.as_ref().map(hex::encode_upper),
            },
        }
    }
}

impl MemoEntry {
    pub fn to_memo(&self) -> Result<Memo, TxError> {
        let decode = |field: &Option<String>| field.as_ref().map(hex::decode).transpose();
        Ok(Memo {
            memo_type: decode(&self.memo.memo_type)?,
            memo_data: decode(&self.memo.memo_data)?,
            memo_format: decode(&self.memo.memo_format)?,
        })
    }
}
