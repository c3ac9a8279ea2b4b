//! Payment transactions
//!
//! `Payment` is the canonical in-memory form of a payment transaction. It
//! serializes to the ledger's binary encoding and computes the three hashes
//! the protocol needs:
//! - transaction id: `SHA512Half("TXN\0" || all fields)`
//! - single-sign hash: `SHA512Half("STX\0" || signing fields)`
//! - multi-sign hash: `SHA512Half("SMT\0" || signing fields || signer id)`,
//!   always computed with an empty `SigningPubKey`

use crate::core::address::AccountId;
use crate::core::amount::Amount;
use crate::core::codec::*;
use crate::crypto::{
    sha512_half, KeyError, KeyPair, HASH_PREFIX_TRANSACTION_ID, HASH_PREFIX_TX_MULTI_SIGN,
    HASH_PREFIX_TX_SIGN,
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction-related errors
#[derive(Error, Debug)]
pub enum TxError {
    #[error("Malformed transaction hex: {0}")]
    MalformedHex(#[from] hex::FromHexError),
    #[error("Transaction deserialization failed: {0}")]
    DeserializationFailed(#[source] CodecError),
    #[error("Transaction serialization failed: {0}")]
    SerializationFailed(#[source] CodecError),
    #[error("Transaction account {actual} does not match signing account {expected}")]
    AccountMismatch {
        expected: AccountId,
        actual: AccountId,
    },
    #[error("Signing failed: {0}")]
    SigningFailed(#[from] KeyError),
    #[error("Multisign verification failed: {0}")]
    VerificationFailed(String),
    #[error("Signer rejected by policy: {0}")]
    PolicyRejected(String),
    #[error("Transactions cannot be combined: {0}")]
    Incompatible(String),
}

// =============================================================================
// Transaction type and flags
// =============================================================================

/// Transaction type tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    Payment,
}

impl TransactionType {
    pub const fn code(self) -> u16 {
        match self {
            TransactionType::Payment => 0,
        }
    }
}

bitflags! {
    /// Flags understood by payment transactions
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PaymentFlags: u32 {
        const NO_DIRECT_RIPPLE = 0x0001_0000;
        const PARTIAL_PAYMENT = 0x0002_0000;
        const LIMIT_QUALITY = 0x0004_0000;
        const FULLY_CANONICAL_SIG = 0x8000_0000;
    }
}

/// Which fields a serialization covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldSelection {
    All,
    Signing,
    MultiSigning,
}

impl FieldSelection {
    fn covers(self, field: FieldId) -> bool {
        self == FieldSelection::All || field.is_signing_field()
    }
}

// =============================================================================
// Memo and Signer
// =============================================================================

/// Arbitrary data attached to a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memo {
    pub memo_type: Option<Vec<u8>>,
    pub memo_data: Option<Vec<u8>>,
    pub memo_format: Option<Vec<u8>>,
}

impl Memo {
    pub fn new(memo_type: &[u8], memo_data: &[u8]) -> Self {
        Self {
            memo_type: Some(memo_type.to_vec()),
            memo_data: Some(memo_data.to_vec()),
            memo_format: None,
        }
    }

    fn write_fields(&self, writer: &mut BinaryWriter) -> Result<(), CodecError> {
        write_blob_field(writer, MEMO_TYPE, self.memo_type.as_deref())?;
        write_blob_field(writer, MEMO_DATA, self.memo_data.as_deref())?;
        write_blob_field(writer, MEMO_FORMAT, self.memo_format.as_deref())
    }

    fn read_fields(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let mut memo = Memo::default();
        read_object(reader, |field, reader| {
            match field {
                MEMO_TYPE => memo.memo_type = Some(reader.read_vl()?),
                MEMO_DATA => memo.memo_data = Some(reader.read_vl()?),
                MEMO_FORMAT => memo.memo_format = Some(reader.read_vl()?),
                other => return Err(unsupported(other)),
            }
            Ok(())
        })?;
        Ok(memo)
    }
}

/// One co-signer's contribution to a multi-signed transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signer {
    pub account: AccountId,
    pub signing_pub_key: Vec<u8>,
    pub txn_signature: Vec<u8>,
}

impl Signer {
    fn write_fields(&self, writer: &mut BinaryWriter) -> Result<(), CodecError> {
        write_blob_field(writer, SIGNING_PUB_KEY, Some(&self.signing_pub_key))?;
        write_blob_field(writer, TXN_SIGNATURE, Some(&self.txn_signature))?;
        write_account_field(writer, ACCOUNT, &self.account)
    }

    fn read_fields(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let mut account = None;
        let mut signing_pub_key = None;
        let mut txn_signature = None;
        read_object(reader, |field, reader| {
            match field {
                SIGNING_PUB_KEY => signing_pub_key = Some(reader.read_vl()?),
                TXN_SIGNATURE => txn_signature = Some(reader.read_vl()?),
                ACCOUNT => account = Some(read_account(reader)?),
                other => return Err(unsupported(other)),
            }
            Ok(())
        })?;

        Ok(Self {
            account: account.ok_or(CodecError::MissingField("Signer.Account"))?,
            signing_pub_key: signing_pub_key
                .ok_or(CodecError::MissingField("Signer.SigningPubKey"))?,
            txn_signature: txn_signature.ok_or(CodecError::MissingField("Signer.TxnSignature"))?,
        })
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment transaction in canonical form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub account: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
    pub fee: Option<Amount>,
    pub sequence: Option<u32>,
    pub flags: Option<u32>,
    pub network_id: Option<u32>,
    pub source_tag: Option<u32>,
    pub destination_tag: Option<u32>,
    pub last_ledger_sequence: Option<u32>,
    pub ticket_sequence: Option<u32>,
    pub invoice_id: Option<[u8; 32]>,
    pub send_max: Option<Amount>,
    pub deliver_min: Option<Amount>,
    /// Empty for multi-signed transactions
    pub signing_pub_key: Option<Vec<u8>>,
    pub txn_signature: Option<Vec<u8>>,
    pub memos: Vec<Memo>,
    pub signers: Vec<Signer>,
    /// Transaction id, filled in by signing
    pub hash: Option<[u8; 32]>,
}

impl Payment {
    /// An unsigned payment with only the required fields set
    pub fn new(account: AccountId, destination: AccountId, amount: Amount) -> Self {
        Self {
            account,
            destination,
            amount,
            fee: None,
            sequence: None,
            flags: None,
            network_id: None,
            source_tag: None,
            destination_tag: None,
            last_ledger_sequence: None,
            ticket_sequence: None,
            invoice_id: None,
            send_max: None,
            deliver_min: None,
            signing_pub_key: None,
            txn_signature: None,
            memos: Vec::new(),
            signers: Vec::new(),
            hash: None,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        TransactionType::Payment
    }

    /// Known flags set on this payment; unknown bits are kept
    pub fn payment_flags(&self) -> PaymentFlags {
        PaymentFlags::from_bits_retain(self.flags.unwrap_or(0))
    }

    /// Upper-case hex transaction id, if computed
    pub fn hash_hex(&self) -> Option<String> {
        self.hash.map(hex::encode_upper)
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Full canonical binary encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        self.serialize(FieldSelection::All)
    }

    /// Lower-case hex of the full binary encoding
    pub fn to_hex(&self) -> Result<String, TxError> {
        self.to_bytes()
            .map(hex::encode)
            .map_err(TxError::SerializationFailed)
    }

    /// Parse a hex-encoded binary payment
    pub fn from_hex(raw_hex: &str) -> Result<Self, TxError> {
        let bytes = hex::decode(raw_hex.trim())?;
        Self::from_bytes(&bytes).map_err(TxError::DeserializationFailed)
    }

    fn serialize(&self, selection: FieldSelection) -> Result<Vec<u8>, CodecError> {
        let mut writer = BinaryWriter::new();

        writer.write_field_id(TRANSACTION_TYPE);
        writer.write_u16(self.transaction_type().code());

        write_u32_field(&mut writer, NETWORK_ID, self.network_id);
        write_u32_field(&mut writer, FLAGS, self.flags);
        write_u32_field(&mut writer, SOURCE_TAG, self.source_tag);
        write_u32_field(&mut writer, SEQUENCE, self.sequence);
        write_u32_field(&mut writer, DESTINATION_TAG, self.destination_tag);
        write_u32_field(&mut writer, LAST_LEDGER_SEQUENCE, self.last_ledger_sequence);
        write_u32_field(&mut writer, TICKET_SEQUENCE, self.ticket_sequence);

        if let Some(invoice_id) = &self.invoice_id {
            writer.write_field_id(INVOICE_ID);
            writer.write_bytes(invoice_id);
        }

        write_amount_field(&mut writer, AMOUNT, Some(&self.amount))?;
        write_amount_field(&mut writer, FEE, self.fee.as_ref())?;
        write_amount_field(&mut writer, SEND_MAX, self.send_max.as_ref())?;
        write_amount_field(&mut writer, DELIVER_MIN, self.deliver_min.as_ref())?;

        match selection {
            FieldSelection::MultiSigning => {
                write_blob_field(&mut writer, SIGNING_PUB_KEY, Some(&[][..]))?;
            }
            _ => write_blob_field(&mut writer, SIGNING_PUB_KEY, self.signing_pub_key.as_deref())?,
        }
        if selection.covers(TXN_SIGNATURE) {
            write_blob_field(&mut writer, TXN_SIGNATURE, self.txn_signature.as_deref())?;
        }

        write_account_field(&mut writer, ACCOUNT, &self.account)?;
        write_account_field(&mut writer, DESTINATION, &self.destination)?;

        if selection.covers(SIGNERS) && !self.signers.is_empty() {
            writer.write_field_id(SIGNERS);
            for signer in &self.signers {
                writer.write_field_id(SIGNER);
                signer.write_fields(&mut writer)?;
                writer.write_field_id(OBJECT_END);
            }
            writer.write_field_id(ARRAY_END);
        }

        if !self.memos.is_empty() {
            writer.write_field_id(MEMOS);
            for memo in &self.memos {
                writer.write_field_id(MEMO);
                memo.write_fields(&mut writer)?;
                writer.write_field_id(OBJECT_END);
            }
            writer.write_field_id(ARRAY_END);
        }

        Ok(writer.into_bytes())
    }

    /// Decode a binary payment
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BinaryReader::new(bytes);

        let mut tx_type = None;
        let mut account = None;
        let mut destination = None;
        let mut amount = None;
        let mut payment = Payment::new(
            AccountId::default(),
            AccountId::default(),
            Amount::Native(0),
        );

        let mut previous: Option<FieldId> = None;
        while !reader.is_empty() {
            let field = reader.read_field_id()?;
            check_order(&mut previous, field)?;

            match field {
                TRANSACTION_TYPE => tx_type = Some(reader.read_u16()?),
                NETWORK_ID => payment.network_id = Some(reader.read_u32()?),
                FLAGS => payment.flags = Some(reader.read_u32()?),
                SOURCE_TAG => payment.source_tag = Some(reader.read_u32()?),
                SEQUENCE => payment.sequence = Some(reader.read_u32()?),
                DESTINATION_TAG => payment.destination_tag = Some(reader.read_u32()?),
                LAST_LEDGER_SEQUENCE => payment.last_ledger_sequence = Some(reader.read_u32()?),
                TICKET_SEQUENCE => payment.ticket_sequence = Some(reader.read_u32()?),
                INVOICE_ID => payment.invoice_id = Some(reader.read_array::<32>()?),
                AMOUNT => amount = Some(Amount::read_from(&mut reader)?),
                FEE => payment.fee = Some(Amount::read_from(&mut reader)?),
                SEND_MAX => payment.send_max = Some(Amount::read_from(&mut reader)?),
                DELIVER_MIN => payment.deliver_min = Some(Amount::read_from(&mut reader)?),
                SIGNING_PUB_KEY => payment.signing_pub_key = Some(reader.read_vl()?),
                TXN_SIGNATURE => payment.txn_signature = Some(reader.read_vl()?),
                ACCOUNT => account = Some(read_account(&mut reader)?),
                DESTINATION => destination = Some(read_account(&mut reader)?),
                SIGNERS => payment.signers = read_array(&mut reader, SIGNER, Signer::read_fields)?,
                MEMOS => payment.memos = read_array(&mut reader, MEMO, Memo::read_fields)?,
                other => return Err(unsupported(other)),
            }
        }

        let tx_type = tx_type.ok_or(CodecError::MissingField("TransactionType"))?;
        if tx_type != TransactionType::Payment.code() {
            return Err(CodecError::NotAPayment(tx_type));
        }

        payment.account = account.ok_or(CodecError::MissingField("Account"))?;
        payment.destination = destination.ok_or(CodecError::MissingField("Destination"))?;
        payment.amount = amount.ok_or(CodecError::MissingField("Amount"))?;
        Ok(payment)
    }

    // -------------------------------------------------------------------------
    // Hashing
    // -------------------------------------------------------------------------

    /// Transaction id over the full encoding
    pub fn transaction_hash(&self) -> Result<[u8; 32], CodecError> {
        let bytes = self.to_bytes()?;
        Ok(sha512_half(&[&HASH_PREFIX_TRANSACTION_ID, &bytes]))
    }

    /// Digest signed by a single signer
    pub fn signing_hash(&self) -> Result<[u8; 32], CodecError> {
        let bytes = self.serialize(FieldSelection::Signing)?;
        Ok(sha512_half(&[&HASH_PREFIX_TX_SIGN, &bytes]))
    }

    /// Digest signed by co-signer `signer`
    ///
    /// The signing public key is always hashed as empty and the signer's
    /// account id is appended, so a multisign signature never verifies as a
    /// single-sign one.
    pub fn multisign_hash(&self, signer: &AccountId) -> Result<[u8; 32], CodecError> {
        let bytes = self.serialize(FieldSelection::MultiSigning)?;
        Ok(sha512_half(&[
            &HASH_PREFIX_TX_MULTI_SIGN,
            &bytes,
            signer.as_bytes(),
        ]))
    }

    // -------------------------------------------------------------------------
    // Signing
    // -------------------------------------------------------------------------

    /// Single-sign with `key`, returning the signed copy with its hash filled in
    pub fn sign(&self, key: &KeyPair) -> Result<Payment, TxError> {
        let mut signed = self.clone();
        signed.signing_pub_key = Some(key.public_key_bytes().to_vec());
        signed.txn_signature = None;

        let digest = signed
            .signing_hash()
            .map_err(TxError::SerializationFailed)?;
        signed.txn_signature = Some(key.sign(&digest)?);
        signed.hash = Some(
            signed
                .transaction_hash()
                .map_err(TxError::SerializationFailed)?,
        );
        Ok(signed)
    }

    /// Copy normalized for multi-signing: empty signing key, no direct signature
    pub fn prepare_for_multisign(&self) -> Payment {
        let mut prepared = self.clone();
        prepared.signing_pub_key = Some(Vec::new());
        prepared.txn_signature = None;
        prepared
    }

    /// Copy with `signer` appended and the hash recomputed
    pub fn with_signer(&self, signer: Signer) -> Result<Payment, TxError> {
        let mut next = self.prepare_for_multisign();
        next.signers.push(signer);
        next.hash = Some(next.transaction_hash().map_err(TxError::SerializationFailed)?);
        Ok(next)
    }
}

// =============================================================================
// Field helpers
// =============================================================================

fn unsupported(field: FieldId) -> CodecError {
    CodecError::UnsupportedField {
        type_code: field.type_code,
        field_code: field.field_code,
    }
}

fn check_order(previous: &mut Option<FieldId>, field: FieldId) -> Result<(), CodecError> {
    if let Some(prev) = *previous {
        if field <= prev {
            return Err(CodecError::NonCanonicalOrder {
                type_code: field.type_code,
                field_code: field.field_code,
            });
        }
    }
    *previous = Some(field);
    Ok(())
}

fn write_u32_field(writer: &mut BinaryWriter, field: FieldId, value: Option<u32>) {
    if let Some(value) = value {
        writer.write_field_id(field);
        writer.write_u32(value);
    }
}

fn write_amount_field(
    writer: &mut BinaryWriter,
    field: FieldId,
    amount: Option<&Amount>,
) -> Result<(), CodecError> {
    if let Some(amount) = amount {
        writer.write_field_id(field);
        amount.write_to(writer)?;
    }
    Ok(())
}

fn write_blob_field(
    writer: &mut BinaryWriter,
    field: FieldId,
    blob: Option<&[u8]>,
) -> Result<(), CodecError> {
    if let Some(blob) = blob {
        writer.write_field_id(field);
        writer.write_vl(blob)?;
    }
    Ok(())
}

fn write_account_field(
    writer: &mut BinaryWriter,
    field: FieldId,
    account: &AccountId,
) -> Result<(), CodecError> {
    writer.write_field_id(field);
    writer.write_vl(account.as_bytes())
}

fn read_account(reader: &mut BinaryReader<'_>) -> Result<AccountId, CodecError> {
    let bytes = reader.read_vl()?;
    AccountId::from_slice(&bytes).ok_or(CodecError::InvalidAccountLength(bytes.len()))
}

/// Read inner-object fields up to the object end marker
fn read_object<F>(reader: &mut BinaryReader<'_>, mut on_field: F) -> Result<(), CodecError>
where
    F: FnMut(FieldId, &mut BinaryReader<'_>) -> Result<(), CodecError>,
{
    let mut previous = None;
    loop {
        let field = reader.read_field_id()?;
        if field == OBJECT_END {
            return Ok(());
        }
        check_order(&mut previous, field)?;
        on_field(field, reader)?;
    }
}

/// Read `wrapper` objects up to the array end marker
fn read_array<T, F>(
    reader: &mut BinaryReader<'_>,
    wrapper: FieldId,
    read_item: F,
) -> Result<Vec<T>, CodecError>
where
    F: Fn(&mut BinaryReader<'_>) -> Result<T, CodecError>,
{
    let mut items = Vec::new();
    loop {
        let field = reader.read_field_id()?;
        if field == ARRAY_END {
            return Ok(items);
        }
        if field != wrapper {
            return Err(unsupported(field));
        }
        items.push(read_item(reader)?);
    }
}
