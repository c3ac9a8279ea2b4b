//! Core ledger data model
//!
//! This module contains the building blocks shared by every component:
//! - Account ids and their base58 addresses
//! - Native and issued-currency amounts
//! - The canonical binary field codec
//! - Payments, signers and memos with their signing hashes
//! - JSON descriptors and payment builders

pub mod address;
pub mod amount;
pub mod builder;
pub mod codec;
pub mod descriptor;
pub mod transaction;

pub use address::{AccountId, ACCOUNT_ID_LEN};
pub use amount::{Amount, AmountError, Currency, IssuedAmount, IssuedValue, DROPS_PER_XRP, MAX_DROPS};
pub use builder::{
    generate_multisign_payment_tx_json, generate_payment, generate_payment_tx_json, BuildError,
    PaymentBuilder,
};
pub use codec::{BinaryReader, BinaryWriter, CodecError, FieldId};
pub use descriptor::{MemoEntry, MemoJson, MultisignPayment, PaymentTx, SignerEntry, SignerJson};
pub use transaction::{Memo, Payment, PaymentFlags, Signer, TransactionType, TxError};
