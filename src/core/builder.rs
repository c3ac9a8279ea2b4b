//! Payment construction
//!
//! Pure helpers for building payments and their JSON descriptors. Nothing
//! here touches keys or the network.

use crate::core::address::AccountId;
use crate::core::amount::{Amount, AmountError};
use crate::core::descriptor::{MultisignPayment, PaymentTx};
use crate::core::transaction::{Memo, Payment, PaymentFlags};
use crate::crypto::KeyError;
use thiserror::Error;

/// Errors raised while building payment descriptors
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: KeyError,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_address(address: &str) -> Result<AccountId, BuildError> {
    address
        .parse()
        .map_err(|source| BuildError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Build a payment ready for serialization and signing
pub fn generate_payment(
    from: AccountId,
    to: AccountId,
    amount: Amount,
    fee: Amount,
    sequence: u32,
    memos: Vec<Memo>,
) -> Payment {
    let mut payment = Payment::new(from, to, amount);
    payment.fee = Some(fee);
    payment.sequence = Some(sequence);
    payment.memos = memos;
    payment
}

/// Minimal single-sign descriptor without fee or sequence
pub fn generate_payment_tx_json(from: &str, to: &str, amount: &str) -> Result<String, BuildError> {
    let tx = PaymentTx::new(parse_address(from)?, parse_address(to)?, amount.parse()?);
    Ok(serde_json::to_string(&tx)?)
}

/// Multisign-ready descriptor with an empty `SigningPubKey`
pub fn generate_multisign_payment_tx_json(
    from: &str,
    to: &str,
    amount: &str,
    fee: &str,
    sequence: u32,
) -> Result<String, BuildError> {
    let tx = MultisignPayment::new(
        parse_address(from)?,
        parse_address(to)?,
        amount.parse()?,
        fee.parse()?,
        sequence,
    );
    Ok(serde_json::to_string(&tx)?)
}

/// Fluent builder for payments with optional fields
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    payment: Payment,
}

impl PaymentBuilder {
    pub fn new(from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self {
            payment: Payment::new(from, to, amount),
        }
    }

    pub fn fee(mut self, fee: Amount) -> Self {
        self.payment.fee = Some(fee);
        self
    }

    pub fn sequence(mut self, sequence: u32) -> Self {
        self.payment.sequence = Some(sequence);
        self
    }

    /// Use a ticket instead of a sequence number
    pub fn ticket_sequence(mut self, ticket: u32) -> Self {
        self.payment.sequence = Some(0);
        self.payment.ticket_sequence = Some(ticket);
        self
    }

    pub fn flags(mut self, flags: PaymentFlags) -> Self {
        self.payment.flags = Some(flags.bits());
        self
    }

    pub fn network_id(mut self, network_id: u32) -> Self {
        self.payment.network_id = Some(network_id);
        self
    }

    pub fn source_tag(mut self, tag: u32) -> Self {
        self.payment.source_tag = Some(tag);
        self
    }

    pub fn destination_tag(mut self, tag: u32) -> Self {
        self.payment.destination_tag = Some(tag);
        self
    }

    /// Ledger index after which the payment can no longer be included
    pub fn last_ledger_sequence(mut self, ledger: u32) -> Self {
        self.payment.last_ledger_sequence = Some(ledger);
        self
    }

    pub fn invoice_id(mut self, invoice_id: [u8; 32]) -> Self {
        self.payment.invoice_id = Some(invoice_id);
        self
    }

    pub fn send_max(mut self, send_max: Amount) -> Self {
        self.payment.send_max = Some(send_max);
        self
    }

    pub fn deliver_min(mut self, deliver_min: Amount) -> Self {
        self.payment.deliver_min = Some(deliver_min);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.payment.memos.push(memo);
        self
    }

    pub fn build(self) -> Payment {
        self.payment
    }
}
