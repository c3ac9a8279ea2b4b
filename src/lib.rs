//! Ripple SDK: a client library for Ripple-style ledgers in Rust
//!
//! This crate provides:
//! - Account import and generation from family seeds (secp256k1)
//! - Payment construction, canonical binary encoding and signing
//! - Multi-signature aggregation with pluggable signer policies
//! - A JSON-RPC client for ledger queries, submission and remote signing
//!
//! # Example
//!
//! ```rust
//! use ripple_sdk::core::{generate_payment, Amount};
//! use ripple_sdk::multisig::check_multisign;
//! use ripple_sdk::wallet::Account;
//!
//! let account = Account::import("shtew2z1TRsEvpnYUGtiyvqPnYywt").unwrap();
//! assert_eq!(account.address(), "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF");
//!
//! // Build a payment from an account this key co-signs for
//! let payment = generate_payment(
//!     "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9".parse().unwrap(),
//!     account.account_id(),
//!     Amount::Native(1_000_000),
//!     Amount::Native(30),
//!     7,
//!     vec![],
//! );
//! let raw = payment.to_hex().unwrap();
//!
//! // Add a signer entry and verify it
//! let signed = account.multi_sign_tx(&raw).unwrap();
//! let signer = &signed.signers[0];
//! check_multisign(&raw, &signer.account, &signer.signing_pub_key, &signer.txn_signature).unwrap();
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod multisig;
pub mod rpc;
pub mod sdk;
pub mod wallet;

// Re-export commonly used types
pub use core::{
    AccountId, Amount, BuildError, MultisignPayment, Payment, PaymentBuilder, PaymentFlags,
    PaymentTx, Signer, TxError,
};
pub use crypto::KeyPair;
pub use multisig::{MasterKeyPolicy, PermissivePolicy, SignerListPolicy, SignerPolicy};
pub use rpc::{RpcClient, RpcConfig, RpcError};
pub use sdk::RippleSdk;
pub use wallet::{Account, AccountError, Wallet};
