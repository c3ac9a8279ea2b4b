//! JSON-RPC gateway to a ledger node
//!
//! Provides:
//! - Ledger queries (closed ledger index, ledgers, account info, fees, transactions)
//! - Submission of single- and multi-signed transactions
//! - Remote signing via `sign` and `sign_for`

pub mod client;
pub mod error;
pub mod types;

pub use client::{RpcClient, RpcConfig, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT_SECS};
pub use error::{RpcError, TransportError};
pub use types::{
    AccountInfoResult, AccountRoot, FeeDrops, FeeResult, LedgerClosedResult, LedgerInfo,
    LedgerResult, RpcRequest, SignResult, SubmitResult, TxResult, ACCEPTED_ENGINE_RESULTS,
};
