//! JSON-RPC request and response types
//!
//! A request is `{"method": <name>, "params": [<object>]}`; methods without
//! parameters send an empty array. Every response nests its payload under
//! `result`, which carries a `status` of `"success"` or `"error"`.

use crate::core::{AccountId, Amount, MultisignPayment, PaymentTx};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Engine results that count as an accepted submission
pub const ACCEPTED_ENGINE_RESULTS: [&str; 2] = ["tesSUCCESS", "terQUEUED"];

// =============================================================================
// Requests
// =============================================================================

/// Positional parameter list; at most one object per method
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params<T>(Vec<T>);

impl<T> Params<T> {
    pub fn one(param: T) -> Self {
        Self(vec![param])
    }
}

impl Params<()> {
    pub fn none() -> Self {
        Self(Vec::new())
    }
}

/// A request to the node, keyed by method name
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum RpcRequest {
    LedgerClosed(Params<()>),
    Ledger(Params<LedgerParams>),
    AccountInfo(Params<AccountInfoParams>),
    Fee(Params<()>),
    Tx(Params<TxParams>),
    Submit(Params<SubmitParams>),
    SubmitMultisigned(Params<SubmitMultisignedParams>),
    Sign(Params<SignParams>),
    SignFor(Params<SignForParams>),
}

impl RpcRequest {
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::LedgerClosed(_) => "ledger_closed",
            RpcRequest::Ledger(_) => "ledger",
            RpcRequest::AccountInfo(_) => "account_info",
            RpcRequest::Fee(_) => "fee",
            RpcRequest::Tx(_) => "tx",
            RpcRequest::Submit(_) => "submit",
            RpcRequest::SubmitMultisigned(_) => "submit_multisigned",
            RpcRequest::Sign(_) => "sign",
            RpcRequest::SignFor(_) => "sign_for",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerParams {
    pub ledger_index: u32,
    pub transactions: bool,
    pub expand: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccountInfoParams {
    pub account: AccountId,
    pub strict: bool,
    pub queue: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TxParams {
    pub transaction: String,
    pub binary: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitParams {
    pub tx_blob: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitMultisignedParams {
    pub tx_json: MultisignPayment,
}

#[derive(Clone, PartialEq, Serialize)]
pub struct SignParams {
    pub secret: String,
    pub tx_json: PaymentTx,
    pub offline: bool,
}

#[derive(Clone, PartialEq, Serialize)]
pub struct SignForParams {
    pub account: AccountId,
    pub secret: String,
    pub tx_json: MultisignPayment,
}

impl fmt::Debug for SignParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignParams")
            .field("secret", &"<redacted>")
            .field("tx_json", &self.tx_json)
            .field("offline", &self.offline)
            .finish()
    }
}

impl fmt::Debug for SignForParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignForParams")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .field("tx_json", &self.tx_json)
            .finish()
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Outer `{"result": ...}` wrapper
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope {
    pub result: Value,
}

/// Status fields present on every result
#[derive(Debug, Default, Deserialize)]
pub struct RpcStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RpcStatus {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Result of `ledger_closed`
#[derive(Clone, Debug, Deserialize)]
pub struct LedgerClosedResult {
    pub ledger_hash: String,
    #[serde(deserialize_with = "u32_from_number_or_string")]
    pub ledger_index: u32,
}

/// Result of `ledger`
#[derive(Clone, Debug, Deserialize)]
pub struct LedgerResult {
    pub ledger: LedgerInfo,
    #[serde(default)]
    pub ledger_hash: Option<String>,
    #[serde(default)]
    pub validated: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LedgerInfo {
    #[serde(deserialize_with = "u32_from_number_or_string")]
    pub ledger_index: u32,
    #[serde(default)]
    pub ledger_hash: Option<String>,
    #[serde(default)]
    pub parent_hash: Option<String>,
    #[serde(default)]
    pub close_time: Option<u64>,
    #[serde(default)]
    pub total_coins: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
    /// Expanded transactions with their metadata
    #[serde(default)]
    pub transactions: Vec<Value>,
}

/// Result of `account_info`
#[derive(Clone, Debug, Deserialize)]
pub struct AccountInfoResult {
    pub account_data: AccountRoot,
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub validated: Option<bool>,
}

/// On-ledger account state
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRoot {
    pub account: AccountId,
    pub balance: Amount,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub owner_count: u32,
    pub sequence: u32,
    #[serde(default, rename = "PreviousTxnID")]
    pub previous_txn_id: Option<String>,
}

/// Result of `fee`
#[derive(Clone, Debug, Deserialize)]
pub struct FeeResult {
    pub drops: FeeDrops,
    #[serde(default)]
    pub current_ledger_size: Option<String>,
    #[serde(default)]
    pub current_queue_size: Option<String>,
    #[serde(default)]
    pub expected_ledger_size: Option<String>,
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub max_queue_size: Option<String>,
}

/// Fee levels in drops, as decimal strings
#[derive(Clone, Debug, Deserialize)]
pub struct FeeDrops {
    pub base_fee: String,
    pub median_fee: String,
    pub minimum_fee: String,
    pub open_ledger_fee: String,
}

impl FeeResult {
    /// Fee needed to get into the open ledger
    pub fn open_ledger_fee(&self) -> Option<u64> {
        self.drops.open_ledger_fee.parse().ok()
    }

    pub fn base_fee(&self) -> Option<u64> {
        self.drops.base_fee.parse().ok()
    }
}

/// Result of `tx`
#[derive(Clone, Debug, Deserialize)]
pub struct TxResult {
    pub hash: String,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub meta: Option<Value>,
    /// Remaining transaction fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl TxResult {
    /// `TransactionResult` from the metadata, once the tx is in a ledger
    pub fn transaction_result(&self) -> Option<&str> {
        self.meta.as_ref()?.get("TransactionResult")?.as_str()
    }
}

/// Result of `submit` and `submit_multisigned`
#[derive(Clone, Debug, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_code: i32,
    #[serde(default)]
    pub engine_result_message: String,
    #[serde(default)]
    pub tx_blob: Option<String>,
    #[serde(default)]
    pub tx_json: Option<Value>,
    #[serde(default)]
    pub accepted: Option<bool>,
    #[serde(default)]
    pub queued: Option<bool>,
}

impl SubmitResult {
    pub fn is_accepted(&self) -> bool {
        ACCEPTED_ENGINE_RESULTS.contains(&self.engine_result.as_str())
    }

    /// Hash the node assigned to the submitted transaction
    pub fn hash(&self) -> Option<&str> {
        self.tx_json.as_ref()?.get("hash")?.as_str()
    }
}

/// Result of `sign` and `sign_for`
#[derive(Clone, Debug, Deserialize)]
pub struct SignResult {
    pub tx_blob: String,
    pub tx_json: Value,
}

impl SignResult {
    pub fn hash(&self) -> Option<&str> {
        self.tx_json.get("hash")?.as_str()
    }
}

fn u32_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
