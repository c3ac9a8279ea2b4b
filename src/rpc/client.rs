//! JSON-RPC client for a ledger node
//!
//! Every call is a single HTTP POST on a shared connection pool. Responses
//! are decoded in two steps: the `result` status is checked first, then the
//! payload is parsed into the method's result type. Decode failures keep the
//! raw body for diagnosis.

use super::error::{RpcError, TransportError};
use super::types::*;
use crate::core::{AccountId, MultisignPayment, PaymentTx};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default idle connections kept per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 5;

/// RPC client configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RpcConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Client for a node's JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    address: String,
    http: Client,
}

impl RpcClient {
    /// Build a client with its own connection pool
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            address: config.url,
            http,
        })
    }

    /// Use an existing `reqwest::Client`
    pub fn with_http_client(address: impl Into<String>, http: Client) -> Self {
        Self {
            address: address.into(),
            http,
        }
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> &mut Self {
        self.address = address.into();
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Index of the most recently closed ledger
    pub async fn get_current_height(&self) -> Result<u32, RpcError> {
        let result: LedgerClosedResult = self
            .call(RpcRequest::LedgerClosed(Params::none()))
            .await?;
        Ok(result.ledger_index)
    }

    /// Ledger at `height` with expanded transactions
    pub async fn get_ledger(&self, height: u32) -> Result<LedgerResult, RpcError> {
        self.call(RpcRequest::Ledger(Params::one(LedgerParams {
            ledger_index: height,
            transactions: true,
            expand: true,
        })))
        .await
    }

    pub async fn get_account_info(&self, account: &AccountId) -> Result<AccountInfoResult, RpcError> {
        self.call(RpcRequest::AccountInfo(Params::one(AccountInfoParams {
            account: *account,
            strict: true,
            queue: false,
        })))
        .await
    }

    pub async fn get_fee(&self) -> Result<FeeResult, RpcError> {
        self.call(RpcRequest::Fee(Params::none())).await
    }

    pub async fn get_tx(&self, hash: &str) -> Result<TxResult, RpcError> {
        self.call(RpcRequest::Tx(Params::one(TxParams {
            transaction: hash.to_string(),
            binary: false,
        })))
        .await
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Submit a signed transaction blob
    pub async fn submit(&self, signed_hex: &str) -> Result<SubmitResult, RpcError> {
        let result: SubmitResult = self
            .call(RpcRequest::Submit(Params::one(SubmitParams {
                tx_blob: signed_hex.to_string(),
            })))
            .await?;
        check_engine_result(result)
    }

    /// Submit a fully multi-signed transaction
    pub async fn submit_multisigned(&self, tx: &MultisignPayment) -> Result<SubmitResult, RpcError> {
        let result: SubmitResult = self
            .call(RpcRequest::SubmitMultisigned(Params::one(
                SubmitMultisignedParams {
                    tx_json: tx.clone(),
                },
            )))
            .await?;
        check_engine_result(result)
    }

    // -------------------------------------------------------------------------
    // Remote signing
    // -------------------------------------------------------------------------

    /// Have the node sign `tx` with `secret`
    pub async fn sign(&self, secret: &str, tx: &PaymentTx) -> Result<SignResult, RpcError> {
        self.call(RpcRequest::Sign(Params::one(SignParams {
            secret: secret.to_string(),
            tx_json: tx.clone(),
            offline: false,
        })))
        .await
    }

    /// Have the node add `account`'s signer entry to `tx`
    pub async fn sign_for(
        &self,
        account: &AccountId,
        secret: &str,
        tx: &MultisignPayment,
    ) -> Result<SignResult, RpcError> {
        self.call(RpcRequest::SignFor(Params::one(SignForParams {
            account: *account,
            secret: secret.to_string(),
            tx_json: tx.clone(),
        })))
        .await
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    async fn call<T: DeserializeOwned>(&self, request: RpcRequest) -> Result<T, RpcError> {
        let method = request.method();
        let body = self.post(&request).await?;
        decode_result(method, &body)
    }

    /// POST `request` and return the raw response body
    async fn post(&self, request: &RpcRequest) -> Result<String, TransportError> {
        let payload = serde_json::to_vec(request).map_err(TransportError::Encode)?;
        log::debug!("RPC {} -> {}", request.method(), self.address);

        let response = self
            .http
            .post(&self.address)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!("RPC {} <- HTTP {} ({} bytes)", request.method(), status, body.len());
        Ok(body)
    }
}

/// Check `result.status` and decode the payload
fn decode_result<T: DeserializeOwned>(method: &'static str, body: &str) -> Result<T, RpcError> {
    let decode_error = |source| TransportError::Decode {
        source,
        body: body.to_string(),
    };

    let envelope: RpcEnvelope = serde_json::from_str(body).map_err(decode_error)?;
    let status: RpcStatus =
        serde_json::from_value(envelope.result.clone()).map_err(decode_error)?;

    if !status.is_success() {
        log::warn!(
            "RPC {} failed: {}",
            method,
            status.error.as_deref().unwrap_or("unknown error")
        );
        return Err(RpcError::Status {
            method,
            status: status.status.unwrap_or_default(),
            error: status.error,
            message: status.error_message,
        });
    }

    Ok(serde_json::from_value(envelope.result).map_err(decode_error)?)
}

fn check_engine_result(result: SubmitResult) -> Result<SubmitResult, RpcError> {
    if result.is_accepted() {
        log::info!("Submission accepted: {}", result.engine_result);
        return Ok(result);
    }

    log::warn!(
        "Submission rejected: {} {}",
        result.engine_result,
        result.engine_result_message
    );
    Err(RpcError::EngineRejected {
        engine_result: result.engine_result,
        code: result.engine_result_code,
        message: result.engine_result_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Amount;
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Canned replies keyed by method, plus a log of received requests
    #[derive(Clone, Default)]
    struct FakeNode {
        replies: Arc<Mutex<Vec<(String, String)>>>,
        received: Arc<Mutex<Vec<Value>>>,
    }

    impl FakeNode {
        fn reply(self, method: &str, body: Value) -> Self {
            self.reply_raw(method, &body.to_string())
        }

        fn reply_raw(self, method: &str, body: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push((method.to_string(), body.to_string()));
            self
        }

        fn received(&self) -> Vec<Value> {
            self.received.lock().unwrap().clone()
        }
    }

    async fn handle(State(node): State<FakeNode>, Json(request): Json<Value>) -> String {
        let method = request["method"].as_str().unwrap_or_default().to_string();
        node.received.lock().unwrap().push(request);
        node.replies
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, body)| body.clone())
            .unwrap_or_else(|| json!({"result": {"status": "error", "error": "unknownCmd"}}).to_string())
    }

    async fn spawn(node: FakeNode) -> RpcClient {
        let app = Router::new().route("/", post(handle)).with_state(node);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RpcClient::new(RpcConfig::with_url(format!("http://{}/", addr))).unwrap()
    }

    fn multisign_tx() -> MultisignPayment {
        MultisignPayment::new(
            "rsHYGX2AoQ4tXqFywzEeeTDgXFTUfL1Fw9".parse().unwrap(),
            "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF".parse().unwrap(),
            Amount::Native(1_000),
            Amount::Native(30),
            4,
        )
    }

    #[test]
    fn test_default_config() {
        let config = RpcConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(300));
        assert_eq!(config.pool_max_idle_per_host, 5);
    }

    #[test]
    fn test_set_address() {
        let mut client = RpcClient::new(RpcConfig::default()).unwrap();
        client.set_address("http://node:5005");
        assert_eq!(client.address(), "http://node:5005");
    }

    #[tokio::test]
    async fn test_get_current_height() {
        let node = FakeNode::default().reply(
            "ledger_closed",
            json!({"result": {"ledger_hash": "AB12", "ledger_index": 6543, "status": "success"}}),
        );
        let client = spawn(node.clone()).await;

        assert_eq!(client.get_current_height().await.unwrap(), 6543);
        assert_eq!(
            node.received(),
            vec![json!({"method": "ledger_closed", "params": []})]
        );
    }

    #[tokio::test]
    async fn test_status_failure() {
        let node = FakeNode::default().reply(
            "account_info",
            json!({"result": {
                "status": "error",
                "error": "actNotFound",
                "error_message": "Account not found."
            }}),
        );
        let client = spawn(node).await;

        let err = client
            .get_account_info(&AccountId::default())
            .await
            .unwrap_err();
        match err {
            RpcError::Status {
                method,
                error,
                message,
                ..
            } => {
                assert_eq!(method, "account_info");
                assert_eq!(error.as_deref(), Some("actNotFound"));
                assert_eq!(message.as_deref(), Some("Account not found."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_account_info_request_shape() {
        let node = FakeNode::default().reply(
            "account_info",
            json!({"result": {
                "account_data": {
                    "Account": "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF",
                    "Balance": "1000000",
                    "Flags": 0,
                    "OwnerCount": 0,
                    "Sequence": 12
                },
                "status": "success",
                "validated": true
            }}),
        );
        let client = spawn(node.clone()).await;
        let account: AccountId = "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF".parse().unwrap();

        let info = client.get_account_info(&account).await.unwrap();
        assert_eq!(info.account_data.sequence, 12);
        assert_eq!(
            node.received()[0]["params"][0],
            json!({"account": "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF", "strict": true, "queue": false})
        );
    }

    #[tokio::test]
    async fn test_fee() {
        let node = FakeNode::default().reply(
            "fee",
            json!({"result": {
                "drops": {
                    "base_fee": "10",
                    "median_fee": "5000",
                    "minimum_fee": "10",
                    "open_ledger_fee": "10"
                },
                "ledger_current_index": 26575101,
                "status": "success"
            }}),
        );
        let client = spawn(node).await;

        let fee = client.get_fee().await.unwrap();
        assert_eq!(fee.base_fee(), Some(10));
        assert_eq!(fee.open_ledger_fee(), Some(10));
    }

    #[tokio::test]
    async fn test_submit_accepted_results() {
        for engine_result in ["tesSUCCESS", "terQUEUED"] {
            let node = FakeNode::default().reply(
                "submit",
                json!({"result": {
                    "engine_result": engine_result,
                    "engine_result_code": 0,
                    "engine_result_message": "ok",
                    "tx_json": {"hash": "ABCDEF"},
                    "status": "success"
                }}),
            );
            let client = spawn(node.clone()).await;

            let result = client.submit("120000").await.unwrap();
            assert_eq!(result.engine_result, engine_result);
            assert_eq!(result.hash(), Some("ABCDEF"));
            assert_eq!(node.received()[0]["params"][0]["tx_blob"], "120000");
        }
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let node = FakeNode::default().reply(
            "submit_multisigned",
            json!({"result": {
                "engine_result": "tecUNFUNDED_PAYMENT",
                "engine_result_code": 104,
                "engine_result_message": "Insufficient XRP balance to send.",
                "status": "success"
            }}),
        );
        let client = spawn(node.clone()).await;

        let err = client.submit_multisigned(&multisign_tx()).await.unwrap_err();
        assert_eq!(err.engine_result(), Some("tecUNFUNDED_PAYMENT"));
        match err {
            RpcError::EngineRejected { code, message, .. } => {
                assert_eq!(code, 104);
                assert_eq!(message, "Insufficient XRP balance to send.");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            node.received()[0]["params"][0]["tx_json"]["SigningPubKey"],
            ""
        );
    }

    #[tokio::test]
    async fn test_unparseable_body_keeps_raw_text() {
        let node = FakeNode::default().reply_raw("fee", "<html>bad gateway</html>");
        let client = spawn(node).await;

        match client.get_fee().await.unwrap_err() {
            RpcError::Transport(TransportError::Decode { body, .. }) => {
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_sign_for_request_shape() {
        let node = FakeNode::default().reply(
            "sign_for",
            json!({"result": {
                "tx_blob": "1200",
                "tx_json": {"hash": "FEED"},
                "status": "success"
            }}),
        );
        let client = spawn(node.clone()).await;
        let signer: AccountId = "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF".parse().unwrap();

        let result = client
            .sign_for(&signer, "shtew2z1TRsEvpnYUGtiyvqPnYywt", &multisign_tx())
            .await
            .unwrap();
        assert_eq!(result.hash(), Some("FEED"));

        let params = &node.received()[0]["params"][0];
        assert_eq!(params["account"], "rLi6oSF38EdP7mzhdccyxhfd8vp8FWbsWF");
        assert_eq!(params["tx_json"]["Sequence"], 4);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RpcClient::new(RpcConfig::with_url(format!("http://{}/", addr))).unwrap();
        assert!(matches!(
            client.get_fee().await,
            Err(RpcError::Transport(TransportError::Http(_)))
        ));
    }
}
