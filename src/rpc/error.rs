//! RPC error types

use thiserror::Error;

/// Failures moving bytes to and from the node
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Response decoding failed: {source}; body: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Errors returned by `RpcClient`
#[derive(Error, Debug)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(
        "{method} returned status {status:?}: {}",
        .message.as_deref().or(.error.as_deref()).unwrap_or("no error detail")
    )]
    Status {
        method: &'static str,
        status: String,
        error: Option<String>,
        message: Option<String>,
    },
    #[error("Transaction rejected with {engine_result} ({code}): {message}")]
    EngineRejected {
        engine_result: String,
        code: i32,
        message: String,
    },
}

impl RpcError {
    /// Engine result of a rejected submission
    pub fn engine_result(&self) -> Option<&str> {
        match self {
            RpcError::EngineRejected { engine_result, .. } => Some(engine_result),
            _ => None,
        }
    }
}
