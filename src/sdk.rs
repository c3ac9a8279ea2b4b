//! SDK entry point

use crate::rpc::{RpcClient, RpcConfig, RpcError};

/// Holds the RPC client used to reach a node
#[derive(Debug, Clone, Default)]
pub struct RippleSdk {
    rpc: Option<RpcClient>,
}

impl RippleSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client from `config` and make it the active one
    pub fn new_rpc_client(&mut self, config: RpcConfig) -> Result<&RpcClient, RpcError> {
        let client = RpcClient::new(config)?;
        Ok(self.rpc.insert(client))
    }

    pub fn set_rpc_client(&mut self, client: RpcClient) -> &mut Self {
        self.rpc = Some(client);
        self
    }

    pub fn rpc_client(&self) -> Option<&RpcClient> {
        self.rpc.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_client_lifecycle() {
        let mut sdk = RippleSdk::new();
        assert!(sdk.rpc_client().is_none());

        sdk.new_rpc_client(RpcConfig::with_url("http://a:5005")).unwrap();
        assert_eq!(sdk.rpc_client().unwrap().address(), "http://a:5005");

        let replacement = RpcClient::with_http_client("http://b:5005", reqwest::Client::new());
        sdk.set_rpc_client(replacement);
        assert_eq!(sdk.rpc_client().unwrap().address(), "http://b:5005");
    }
}
