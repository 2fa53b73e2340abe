//! HTTP JSON-RPC client for bitcoind-style nodes

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;
use rpc_core::{BlockHeaderVerbose, BlockVersion, ChainReader, JsonRpcRequest, JsonRpcResponse, RpcError};

/// Basic-auth pair from the node's `rpcuser` / `rpcpassword`.
#[derive(Debug, Clone)]
pub struct RpcCredentials {
    pub username: String,
    pub password: String,
}

impl RpcCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

pub struct RpcClient {
    url: Url,
    http: Client,
    credentials: Option<RpcCredentials>,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str, credentials: Option<RpcCredentials>, timeout: Duration) -> Result<Self, RpcError> {
        let url = Url::parse(url)
            .map_err(|e| RpcError::Internal(format!("Invalid RPC url {}: {}", url, e)))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Internal(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            url,
            http,
            credentials,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call_method<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        trace!("RPC request {} id {}", method, id);

        let mut builder = self.http.post(self.url.clone()).json(&request);
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RpcError::Unauthorized);
        }

        let body = response.text().await.map_err(transport_error)?;

        // Nodes answer RPC-level failures with a 500 and a JSON error body, so
        // the body is decoded before the status is judged.
        let decoded: JsonRpcResponse<T> = match serde_json::from_str(&body) {
            Ok(decoded) => decoded,
            Err(_) if !status.is_success() => return Err(RpcError::Http { status: status.as_u16() }),
            Err(e) => return Err(RpcError::Decode(format!("{}: {}", method, e))),
        };

        if let Some(error) = decoded.error {
            return Err(error.into());
        }
        if !status.is_success() {
            return Err(RpcError::Http { status: status.as_u16() });
        }

        decoded.result.ok_or_else(|| RpcError::MissingResult(method.to_string()))
    }

    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call_method("getblockcount", serde_json::json!([])).await
    }

    pub async fn get_block_hash(&self, height: u64) -> Result<String, RpcError> {
        self.call_method("getblockhash", serde_json::json!([height])).await
    }

    pub async fn get_block_header(&self, hash: &str) -> Result<BlockHeaderVerbose, RpcError> {
        self.call_method("getblockheader", serde_json::json!([hash, true])).await
    }
}

fn transport_error(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout(err.to_string())
    } else if err.is_decode() {
        RpcError::Decode(err.to_string())
    } else {
        RpcError::Network(err.to_string())
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn current_height(&self) -> Result<u64, RpcError> {
        self.get_block_count().await
    }

    async fn block_version_at(&self, height: u64) -> Result<BlockVersion, RpcError> {
        let hash = self.get_block_hash(height).await?;
        let header = self.get_block_header(&hash).await?;
        let version = header.block_version();
        debug!("Block {} height {} has version 0x{:08x}", hash, height, version);
        Ok(version)
    }
}
