//! RPC data models and types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw 32-bit block version field.
///
/// Nodes report it as a signed JSON integer; transports reinterpret the bits
/// so that `0x20000000`-style signaling values stay readable.
pub type BlockVersion = u32;

/// Transport-level failure raised by a [`crate::ChainReader`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unauthorized: check rpc username and password")]
    Unauthorized,

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Response for {0} carried no result")]
    MissingResult(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC response envelope.
///
/// bitcoind-style nodes always send both `result` and `error`, with the
/// unused one set to `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub id: Option<u64>,
    pub result: Option<T>,
    pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl From<JsonRpcErrorObject> for RpcError {
    fn from(err: JsonRpcErrorObject) -> Self {
        RpcError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

/// Verbose `getblockheader` result, reduced to the fields this workspace reads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BlockHeaderVerbose {
    pub hash: String,
    pub height: u64,
    pub version: i32,
    #[serde(rename = "versionHex")]
    pub version_hex: Option<String>,
    pub time: u64,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: Option<String>,
}

impl BlockHeaderVerbose {
    pub fn block_version(&self) -> BlockVersion {
        self.version as u32
    }
}
