//! Error types for the monitor

use rpc_core::RpcError;
use tally::TallyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Tally error: {0}")]
    Tally(#[from] TallyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
