use rpc_core::{BlockVersion, RpcError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error("Failed to fetch block version at height {height}: {source}")]
    Fetch {
        height: u64,
        #[source]
        source: RpcError,
    },

    #[error("Height went back from {current} to {requested}; reorganizations are not tracked")]
    HeightRegression { current: u64, requested: u64 },

    #[error("Block {height} left the window with version 0x{version:08x}, which has no count")]
    CountUnderflow { height: u64, version: BlockVersion },

    #[error("Chain height {height} is too short for a {window_size}-block window")]
    ChainTooShort { height: u64, window_size: u64 },

    #[error("Invalid tally configuration: {0}")]
    InvalidConfig(String),
}

impl TallyError {
    /// Height of the block whose fetch failed, if this is a fetch failure.
    pub fn failed_height(&self) -> Option<u64> {
        match self {
            TallyError::Fetch { height, .. } => Some(*height),
            _ => None,
        }
    }
}

pub type TallyResult<T> = Result<T, TallyError>;
