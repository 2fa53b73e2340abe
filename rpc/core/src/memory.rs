//! In-memory chain reader.
//!
//! Holds one version per height, starting at genesis (height 0). Heights can
//! be marked as failing to exercise error paths without a node.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::api::ChainReader;
use crate::model::{BlockVersion, RpcError};

#[derive(Default)]
struct ChainData {
    versions: Vec<BlockVersion>,
    failing: HashSet<u64>,
    tip_unavailable: bool,
}

#[derive(Default)]
pub struct MemoryChain {
    data: RwLock<ChainData>,
    fetches: AtomicU64,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain whose block at height `i` carries `versions[i]`.
    pub fn from_versions(versions: Vec<BlockVersion>) -> Self {
        Self {
            data: RwLock::new(ChainData {
                versions,
                ..ChainData::default()
            }),
            fetches: AtomicU64::new(0),
        }
    }

    /// Chain of `len` blocks where block `h` carries `version_of(h)`.
    pub fn generate(len: u64, version_of: impl Fn(u64) -> BlockVersion) -> Self {
        Self::from_versions((0..len).map(version_of).collect())
    }

    pub fn push(&self, version: BlockVersion) {
        self.data.write().versions.push(version);
    }

    pub fn extend(&self, versions: impl IntoIterator<Item = BlockVersion>) {
        self.data.write().versions.extend(versions);
    }

    /// Replace the version of an existing block. Returns false if `height` is past the tip.
    pub fn set_version(&self, height: u64, version: BlockVersion) -> bool {
        let mut data = self.data.write();
        match data.versions.get_mut(height as usize) {
            Some(slot) => {
                *slot = version;
                true
            }
            None => false,
        }
    }

    /// Drop every block above `height`, as a node rolling back would.
    pub fn truncate(&self, height: u64) {
        self.data.write().versions.truncate(height as usize + 1);
    }

    pub fn fail_at(&self, height: u64) {
        self.data.write().failing.insert(height);
    }

    pub fn clear_failure(&self, height: u64) {
        self.data.write().failing.remove(&height);
    }

    /// Make `current_height` fail until switched back.
    pub fn set_tip_unavailable(&self, unavailable: bool) {
        self.data.write().tip_unavailable = unavailable;
    }

    pub fn len(&self) -> u64 {
        self.data.read().versions.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().versions.is_empty()
    }

    /// Number of `block_version_at` calls served so far, failed ones included.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn reset_fetch_count(&self) {
        self.fetches.store(0, Ordering::Relaxed);
    }
}

#[async_trait]
impl ChainReader for MemoryChain {
    async fn current_height(&self) -> Result<u64, RpcError> {
        let data = self.data.read();
        if data.tip_unavailable {
            return Err(RpcError::Network("tip query unavailable".to_string()));
        }
        match data.versions.len() {
            0 => Err(RpcError::Internal("chain is empty".to_string())),
            len => Ok(len as u64 - 1),
        }
    }

    async fn block_version_at(&self, height: u64) -> Result<BlockVersion, RpcError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read();
        if data.failing.contains(&height) {
            return Err(RpcError::Network(format!("injected failure at height {}", height)));
        }
        data.versions
            .get(height as usize)
            .copied()
            .ok_or_else(|| RpcError::Rpc {
                code: -8,
                message: "Block height out of range".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tip_and_versions() {
        let chain = MemoryChain::from_versions(vec![1, 1, 2]);
        assert_eq!(chain.current_height().await.unwrap(), 2);
        assert_eq!(chain.block_version_at(2).await.unwrap(), 2);

        chain.push(0x2000_0002);
        assert_eq!(chain.current_height().await.unwrap(), 3);
        assert_eq!(chain.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_matches_node_error() {
        let chain = MemoryChain::from_versions(vec![1]);
        let err = chain.block_version_at(5).await.unwrap_err();
        assert!(matches!(err, RpcError::Rpc { code: -8, .. }));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let chain = MemoryChain::generate(10, |_| 4);
        chain.fail_at(3);
        assert!(matches!(chain.block_version_at(3).await, Err(RpcError::Network(_))));
        chain.clear_failure(3);
        assert_eq!(chain.block_version_at(3).await.unwrap(), 4);

        chain.set_tip_unavailable(true);
        assert!(chain.current_height().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_chain_has_no_tip() {
        let chain = MemoryChain::new();
        assert!(chain.is_empty());
        assert!(matches!(chain.current_height().await, Err(RpcError::Internal(_))));
    }

    #[tokio::test]
    async fn test_truncate_rolls_back_tip() {
        let chain = MemoryChain::generate(20, |h| h as u32);
        chain.truncate(15);
        assert_eq!(chain.current_height().await.unwrap(), 15);
        assert_eq!(chain.len(), 16);
    }
}
