//! Chain reader trait definition

use async_trait::async_trait;
use std::sync::Arc;
use crate::model::{BlockVersion, RpcError};

/// Read-only view of a node's best chain.
///
/// Both calls are plain queries: implementations keep no state that the
/// caller can observe, and every failure surfaces as an [`RpcError`].
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Height of the node's current tip.
    async fn current_height(&self) -> Result<u64, RpcError>;

    /// Raw version field of the block at `height` on the best chain.
    async fn block_version_at(&self, height: u64) -> Result<BlockVersion, RpcError>;
}

#[async_trait]
impl<T: ChainReader + ?Sized> ChainReader for Arc<T> {
    async fn current_height(&self) -> Result<u64, RpcError> {
        (**self).current_height().await
    }

    async fn block_version_at(&self, height: u64) -> Result<BlockVersion, RpcError> {
        (**self).block_version_at(height).await
    }
}
