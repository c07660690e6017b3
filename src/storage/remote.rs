use super::BitStore;
use crate::error::{BloomError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Bit operations against a keyed remote bitmap.
///
/// Backends guarantee that `set_bit` returns the bit's prior value and that
/// batched calls return one result per position, in position order. Batches
/// should be pipelined rather than sent one round trip per position.
/// Connection management (lazy connect, reconnect) is the backend's concern.
#[async_trait]
pub trait RemoteBitOperate: Send + Sync {
    fn set_bit(&self, key: &str, position: u64) -> Result<bool>;
    fn get_bit(&self, key: &str, position: u64) -> Result<bool>;
    fn set_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>>;
    fn get_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>>;
    fn clear(&self, key: &str) -> Result<()>;

    async fn set_bit_async(&self, key: &str, position: u64) -> Result<bool>;
    async fn get_bit_async(&self, key: &str, position: u64) -> Result<bool>;
    async fn set_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>>;
    async fn get_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>>;
    async fn clear_async(&self, key: &str) -> Result<()>;
}

/// A [`BitStore`] over one key of a remote bitmap. The connection is shared;
/// several stores (and filters) may use the same one under different keys,
/// and it is released when the last of them is dropped.
pub struct RemoteBitStore<C: RemoteBitOperate> {
    connection: Arc<C>,
    key: String,
}

impl<C: RemoteBitOperate> RemoteBitStore<C> {
    pub fn new(connection: Arc<C>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(BloomError::InvalidConfig(
                "Remote store key must not be empty".into(),
            ));
        }
        debug!(%key, "created remote bit store");
        Ok(Self { connection, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }
}

#[async_trait]
impl<C: RemoteBitOperate> BitStore for RemoteBitStore<C> {
    fn set_bits(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.connection.set_bits(&self.key, positions)
    }

    fn get_bits(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.connection.get_bits(&self.key, positions)
    }

    fn clear(&self) -> Result<()> {
        self.connection.clear(&self.key)
    }

    fn set_bit(&self, position: u64) -> Result<bool> {
        self.connection.set_bit(&self.key, position)
    }

    fn get_bit(&self, position: u64) -> Result<bool> {
        self.connection.get_bit(&self.key, position)
    }

    async fn set_bits_async(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.connection.set_bits_async(&self.key, positions).await
    }

    async fn get_bits_async(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.connection.get_bits_async(&self.key, positions).await
    }

    async fn clear_async(&self) -> Result<()> {
        self.connection.clear_async(&self.key).await
    }
}

impl<C: RemoteBitOperate> std::fmt::Debug for RemoteBitStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RemoteBitStore {{ key: {} }}", self.key)
    }
}
