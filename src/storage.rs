//! Bit storage behind a filter: an in-process segmented bit vector or a
//! keyed remote bitmap.
pub mod local;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_bitmap;
pub mod remote;

use crate::error::{BloomError, Result};
use async_trait::async_trait;

pub use local::LocalBitStore;
pub use memory::MemoryBitmap;
#[cfg(feature = "redis")]
pub use redis_bitmap::RedisBitmap;
pub use remote::{RemoteBitOperate, RemoteBitStore};

/// Batched bit I/O used by the filter.
///
/// Results are positional: the i-th returned value belongs to the i-th
/// requested position. A batch either succeeds as a whole or fails as a
/// whole.
#[async_trait]
pub trait BitStore: Send + Sync {
    /// Sets every position and returns each bit's value before the call.
    fn set_bits(&self, positions: &[u64]) -> Result<Vec<bool>>;

    /// Returns the current value of every position.
    fn get_bits(&self, positions: &[u64]) -> Result<Vec<bool>>;

    /// Resets the whole store to zero.
    fn clear(&self) -> Result<()>;

    /// Number of addressable bits, for stores with a fixed size. Remote
    /// bitmaps grow on write and report `None`.
    fn fixed_capacity(&self) -> Option<u64> {
        None
    }

    fn set_bit(&self, position: u64) -> Result<bool> {
        first(self.set_bits(&[position])?)
    }

    fn get_bit(&self, position: u64) -> Result<bool> {
        first(self.get_bits(&[position])?)
    }

    async fn set_bits_async(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.set_bits(positions)
    }

    async fn get_bits_async(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.get_bits(positions)
    }

    async fn clear_async(&self) -> Result<()> {
        self.clear()
    }
}

fn first(bits: Vec<bool>) -> Result<bool> {
    bits.first()
        .copied()
        .ok_or_else(|| BloomError::Backend("Store returned no result".into()))
}
