use super::RemoteBitOperate;
use crate::error::{BloomError, Result};
use async_trait::async_trait;
use bitvec::prelude::*;
use fnv::FnvHashMap;
use std::sync::{Mutex, MutexGuard};

/// An in-process keyed bitmap with the semantics of Redis `SETBIT`/`GETBIT`:
/// bitmaps grow on write, unwritten bits read as zero, and clearing removes
/// the key. Useful for embedding and as a stand-in for a remote backend.
#[derive(Default)]
pub struct MemoryBitmap {
    bitmaps: Mutex<FnvHashMap<String, BitVec<u8, Msb0>>>,
}

impl MemoryBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a bitmap.
    pub fn key_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, FnvHashMap<String, BitVec<u8, Msb0>>>> {
        self.bitmaps
            .lock()
            .map_err(|e| BloomError::LockError(e.to_string()))
    }
}

fn offset(position: u64) -> Result<usize> {
    usize::try_from(position)
        .map_err(|_| BloomError::Backend(format!("Bit offset {position} out of range")))
}

fn set_one(bitmap: &mut BitVec<u8, Msb0>, position: usize) -> bool {
    if position >= bitmap.len() {
        // grow by whole bytes, like a Redis string
        bitmap.resize((position / 8 + 1) * 8, false);
    }
    bitmap.replace(position, true)
}

fn get_one(bitmap: Option<&BitVec<u8, Msb0>>, position: usize) -> bool {
    bitmap
        .and_then(|bits| bits.get(position).map(|bit| *bit))
        .unwrap_or(false)
}

#[async_trait]
impl RemoteBitOperate for MemoryBitmap {
    fn set_bit(&self, key: &str, position: u64) -> Result<bool> {
        let position = offset(position)?;
        let mut bitmaps = self.lock()?;
        Ok(set_one(bitmaps.entry(key.to_string()).or_default(), position))
    }

    fn get_bit(&self, key: &str, position: u64) -> Result<bool> {
        let position = offset(position)?;
        let bitmaps = self.lock()?;
        Ok(get_one(bitmaps.get(key), position))
    }

    fn set_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        let offsets = positions
            .iter()
            .map(|&p| offset(p))
            .collect::<Result<Vec<_>>>()?;
        let mut bitmaps = self.lock()?;
        let bitmap = bitmaps.entry(key.to_string()).or_default();
        Ok(offsets.into_iter().map(|p| set_one(bitmap, p)).collect())
    }

    fn get_bits(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        let offsets = positions
            .iter()
            .map(|&p| offset(p))
            .collect::<Result<Vec<_>>>()?;
        let bitmaps = self.lock()?;
        let bitmap = bitmaps.get(key);
        Ok(offsets.into_iter().map(|p| get_one(bitmap, p)).collect())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn set_bit_async(&self, key: &str, position: u64) -> Result<bool> {
        self.set_bit(key, position)
    }

    async fn get_bit_async(&self, key: &str, position: u64) -> Result<bool> {
        self.get_bit(key, position)
    }

    async fn set_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        self.set_bits(key, positions)
    }

    async fn get_bits_async(&self, key: &str, positions: &[u64]) -> Result<Vec<bool>> {
        self.get_bits(key, positions)
    }

    async fn clear_async(&self, key: &str) -> Result<()> {
        self.clear(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setbit_returns_prior_value() {
        let bitmap = MemoryBitmap::new();
        assert!(!bitmap.set_bit("k", 100).unwrap());
        assert!(bitmap.set_bit("k", 100).unwrap());
        assert!(bitmap.get_bit("k", 100).unwrap());
        assert!(!bitmap.get_bit("k", 5_000).unwrap());
        assert!(!bitmap.get_bit("missing", 0).unwrap());
    }

    #[test]
    fn test_batch_preserves_order() {
        let bitmap = MemoryBitmap::new();
        bitmap.set_bit("k", 3).unwrap();
        assert_eq!(
            bitmap.set_bits("k", &[9, 3, 9, 0]).unwrap(),
            vec![false, true, true, false]
        );
        assert_eq!(
            bitmap.get_bits("k", &[0, 1, 3, 9]).unwrap(),
            vec![true, false, true, true]
        );
    }

    #[test]
    fn test_clear_removes_key() {
        let bitmap = MemoryBitmap::new();
        bitmap.set_bits("a", &[1]).unwrap();
        bitmap.set_bits("b", &[1]).unwrap();
        bitmap.clear("a").unwrap();
        assert_eq!(bitmap.key_count().unwrap(), 1);
        assert!(!bitmap.get_bit("a", 1).unwrap());
    }
}
