use crate::error::{BloomError, Result};
use crate::filter::BloomFilter;
use crate::hash::HashMethod;
use crate::params::FilterParams;
use crate::storage::LocalBitStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Full serialized state of an in-process filter: configuration, resolved
/// sizing and the raw bytes of every segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub name: String,
    pub expected_elements: u64,
    pub error_rate: f64,
    pub hash_method: HashMethod,
    pub capacity: u64,
    pub hashes: u32,
    pub segment_count: usize,
    pub segment_byte_lengths: Vec<usize>,
    pub segments: Vec<Vec<u8>>,
}

impl FilterSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn check_layout(&self) -> Result<()> {
        let lengths: Vec<usize> = self.segments.iter().map(Vec::len).collect();
        if self.segment_count != self.segments.len() || lengths != self.segment_byte_lengths
        {
            return Err(BloomError::SerializationError(format!(
                "Snapshot header declares {} segments of {:?} bytes, payload has {} of {:?}",
                self.segment_count,
                self.segment_byte_lengths,
                self.segments.len(),
                lengths
            )));
        }
        Ok(())
    }
}

impl BloomFilter<LocalBitStore> {
    /// Captures the filter's current state. Filters built with a custom
    /// hasher cannot be snapshotted, since the hasher has no tag.
    pub fn snapshot(&self) -> Result<FilterSnapshot> {
        let hash_method = self.hash_method().ok_or_else(|| {
            BloomError::SerializationError(
                "Cannot snapshot a filter with a custom hasher".into(),
            )
        })?;
        let segments = self.store().export_segments()?;
        let params = self.params();

        debug!(
            filter = %self.name(),
            segments = segments.len(),
            "took filter snapshot"
        );

        Ok(FilterSnapshot {
            name: self.name().to_string(),
            expected_elements: params.expected_elements,
            error_rate: params.error_rate,
            hash_method,
            capacity: params.capacity,
            hashes: params.hashes,
            segment_count: segments.len(),
            segment_byte_lengths: segments.iter().map(Vec::len).collect(),
            segments,
        })
    }

    /// Rebuilds a filter from a snapshot. The stored sizing is used as-is,
    /// nothing is re-derived.
    pub fn from_snapshot(snapshot: FilterSnapshot) -> Result<Self> {
        snapshot.check_layout()?;
        let params = FilterParams::restore(
            snapshot.capacity,
            snapshot.hashes,
            snapshot.expected_elements,
            snapshot.error_rate,
        )?;

        let store = LocalBitStore::new(params.capacity)?;
        store.import_segments(snapshot.segments)?;

        Self::from_parts(
            snapshot.name,
            params,
            Some(snapshot.hash_method),
            Arc::new(snapshot.hash_method.strategy()),
            store,
        )
    }
}
