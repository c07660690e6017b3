use crate::config::FilterConfig;
use crate::error::{BloomError, Result};
use crate::hash::{HashMethod, PositionHasher};
use crate::params::{FilterParams, best_p};
use crate::reduce::{reduce_added, reduce_contained};
use crate::storage::{BitStore, LocalBitStore};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A Bloom filter over any [`BitStore`].
///
/// Sizing and the position hasher are fixed at construction; the filter
/// itself is immutable and can be shared across threads. All mutable state
/// lives in the store.
pub struct BloomFilter<S: BitStore = LocalBitStore> {
    name: String,
    params: FilterParams,
    hash_method: Option<HashMethod>,
    hasher: Arc<dyn PositionHasher>,
    store: S,
}

impl BloomFilter<LocalBitStore> {
    /// In-process filter backed by a [`LocalBitStore`].
    pub fn new(config: FilterConfig) -> Result<Self> {
        let params = config.params()?;
        let hasher = Arc::new(config.hash_method.strategy());
        // refuse before allocating the bit array
        check_capacity(&params, hasher.as_ref())?;
        let store = LocalBitStore::new(params.capacity)?;
        Self::from_parts(config.name, params, Some(config.hash_method), hasher, store)
    }
}

impl<S: BitStore> BloomFilter<S> {
    /// Filter over a caller-supplied store, e.g. a
    /// [`RemoteBitStore`](crate::storage::RemoteBitStore).
    pub fn with_store(config: FilterConfig, store: S) -> Result<Self> {
        let params = config.params()?;
        let hasher = Arc::new(config.hash_method.strategy());
        Self::from_parts(config.name, params, Some(config.hash_method), hasher, store)
    }

    /// Filter using a custom position hasher instead of a built-in method.
    /// `config.hash_method` is ignored.
    pub fn with_hasher(
        config: FilterConfig,
        hasher: Arc<dyn PositionHasher>,
        store: S,
    ) -> Result<Self> {
        let params = config.params()?;
        Self::from_parts(config.name, params, None, hasher, store)
    }

    pub(crate) fn from_parts(
        name: String,
        params: FilterParams,
        hash_method: Option<HashMethod>,
        hasher: Arc<dyn PositionHasher>,
        store: S,
    ) -> Result<Self> {
        check_capacity(&params, hasher.as_ref())?;
        if let Some(store_capacity) = store.fixed_capacity() {
            if store_capacity != params.capacity {
                return Err(BloomError::InvalidConfig(format!(
                    "Store holds {store_capacity} bits, filter needs {}",
                    params.capacity
                )));
            }
        }

        debug!(
            %name,
            capacity = params.capacity,
            hashes = params.hashes,
            expected_elements = params.expected_elements,
            error_rate = params.error_rate,
            method = ?hash_method,
            "created bloom filter"
        );

        Ok(Self {
            name,
            params,
            hash_method,
            hasher,
            store,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn capacity(&self) -> u64 {
        self.params.capacity
    }

    pub fn hashes(&self) -> u32 {
        self.params.hashes
    }

    pub fn expected_elements(&self) -> u64 {
        self.params.expected_elements
    }

    pub fn error_rate(&self) -> f64 {
        self.params.error_rate
    }

    /// `None` when built with a custom hasher.
    pub fn hash_method(&self) -> Option<HashMethod> {
        self.hash_method
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Expected false positive rate once `inserted` elements are in.
    pub fn false_positive_probability(&self, inserted: u64) -> f64 {
        best_p(self.params.hashes, self.params.capacity, inserted)
    }

    pub fn compute_positions(&self, element: &[u8]) -> Vec<u64> {
        self.hasher
            .compute_positions(element, self.params.capacity, self.params.hashes)
    }

    pub async fn compute_positions_async(&self, element: &[u8]) -> Vec<u64> {
        self.compute_positions(element)
    }

    /// Hasher output for one element, which must be exactly `hashes`
    /// positions below `capacity`.
    fn checked_positions(&self, element: &[u8]) -> Result<Vec<u64>> {
        let positions = self.compute_positions(element);
        if positions.len() != self.params.hashes as usize {
            warn!(
                filter = %self.name,
                expected = self.params.hashes,
                got = positions.len(),
                "hasher returned wrong number of positions"
            );
            return Err(BloomError::PositionCount {
                expected: self.params.hashes,
                got: positions.len(),
            });
        }
        if let Some(&index) = positions.iter().find(|&&p| p >= self.params.capacity) {
            return Err(BloomError::IndexOutOfBounds {
                index,
                capacity: self.params.capacity,
            });
        }
        Ok(positions)
    }

    /// Positions of every element, concatenated in input order.
    fn flat_positions<E: AsRef<[u8]>>(&self, elements: &[E]) -> Result<Vec<u64>> {
        let mut positions =
            Vec::with_capacity(elements.len() * self.params.hashes as usize);
        for element in elements {
            positions.extend(self.checked_positions(element.as_ref())?);
        }
        trace!(
            filter = %self.name,
            elements = elements.len(),
            positions = positions.len(),
            "computed batch positions"
        );
        Ok(positions)
    }

    /// Bit results expected back for `elements` elements.
    fn expected_bits(&self, elements: usize) -> usize {
        elements * self.params.hashes as usize
    }

    fn check_results(&self, bits: &[bool], expected: usize) -> Result<()> {
        if bits.len() != expected {
            warn!(
                filter = %self.name,
                expected,
                got = bits.len(),
                "store returned wrong number of results"
            );
            return Err(BloomError::Backend(format!(
                "Expected {expected} bit results, got {}",
                bits.len()
            )));
        }
        Ok(())
    }

    /// Adds an element. Returns `true` if at least one of its bits was
    /// previously clear, i.e. the element is new to the filter.
    pub fn add(&self, element: impl AsRef<[u8]>) -> Result<bool> {
        let positions = self.checked_positions(element.as_ref())?;
        let prior = self.store.set_bits(&positions)?;
        self.check_results(&prior, self.expected_bits(1))?;
        Ok(prior.iter().any(|&was_set| !was_set))
    }

    /// Adds every element with one store call. Result `i` belongs to
    /// element `i`.
    pub fn add_bulk<E: AsRef<[u8]>>(&self, elements: &[E]) -> Result<Vec<bool>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let positions = self.flat_positions(elements)?;
        let prior = self.store.set_bits(&positions)?;
        self.check_results(&prior, self.expected_bits(elements.len()))?;
        Ok(reduce_added(&prior, self.params.hashes))
    }

    /// `true` if every bit of the element is set. False positives are
    /// possible, false negatives are not.
    pub fn contains(&self, element: impl AsRef<[u8]>) -> Result<bool> {
        let positions = self.checked_positions(element.as_ref())?;
        let bits = self.store.get_bits(&positions)?;
        self.check_results(&bits, self.expected_bits(1))?;
        Ok(bits.iter().all(|&is_set| is_set))
    }

    pub fn contains_bulk<E: AsRef<[u8]>>(&self, elements: &[E]) -> Result<Vec<bool>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let positions = self.flat_positions(elements)?;
        let bits = self.store.get_bits(&positions)?;
        self.check_results(&bits, self.expected_bits(elements.len()))?;
        Ok(reduce_contained(&bits, self.params.hashes))
    }

    /// `true` if every element may be present.
    pub fn all<E: AsRef<[u8]>>(&self, elements: &[E]) -> Result<bool> {
        Ok(self.contains_bulk(elements)?.into_iter().all(|found| found))
    }

    pub fn clear(&self) -> Result<()> {
        debug!(filter = %self.name, "clearing bloom filter");
        self.store.clear()
    }

    pub async fn add_async(&self, element: impl AsRef<[u8]>) -> Result<bool> {
        let positions = self.checked_positions(element.as_ref())?;
        let prior = self.store.set_bits_async(&positions).await?;
        self.check_results(&prior, self.expected_bits(1))?;
        Ok(prior.iter().any(|&was_set| !was_set))
    }

    pub async fn add_bulk_async<E: AsRef<[u8]>>(
        &self,
        elements: &[E],
    ) -> Result<Vec<bool>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let positions = self.flat_positions(elements)?;
        let prior = self.store.set_bits_async(&positions).await?;
        self.check_results(&prior, self.expected_bits(elements.len()))?;
        Ok(reduce_added(&prior, self.params.hashes))
    }

    pub async fn contains_async(&self, element: impl AsRef<[u8]>) -> Result<bool> {
        let positions = self.checked_positions(element.as_ref())?;
        let bits = self.store.get_bits_async(&positions).await?;
        self.check_results(&bits, self.expected_bits(1))?;
        Ok(bits.iter().all(|&is_set| is_set))
    }

    pub async fn contains_bulk_async<E: AsRef<[u8]>>(
        &self,
        elements: &[E],
    ) -> Result<Vec<bool>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let positions = self.flat_positions(elements)?;
        let bits = self.store.get_bits_async(&positions).await?;
        self.check_results(&bits, self.expected_bits(elements.len()))?;
        Ok(reduce_contained(&bits, self.params.hashes))
    }

    pub async fn all_async<E: AsRef<[u8]>>(&self, elements: &[E]) -> Result<bool> {
        Ok(self
            .contains_bulk_async(elements)
            .await?
            .into_iter()
            .all(|found| found))
    }

    pub async fn clear_async(&self) -> Result<()> {
        debug!(filter = %self.name, "clearing bloom filter");
        self.store.clear_async().await
    }
}

fn check_capacity(params: &FilterParams, hasher: &dyn PositionHasher) -> Result<()> {
    let max = hasher.max_capacity();
    if params.capacity > max {
        return Err(BloomError::CapacityUnsupported {
            capacity: params.capacity,
            max,
        });
    }
    Ok(())
}

impl<S: BitStore> std::fmt::Debug for BloomFilter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ name: {}, capacity: {}, hashes: {}, expected_elements: {}, error_rate: {}, hasher: {:?} }}",
            self.name,
            self.params.capacity,
            self.params.hashes,
            self.params.expected_elements,
            self.params.error_rate,
            self.hasher
        )
    }
}
