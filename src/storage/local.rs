use super::BitStore;
use crate::error::{BloomError, Result};
use bitvec::prelude::*;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Bits held by one segment. Indices above [`MAX_SEGMENT_INDEX`] live in
/// the next segment.
pub const SEGMENT_BITS: u64 = 1 << 31;
pub const MAX_SEGMENT_INDEX: u64 = SEGMENT_BITS - 1;

type Segment = BitVec<u8, Lsb0>;

/// In-process bit array spanning one or more fixed-size segments.
///
/// Every batch runs under a single mutex, so a batch never interleaves with
/// another batch or with [`BitStore::clear`].
pub struct LocalBitStore {
    capacity: u64,
    segment_bits: u64,
    segment_count: usize,
    segments: Mutex<Vec<Segment>>,
}

impl LocalBitStore {
    pub fn new(capacity: u64) -> Result<Self> {
        Self::with_segment_bits(capacity, SEGMENT_BITS)
    }

    /// Like [`LocalBitStore::new`] with a custom segment width.
    pub fn with_segment_bits(capacity: u64, segment_bits: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(BloomError::InvalidConfig("Capacity must be > 0".into()));
        }
        if segment_bits == 0 {
            return Err(BloomError::InvalidConfig(
                "Segment size must be > 0".into(),
            ));
        }

        let lens = segment_lens(capacity, segment_bits);
        let segments = lens
            .iter()
            .map(|&len| zeroed_segment(len))
            .collect::<Result<Vec<_>>>()?;

        debug!(capacity, segments = segments.len(), "created local bit store");

        Ok(Self {
            capacity,
            segment_bits,
            segment_count: segments.len(),
            segments: Mutex::new(segments),
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Maps a logical index to `(segment, offset)`.
    pub fn locate(&self, index: u64) -> (usize, usize) {
        (
            (index / self.segment_bits) as usize,
            (index % self.segment_bits) as usize,
        )
    }

    /// Raw little-endian bytes of every segment, bit 0 of each segment in
    /// the lowest bit of its first byte.
    pub fn export_segments(&self) -> Result<Vec<Vec<u8>>> {
        let segments = self.lock()?;
        Ok(segments.iter().map(|s| s.as_raw_slice().to_vec()).collect())
    }

    /// Replaces the contents with previously exported segments. Segment
    /// count and byte lengths must match this store's layout.
    pub fn import_segments(&self, raw: Vec<Vec<u8>>) -> Result<()> {
        let lens = segment_lens(self.capacity, self.segment_bits);
        if raw.len() != lens.len() {
            return Err(BloomError::SerializationError(format!(
                "Expected {} segments, got {}",
                lens.len(),
                raw.len()
            )));
        }

        let mut imported = Vec::with_capacity(lens.len());
        for (bytes, len) in raw.into_iter().zip(lens) {
            let expected = len.div_ceil(8);
            if bytes.len() as u64 != expected {
                return Err(BloomError::SerializationError(format!(
                    "Segment of {len} bits needs {expected} bytes, got {}",
                    bytes.len()
                )));
            }
            let mut segment = Segment::from_vec(bytes);
            segment.truncate(len as usize);
            imported.push(segment);
        }

        *self.lock()? = imported;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Segment>>> {
        self.segments
            .lock()
            .map_err(|e| BloomError::LockError(e.to_string()))
    }

    fn check_bounds(&self, positions: &[u64]) -> Result<()> {
        if let Some(&max_index) = positions.iter().max() {
            if max_index >= self.capacity {
                return Err(BloomError::IndexOutOfBounds {
                    index: max_index,
                    capacity: self.capacity,
                });
            }
        }
        Ok(())
    }
}

fn segment_lens(capacity: u64, segment_bits: u64) -> Vec<u64> {
    let full = capacity / segment_bits;
    let rest = capacity % segment_bits;
    let mut lens = vec![segment_bits; full as usize];
    if rest > 0 {
        lens.push(rest);
    }
    lens
}

fn zeroed_segment(len: u64) -> Result<Segment> {
    let bits = usize::try_from(len).map_err(|_| {
        BloomError::InvalidConfig(format!("Segment of {len} bits is not addressable"))
    })?;
    let mut segment = Segment::from_vec(vec![0u8; bits.div_ceil(8)]);
    segment.truncate(bits);
    Ok(segment)
}

impl BitStore for LocalBitStore {
    fn set_bits(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.check_bounds(positions)?;
        let mut segments = self.lock()?;
        Ok(positions
            .iter()
            .map(|&index| {
                let (segment, offset) = self.locate(index);
                segments[segment].replace(offset, true)
            })
            .collect())
    }

    fn get_bits(&self, positions: &[u64]) -> Result<Vec<bool>> {
        self.check_bounds(positions)?;
        let segments = self.lock()?;
        Ok(positions
            .iter()
            .map(|&index| {
                let (segment, offset) = self.locate(index);
                segments[segment][offset]
            })
            .collect())
    }

    fn fixed_capacity(&self) -> Option<u64> {
        Some(self.capacity)
    }

    fn clear(&self) -> Result<()> {
        let mut segments = self.lock()?;
        for segment in segments.iter_mut() {
            segment.fill(false);
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocalBitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LocalBitStore {{ capacity: {}, segments: {} }}",
            self.capacity,
            self.segment_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let store = LocalBitStore::new(1_000).unwrap();
        assert_eq!(store.segment_count(), 1);
        assert_eq!(store.set_bits(&[1, 999, 1]).unwrap(), vec![false, false, true]);
        assert_eq!(store.get_bits(&[0, 1, 999]).unwrap(), vec![false, true, true]);
    }

    #[test]
    fn test_out_of_bounds_rejects_whole_batch() {
        let store = LocalBitStore::new(10).unwrap();
        assert_eq!(
            store.set_bits(&[3, 10]),
            Err(BloomError::IndexOutOfBounds {
                index: 10,
                capacity: 10
            })
        );
        assert!(!store.get_bit(3).unwrap());
    }

    #[test]
    fn test_small_segments_route_across_boundary() {
        let store = LocalBitStore::with_segment_bits(20, 8).unwrap();
        assert_eq!(store.segment_count(), 3);
        assert_eq!(store.locate(7), (0, 7));
        assert_eq!(store.locate(8), (1, 0));
        assert_eq!(store.locate(19), (2, 3));

        store.set_bits(&[7, 8, 19]).unwrap();
        assert_eq!(
            store.get_bits(&[6, 7, 8, 9, 18, 19]).unwrap(),
            vec![false, true, true, false, false, true]
        );

        let raw = store.export_segments().unwrap();
        assert_eq!(raw, vec![vec![0x80], vec![0x01], vec![0x08]]);
    }

    #[test]
    fn test_layout_is_reported_without_touching_segments() {
        let store = LocalBitStore::with_segment_bits(20, 8).unwrap();
        assert_eq!(store.fixed_capacity(), Some(20));
        assert_eq!(
            format!("{store:?}"),
            "LocalBitStore { capacity: 20, segments: 3 }"
        );
        // the layout accessors never take the segment lock
        let _held = store.segments.lock().unwrap();
        assert_eq!(store.segment_count(), 3);
        assert!(format!("{store:?}").ends_with("segments: 3 }"));
    }

    #[test]
    fn test_clear_zeroes_every_segment() {
        let store = LocalBitStore::with_segment_bits(16, 8).unwrap();
        store.set_bits(&[0, 15]).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get_bits(&[0, 15]).unwrap(), vec![false, false]);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let source = LocalBitStore::with_segment_bits(30, 16).unwrap();
        source.set_bits(&[0, 5, 16, 29]).unwrap();
        let raw = source.export_segments().unwrap();
        assert_eq!(raw.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2]);

        let target = LocalBitStore::with_segment_bits(30, 16).unwrap();
        target.import_segments(raw).unwrap();
        assert_eq!(
            target.get_bits(&[0, 1, 5, 16, 28, 29]).unwrap(),
            vec![true, false, true, true, false, true]
        );
    }

    #[test]
    fn test_import_rejects_wrong_layout() {
        let store = LocalBitStore::with_segment_bits(30, 16).unwrap();
        assert!(store.import_segments(vec![vec![0; 2]]).is_err());
        assert!(store.import_segments(vec![vec![0; 2], vec![0; 3]]).is_err());
    }

    #[test]
    fn test_one_bit_past_the_segment_limit() {
        let store = LocalBitStore::new(2_147_483_649).unwrap();
        assert_eq!(store.segment_count(), 2);
        assert_eq!(store.locate(2_147_483_647), (0, 2_147_483_647));
        assert_eq!(store.locate(2_147_483_648), (1, 0));

        assert!(!store.set_bit(2_147_483_648).unwrap());
        assert!(store.get_bit(2_147_483_648).unwrap());
        assert!(!store.get_bit(2_147_483_647).unwrap());
    }
}
