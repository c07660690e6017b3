//! Closed-form Bloom filter sizing.
//!
//! * `m` - number of bits in the array (capacity)
//! * `k` - number of positions per element (hashes)
//! * `n` - number of elements the filter is sized for
//! * `p` - false positive probability
use crate::error::{BloomError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Optimal bit-array size for `n` elements at false positive rate `p`.
pub fn best_m(n: u64, p: f64) -> u64 {
    (-1.0 * (n as f64 * p.ln()) / LN_2.powi(2)).ceil() as u64
}

/// Optimal number of hashes for `n` elements in `m` bits.
pub fn best_k(n: u64, m: u64) -> u32 {
    (LN_2 * m as f64 / n as f64).ceil() as u32
}

/// Number of elements for which `k` hashes over `m` bits is optimal.
pub fn best_n(k: u32, m: u64) -> u64 {
    (LN_2 * m as f64 / k as f64).ceil() as u64
}

/// False positive probability after `inserted` elements.
pub fn best_p(k: u32, m: u64, inserted: u64) -> f64 {
    (1.0 - (-(k as f64) * inserted as f64 / m as f64).exp()).powf(k as f64)
}

/// The resolved sizing quad of a filter. One pair is supplied by the
/// caller, the other is derived once and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub capacity: u64,
    pub hashes: u32,
    pub expected_elements: u64,
    pub error_rate: f64,
}

impl FilterParams {
    /// Size the filter for `expected_elements` at `error_rate`.
    pub fn from_error_rate(expected_elements: u64, error_rate: f64) -> Result<Self> {
        if expected_elements < 1 {
            return Err(BloomError::InvalidConfig(
                "Expected elements must be > 0".into(),
            ));
        }
        check_error_rate(error_rate)?;

        let capacity = best_m(expected_elements, error_rate);
        let hashes = best_k(expected_elements, capacity);

        Ok(Self {
            capacity,
            hashes,
            expected_elements,
            error_rate,
        })
    }

    /// Take `capacity` and `hashes` as given and derive the element count
    /// and error rate they are optimal for.
    pub fn from_capacity(capacity: u64, hashes: u32) -> Result<Self> {
        if capacity < 1 {
            return Err(BloomError::InvalidConfig("Capacity must be > 0".into()));
        }
        if hashes < 1 {
            return Err(BloomError::InvalidConfig("Hashes must be > 0".into()));
        }

        let expected_elements = best_n(hashes, capacity);
        let error_rate = best_p(hashes, capacity, expected_elements);
        // Very small arrays with many hashes saturate to p == 1.0.
        check_error_rate(error_rate).map_err(|_| {
            BloomError::InvalidConfig(format!(
                "Capacity {capacity} with {hashes} hashes yields error rate {error_rate}"
            ))
        })?;

        Ok(Self {
            capacity,
            hashes,
            expected_elements,
            error_rate,
        })
    }

    /// Rebuilds a previously resolved quad as-is, checking every invariant
    /// but deriving nothing.
    pub fn restore(
        capacity: u64,
        hashes: u32,
        expected_elements: u64,
        error_rate: f64,
    ) -> Result<Self> {
        if capacity < 1 || hashes < 1 || expected_elements < 1 {
            return Err(BloomError::InvalidConfig(format!(
                "Invalid sizing: capacity {capacity}, hashes {hashes}, expected elements {expected_elements}"
            )));
        }
        check_error_rate(error_rate)?;
        Ok(Self {
            capacity,
            hashes,
            expected_elements,
            error_rate,
        })
    }
}

fn check_error_rate(error_rate: f64) -> Result<()> {
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(BloomError::InvalidConfig(format!(
            "Error rate must be between 0 and 1, got {error_rate}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(best_m(10_000, 0.01), 95_851);
        assert_eq!(best_k(10_000, 95_851), 7);
    }

    #[test]
    fn test_best_n_is_ceiling() {
        // ln2 * 95851 / 7 = 9491.3...
        assert_eq!(best_n(7, 95_851), 9_492);
        assert_eq!(best_n(1, 1), 1);
    }

    #[test]
    fn test_best_p_bounds() {
        assert_eq!(best_p(7, 95_851, 0), 0.0);
        let p = best_p(7, 95_851, 10_000);
        assert!(p > 0.0 && p < 0.011, "p = {p}");
        // more elements, worse rate
        assert!(best_p(7, 95_851, 20_000) > p);
    }

    #[test]
    fn test_derived_rate_stays_near_target() {
        for (n, p) in [(1, 0.5), (1_000, 0.01), (10_000, 0.001), (1_000_000, 0.1)] {
            let params = FilterParams::from_error_rate(n, p).unwrap();
            assert!(params.hashes >= 1);
            let actual = best_p(params.hashes, params.capacity, n);
            // k is rounded up, which can overshoot the target by a few percent
            assert!(actual <= p * 1.05, "n={n} p={p} actual={actual}");
        }
    }

    #[test]
    fn test_capacity_roundtrip_is_fixed_point() {
        for (m, k) in [(95_851, 7), (1_000_000, 10), (4_096, 3)] {
            let first = FilterParams::from_capacity(m, k).unwrap();
            let second = FilterParams::from_error_rate(
                first.expected_elements,
                first.error_rate,
            )
            .unwrap();
            assert_eq!(second.capacity, m);
            assert_eq!(second.hashes, k);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(FilterParams::from_error_rate(0, 0.01).is_err());
        assert!(FilterParams::from_error_rate(10, 0.0).is_err());
        assert!(FilterParams::from_error_rate(10, 1.0).is_err());
        assert!(FilterParams::from_error_rate(10, f64::NAN).is_err());
        assert!(FilterParams::from_capacity(0, 3).is_err());
        assert!(FilterParams::from_capacity(100, 0).is_err());
        assert!(FilterParams::from_capacity(1, 100).is_err());
    }
}
