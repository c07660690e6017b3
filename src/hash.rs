//! Position generation: turning an element's bytes into `k` bit positions.
//!
//! Every strategy implements [`PositionHasher`]. The built-in strategies are
//! selected by a [`HashMethod`] tag and dispatched through [`HashStrategy`];
//! callers with their own scheme implement [`PositionHasher`] directly.
pub mod adler32;
pub mod crc;
pub mod digest_split;
pub mod double;
pub mod fnv;
pub mod lcg;
pub mod murmur;
pub mod rejection;
pub mod rng;

use crate::error::BloomError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use digest_split::{DigestSplitting, ShaDigest};
pub use double::{DoubleHashing, PairSource};
pub use fnv::FnvSeed;
pub use lcg::LcgExpansion;
pub use rejection::{Checksum, RejectionSampling};
pub use rng::RngExpansion;

/// Maps an element to `hashes` positions in `[0, capacity)`.
///
/// Implementations must be deterministic, must accept empty input and
/// should allocate only the returned `hashes`-sized vector per call.
/// Positions need not be distinct.
pub trait PositionHasher: Send + Sync + fmt::Debug {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64>;

    /// Largest capacity this hasher can address.
    fn max_capacity(&self) -> u64 {
        u64::MAX
    }
}

/// Tag naming one of the built-in position strategies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum HashMethod {
    LcgWithFnv1,
    LcgWithFnv1a,
    LcgModifiedFnv1,
    RngWithFnv1,
    RngWithFnv1a,
    RngModifiedFnv1,
    Crc32,
    Crc32u,
    Adler32,
    Murmur2,
    #[default]
    Murmur3,
    Murmur3KirschMitzenmacher,
    XxHash64,
    XxHash3,
    Crc64,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashMethod {
    pub const ALL: [HashMethod; 19] = [
        HashMethod::LcgWithFnv1,
        HashMethod::LcgWithFnv1a,
        HashMethod::LcgModifiedFnv1,
        HashMethod::RngWithFnv1,
        HashMethod::RngWithFnv1a,
        HashMethod::RngModifiedFnv1,
        HashMethod::Crc32,
        HashMethod::Crc32u,
        HashMethod::Adler32,
        HashMethod::Murmur2,
        HashMethod::Murmur3,
        HashMethod::Murmur3KirschMitzenmacher,
        HashMethod::XxHash64,
        HashMethod::XxHash3,
        HashMethod::Crc64,
        HashMethod::Sha1,
        HashMethod::Sha256,
        HashMethod::Sha384,
        HashMethod::Sha512,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashMethod::LcgWithFnv1 => "LcgWithFnv1",
            HashMethod::LcgWithFnv1a => "LcgWithFnv1a",
            HashMethod::LcgModifiedFnv1 => "LcgModifiedFnv1",
            HashMethod::RngWithFnv1 => "RngWithFnv1",
            HashMethod::RngWithFnv1a => "RngWithFnv1a",
            HashMethod::RngModifiedFnv1 => "RngModifiedFnv1",
            HashMethod::Crc32 => "Crc32",
            HashMethod::Crc32u => "Crc32u",
            HashMethod::Adler32 => "Adler32",
            HashMethod::Murmur2 => "Murmur2",
            HashMethod::Murmur3 => "Murmur3",
            HashMethod::Murmur3KirschMitzenmacher => "Murmur3KirschMitzenmacher",
            HashMethod::XxHash64 => "XxHash64",
            HashMethod::XxHash3 => "XxHash3",
            HashMethod::Crc64 => "Crc64",
            HashMethod::Sha1 => "Sha1",
            HashMethod::Sha256 => "Sha256",
            HashMethod::Sha384 => "Sha384",
            HashMethod::Sha512 => "Sha512",
        }
    }

    pub fn strategy(self) -> HashStrategy {
        HashStrategy::from(self)
    }
}

impl TryFrom<String> for HashMethod {
    type Error = BloomError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<HashMethod> for String {
    fn from(method: HashMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashMethod {
    type Err = BloomError;

    /// Tags match case-insensitively, ignoring `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        HashMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| BloomError::UnknownHashMethod(s.to_string()))
    }
}

/// The closed set of built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStrategy {
    Rejection(RejectionSampling),
    DoubleHashing(DoubleHashing),
    Lcg(LcgExpansion),
    Rng(RngExpansion),
    DigestSplit(DigestSplitting),
}

impl From<HashMethod> for HashStrategy {
    fn from(method: HashMethod) -> Self {
        use HashMethod as M;
        match method {
            M::LcgWithFnv1 => HashStrategy::Lcg(LcgExpansion::new(FnvSeed::Fnv1)),
            M::LcgWithFnv1a => HashStrategy::Lcg(LcgExpansion::new(FnvSeed::Fnv1a)),
            M::LcgModifiedFnv1 => {
                HashStrategy::Lcg(LcgExpansion::new(FnvSeed::ModifiedFnv1))
            }
            M::RngWithFnv1 => HashStrategy::Rng(RngExpansion::new(FnvSeed::Fnv1)),
            M::RngWithFnv1a => HashStrategy::Rng(RngExpansion::new(FnvSeed::Fnv1a)),
            M::RngModifiedFnv1 => {
                HashStrategy::Rng(RngExpansion::new(FnvSeed::ModifiedFnv1))
            }
            M::Crc32 => HashStrategy::Rejection(RejectionSampling::new(Checksum::Crc32)),
            M::Crc32u => {
                HashStrategy::Rejection(RejectionSampling::new(Checksum::Crc32Raw))
            }
            M::Adler32 => {
                HashStrategy::Rejection(RejectionSampling::new(Checksum::Adler32))
            }
            M::Murmur2 => {
                HashStrategy::Rejection(RejectionSampling::new(Checksum::Murmur2))
            }
            M::Murmur3 => {
                HashStrategy::Rejection(RejectionSampling::new(Checksum::Murmur3))
            }
            M::Murmur3KirschMitzenmacher => {
                HashStrategy::DoubleHashing(DoubleHashing::new(PairSource::Murmur3x64))
            }
            M::XxHash64 => {
                HashStrategy::DoubleHashing(DoubleHashing::new(PairSource::XxHash64))
            }
            M::XxHash3 => {
                HashStrategy::DoubleHashing(DoubleHashing::new(PairSource::XxHash3))
            }
            M::Crc64 => HashStrategy::DoubleHashing(DoubleHashing::new(PairSource::Crc64)),
            M::Sha1 => HashStrategy::DigestSplit(DigestSplitting::new(ShaDigest::Sha1)),
            M::Sha256 => {
                HashStrategy::DigestSplit(DigestSplitting::new(ShaDigest::Sha256))
            }
            M::Sha384 => {
                HashStrategy::DigestSplit(DigestSplitting::new(ShaDigest::Sha384))
            }
            M::Sha512 => {
                HashStrategy::DigestSplit(DigestSplitting::new(ShaDigest::Sha512))
            }
        }
    }
}

impl PositionHasher for HashStrategy {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        match self {
            HashStrategy::Rejection(s) => s.compute_positions(data, capacity, hashes),
            HashStrategy::DoubleHashing(s) => s.compute_positions(data, capacity, hashes),
            HashStrategy::Lcg(s) => s.compute_positions(data, capacity, hashes),
            HashStrategy::Rng(s) => s.compute_positions(data, capacity, hashes),
            HashStrategy::DigestSplit(s) => s.compute_positions(data, capacity, hashes),
        }
    }

    fn max_capacity(&self) -> u64 {
        match self {
            HashStrategy::Rejection(s) => s.max_capacity(),
            HashStrategy::DoubleHashing(s) => s.max_capacity(),
            HashStrategy::Lcg(s) => s.max_capacity(),
            HashStrategy::Rng(s) => s.max_capacity(),
            HashStrategy::DigestSplit(s) => s.max_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("Murmur3".parse::<HashMethod>().unwrap(), HashMethod::Murmur3);
        assert_eq!("sha_256".parse::<HashMethod>().unwrap(), HashMethod::Sha256);
        assert_eq!(
            "murmur3-kirsch-mitzenmacher".parse::<HashMethod>().unwrap(),
            HashMethod::Murmur3KirschMitzenmacher
        );
        for method in HashMethod::ALL {
            assert_eq!(method.to_string().parse::<HashMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            "md5".parse::<HashMethod>(),
            Err(BloomError::UnknownHashMethod("md5".to_string()))
        );
    }

    #[test]
    fn test_every_strategy_fills_k_positions_in_range() {
        for method in HashMethod::ALL {
            let strategy = method.strategy();
            for (capacity, hashes) in [(1u64, 1u32), (7, 5), (1_000, 7), (95_851, 13)] {
                for data in [&b""[..], b"x", b"hello world"] {
                    let positions = strategy.compute_positions(data, capacity, hashes);
                    assert_eq!(positions.len(), hashes as usize, "{method}");
                    assert!(
                        positions.iter().all(|&p| p < capacity),
                        "{method} produced out of range position"
                    );
                }
            }
        }
    }

    #[test]
    fn test_every_strategy_is_deterministic() {
        for method in HashMethod::ALL {
            let a = method.strategy().compute_positions(b"element", 10_007, 9);
            let b = method.strategy().compute_positions(b"element", 10_007, 9);
            assert_eq!(a, b, "{method}");
        }
    }

    #[test]
    fn test_strategies_spread_over_the_array() {
        let capacity = 1_000u64;
        // Adler-32 barely mixes short inputs
        for method in HashMethod::ALL.into_iter().filter(|m| *m != HashMethod::Adler32) {
            let strategy = method.strategy();
            let mut buckets = [0usize; 10];
            for i in 0..1_000 {
                let item = format!("element_{i}");
                for p in strategy.compute_positions(item.as_bytes(), capacity, 7) {
                    buckets[(p / 100) as usize] += 1;
                }
            }
            // 7000 positions over 10 buckets, loose bounds
            for (i, count) in buckets.iter().enumerate() {
                assert!(
                    (350..=1_050).contains(count),
                    "{method}: bucket {i} has {count}"
                );
            }
        }
    }
}
