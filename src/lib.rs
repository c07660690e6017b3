//! Bloom filter with pluggable position hashers and local or remote storage.
//!
//! A filter answers "possibly present" or "definitely absent" for byte
//! strings. It is built from a [`FilterConfig`] and owns three things:
//!
//! * Sizing: either `expected_elements` + `error_rate`, from which the bit
//!   count `m` and hash count `k` are derived, or `capacity` + `hashes`
//!   taken as given.
//! * A position hasher: one of the [`HashMethod`] tags, or any type
//!   implementing [`PositionHasher`].
//! * A [`BitStore`]: a segmented in-process bit array ([`LocalBitStore`]) or
//!   one key of a remote bitmap ([`RemoteBitStore`]) shared with other
//!   filters.
//!
//! Insertion:
//!     * The element's `k` positions are computed and set in one store call.
//!     * The call returns `true` when at least one bit was previously clear.
//! Query:
//!     * The element is reported present when all `k` bits are set.
//! Bulk:
//!     * `add_bulk`/`contains_bulk` issue a single store call for the whole
//!       batch and fold the flat results back per element, in input order.
//!
//! Caveats:
//!     * Elements cannot be removed; `clear` resets everything.
//!     * The 32-bit rejection-sampling methods cap capacity at 2**32-1.

pub mod config;
mod error;
mod filter;
pub mod hash;
pub mod params;
pub mod reduce;
mod snapshot;
pub mod storage;

pub use config::{FilterConfig, FilterConfigBuilder, FilterConfigBuilderError};
pub use error::{BloomError, Result};
pub use filter::BloomFilter;
pub use hash::{HashMethod, HashStrategy, PositionHasher};
pub use params::{FilterParams, best_k, best_m, best_n, best_p};
pub use snapshot::FilterSnapshot;
#[cfg(feature = "redis")]
pub use storage::RedisBitmap;
pub use storage::{
    BitStore, LocalBitStore, MemoryBitmap, RemoteBitOperate, RemoteBitStore,
};
