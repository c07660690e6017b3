use thiserror::Error;

pub type Result<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BloomError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown hash method: {0}")]
    UnknownHashMethod(String),

    #[error(
        "Capacity {capacity} is not addressable by this hash method (max {max})"
    )]
    CapacityUnsupported { capacity: u64, max: u64 },

    #[error("Index out of bounds: {index} >= {capacity}")]
    IndexOutOfBounds { index: u64, capacity: u64 },

    #[error("Hasher returned {got} positions, expected {expected}")]
    PositionCount { expected: u32, got: usize },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BloomError {
    fn from(err: serde_json::Error) -> Self {
        BloomError::SerializationError(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for BloomError {
    fn from(err: redis::RedisError) -> Self {
        BloomError::Backend(err.to_string())
    }
}
