use crate::error::{BloomError, Result};
use crate::hash::HashMethod;
use crate::params::FilterParams;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "bloom";
pub const DEFAULT_EXPECTED_ELEMENTS: u64 = 1_000_000;
pub const DEFAULT_ERROR_RATE: f64 = 0.01;

/// How to build a filter.
///
/// Sizing comes either from `expected_elements` + `error_rate` (the default)
/// or, when both are set, from `capacity` + `hashes`.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
#[serde(default)]
pub struct FilterConfig {
    /// Identity for registries and logs
    #[builder(default = "DEFAULT_NAME.to_string()", setter(into))]
    pub name: String,

    /// Number of elements the filter is sized for
    #[builder(default = "DEFAULT_EXPECTED_ELEMENTS")]
    pub expected_elements: u64,

    /// Target false positive rate (0.0 to 1.0, exclusive)
    #[builder(default = "DEFAULT_ERROR_RATE")]
    pub error_rate: f64,

    /// Bit-array size, for capacity-first sizing
    #[builder(default, setter(strip_option))]
    pub capacity: Option<u64>,

    /// Positions per element, for capacity-first sizing
    #[builder(default, setter(strip_option))]
    pub hashes: Option<u32>,

    #[builder(default)]
    pub hash_method: HashMethod,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            error_rate: DEFAULT_ERROR_RATE,
            capacity: None,
            hashes: None,
            hash_method: HashMethod::default(),
        }
    }
}

impl FilterConfig {
    /// Validates the configuration and derives the missing sizing pair.
    pub fn params(&self) -> Result<FilterParams> {
        match (self.capacity, self.hashes) {
            (Some(capacity), Some(hashes)) => {
                FilterParams::from_capacity(capacity, hashes)
            }
            (None, None) => {
                FilterParams::from_error_rate(self.expected_elements, self.error_rate)
            }
            _ => Err(BloomError::InvalidConfig(
                "Capacity and hashes must be set together".into(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params().map(|_| ())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = FilterConfigBuilder::default().build().unwrap();
        assert_eq!(config, FilterConfig::default());
        let params = config.params().unwrap();
        assert_eq!(params.expected_elements, DEFAULT_EXPECTED_ELEMENTS);
        assert_eq!(params.error_rate, DEFAULT_ERROR_RATE);
    }

    #[test]
    fn test_capacity_pair_takes_precedence() {
        let config = FilterConfigBuilder::default()
            .capacity(95_851)
            .hashes(7)
            .build()
            .unwrap();
        let params = config.params().unwrap();
        assert_eq!(params.capacity, 95_851);
        assert_eq!(params.hashes, 7);
        assert_eq!(params.expected_elements, 9_492);
    }

    #[test]
    fn test_half_capacity_pair_is_rejected() {
        let config = FilterConfigBuilder::default().capacity(100).build().unwrap();
        assert!(matches!(config.validate(), Err(BloomError::InvalidConfig(_))));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let config = FilterConfigBuilder::default()
            .name("users")
            .hash_method(HashMethod::Sha256)
            .expected_elements(500)
            .build()
            .unwrap();
        let restored = FilterConfig::from_bytes(&config.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            FilterConfig::from_bytes(br#"{"name":"x","hash_method":"xx_hash3"}"#).unwrap();
        assert_eq!(config.hash_method, HashMethod::XxHash3);
        assert_eq!(config.expected_elements, DEFAULT_EXPECTED_ELEMENTS);
    }

    #[test]
    fn test_unknown_method_in_json_fails() {
        let result = FilterConfig::from_bytes(br#"{"hash_method":"Md5"}"#);
        assert!(matches!(result, Err(BloomError::SerializationError(_))));
    }
}
