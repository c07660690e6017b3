use bloomset::{BloomFilter, FilterConfigBuilder, HashMethod};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route filter logs to the test output. Honors `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "bloomset=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Consistent test data: `prefix_000000`, `prefix_000001`, ...
#[allow(dead_code)]
pub fn generate_items(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("{prefix}_{i:06}").into_bytes())
        .collect()
}

/// In-process filter sized for `expected_elements` at `error_rate`.
#[allow(dead_code)]
pub fn local_filter(
    method: HashMethod,
    expected_elements: u64,
    error_rate: f64,
) -> BloomFilter {
    let config = FilterConfigBuilder::default()
        .name(format!("test_{method}"))
        .expected_elements(expected_elements)
        .error_rate(error_rate)
        .hash_method(method)
        .build()
        .expect("Failed to build test config");
    BloomFilter::new(config).expect("Failed to create test filter")
}

/// `count` random byte strings of length 0..=64 from a fixed seed.
#[allow(dead_code)]
pub fn random_items(seed: u64, count: usize) -> Vec<Vec<u8>> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.random_range(0..=64);
            (0..len).map(|_| rng.random::<u8>()).collect()
        })
        .collect()
}
