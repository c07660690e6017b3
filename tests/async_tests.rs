mod common;

use bloomset::{
    BloomFilter, FilterConfigBuilder, HashMethod, MemoryBitmap, RemoteBitStore,
};
use common::test_utils::{generate_items, init_tracing, local_filter};
use std::sync::Arc;

#[cfg(test)]
mod local_async_tests {
    use super::*;

    #[tokio::test]
    async fn test_async_add_and_contains() {
        init_tracing();
        let filter = local_filter(HashMethod::Murmur3KirschMitzenmacher, 1_000, 0.01);

        assert!(filter.add_async(b"async").await.unwrap());
        assert!(!filter.add_async(b"async").await.unwrap());
        assert!(filter.contains_async(b"async").await.unwrap());
        assert_eq!(
            filter.compute_positions_async(b"async").await,
            filter.compute_positions(b"async")
        );
    }

    #[tokio::test]
    async fn test_async_bulk_matches_sync() {
        let items = generate_items("bulk", 200);
        let sync_filter = local_filter(HashMethod::RngWithFnv1a, 1_000, 0.01);
        let async_filter = local_filter(HashMethod::RngWithFnv1a, 1_000, 0.01);

        assert_eq!(
            async_filter.add_bulk_async(&items).await.unwrap(),
            sync_filter.add_bulk(&items).unwrap()
        );
        assert!(async_filter.all_async(&items).await.unwrap());

        async_filter.clear_async().await.unwrap();
        let after = async_filter.contains_bulk_async(&items).await.unwrap();
        assert!(after.iter().all(|found| !found));
    }

    #[tokio::test]
    async fn test_contains_bulk_async_answers_in_input_order() {
        let filter = local_filter(HashMethod::Murmur3, 10_000, 0.01);
        filter.add_async(b"e1").await.unwrap();

        assert_eq!(
            filter.contains_bulk_async(&[&b"e1"[..], b"e2"]).await.unwrap(),
            vec![true, false]
        );
        assert_eq!(
            filter.contains_bulk_async(&[&b"e2"[..], b"e1"]).await.unwrap(),
            vec![false, true]
        );
    }
}

#[cfg(test)]
mod remote_async_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_on_shared_connection() {
        let connection = Arc::new(MemoryBitmap::new());
        let config = FilterConfigBuilder::default()
            .name("tasks")
            .expected_elements(5_000)
            .error_rate(0.01)
            .hash_method(HashMethod::XxHash3)
            .build()
            .unwrap();
        let store = RemoteBitStore::new(connection, "tasks").unwrap();
        let filter = Arc::new(BloomFilter::with_store(config, store).unwrap());

        let mut handles = Vec::new();
        for t in 0..4 {
            let filter = Arc::clone(&filter);
            handles.push(tokio::spawn(async move {
                let items = generate_items(&format!("task{t}"), 250);
                filter.add_bulk_async(&items).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for t in 0..4 {
            let items = generate_items(&format!("task{t}"), 250);
            assert!(filter.all_async(&items).await.unwrap(), "task {t}");
        }
    }
}
