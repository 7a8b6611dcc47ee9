//! Locking Integration Tests
//!
//! Concurrency behavior of the local tier: serialized writers, coexisting
//! shared readers, and intact blobs under contention.

mod common;

use std::sync::Arc;

use certfleet_store::{CachingStore, DirLock, StoreFS, StoreOptions};
use common::MemStore;
use tempfile::TempDir;

fn writable_store(cache_dir: &std::path::Path) -> CachingStore {
    CachingStore::new(
        cache_dir,
        Arc::new(MemStore::default()) as Arc<dyn StoreFS>,
        StoreOptions::default(),
    )
    .unwrap()
}

// ============================================================================
// Write Contention
// ============================================================================

mod write_contention {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_leave_one_intact_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(writable_store(&temp_dir.path().join("cache")));

        // Payloads of very different sizes so a torn write would be
        // detectable as a mixed-length blob.
        let payloads: Vec<Vec<u8>> = (0..8)
            .map(|i| vec![b'a' + i as u8; 1024 * (i + 1)])
            .collect();

        let mut handles = Vec::new();
        for payload in payloads.clone() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..5 {
                    store.put("example.com+rsa", &payload).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.get("example.com+rsa").await.unwrap();
        assert!(
            payloads.contains(&stored),
            "stored blob does not match any writer's payload (len {})",
            stored.len()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contending_instances_on_one_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");

        let a = Arc::new(writable_store(&cache_dir));
        let b = Arc::new(writable_store(&cache_dir));

        let put_a = {
            let a = Arc::clone(&a);
            tokio::spawn(async move {
                for i in 0..10u32 {
                    a.put("shared+token", format!("a{i}").as_bytes())
                        .await
                        .unwrap();
                }
            })
        };
        let put_b = {
            let b = Arc::clone(&b);
            tokio::spawn(async move {
                for i in 0..10u32 {
                    b.put("shared+token", format!("b{i}").as_bytes())
                        .await
                        .unwrap();
                }
            })
        };
        put_a.await.unwrap();
        put_b.await.unwrap();

        let stored = a.get("shared+token").await.unwrap();
        let text = String::from_utf8(stored).unwrap();
        assert!(text == "a9" || text == "b9", "unexpected final value {text}");
    }
}

// ============================================================================
// Reader Coexistence
// ============================================================================

mod reader_coexistence {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readonly_stores_read_concurrently() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");

        let writer = writable_store(&cache_dir);
        writer.put("example.com+rsa", b"private").await.unwrap();

        let readonly = || {
            CachingStore::new(
                &cache_dir,
                Arc::new(MemStore::default()) as Arc<dyn StoreFS>,
                StoreOptions {
                    readonly: true,
                    ..Default::default()
                },
            )
            .unwrap()
        };

        let mut handles = Vec::new();
        for _ in 0..4 {
            let reader = readonly();
            handles.push(tokio::spawn(async move {
                for _ in 0..20 {
                    assert_eq!(reader.get("example.com+rsa").await.unwrap(), b"private");
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[test]
    fn test_shared_guards_overlap_while_exclusive_waits() {
        use std::sync::mpsc;
        use std::time::Duration;

        let temp_dir = TempDir::new().unwrap();
        let lock = DirLock::new(temp_dir.path());
        drop(lock.exclusive().unwrap());

        let s1 = lock.shared().unwrap();
        let s2 = lock.shared().unwrap();

        let (tx, rx) = mpsc::channel();
        let contender = {
            let lock = lock.clone();
            std::thread::spawn(move || {
                let guard = lock.exclusive().unwrap();
                tx.send(()).unwrap();
                drop(guard);
            })
        };

        // The exclusive acquisition must wait while any shared guard lives.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(s1);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(s2);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        contender.join().unwrap();
    }
}
