use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use rookdb::buffer::buffer_pool_manager::BufferPoolManager;
use rookdb::buffer::lru_replacer::LruReplacer;
use rookdb::common::config::BUFFER_POOL_SIZE;
use rookdb::common::logger::initialize_logger;
use rookdb::common::rid::RID;
use rookdb::container::extendible_hash_table::ExtendibleHashTable;
use rookdb::container::hash_function::HashFunction;
use rookdb::storage::disk::disk_manager::FileDiskManager;
use rookdb::types_db::value::Value;

struct TestContext {
    bpm: Arc<BufferPoolManager>,
    _temp_dir: TempDir,
}

impl TestContext {
    fn new(name: &str) -> Self {
        initialize_logger();
        let temp_dir = TempDir::new().unwrap();
        let disk_manager =
            Arc::new(FileDiskManager::new(temp_dir.path().join(format!("{name}.db"))).unwrap());
        let replacer = Arc::new(LruReplacer::new(BUFFER_POOL_SIZE));
        let bpm = Arc::new(BufferPoolManager::new(
            BUFFER_POOL_SIZE,
            disk_manager,
            replacer,
        ));
        Self {
            bpm,
            _temp_dir: temp_dir,
        }
    }
}

fn rid(i: u64) -> RID {
    RID::new(i, 0)
}

/// With the identity hash and two-slot buckets, keys 0, 4 and 8 all share
/// their two low bits, so the third insert must split twice in a row: the
/// first split separates nothing and only the depth-3 split pulls key 4
/// away from keys 0 and 8.
#[test]
fn test_cascading_split_reaches_depth_three() {
    let ctx = TestContext::new("test_split_cascade");
    let ht = ExtendibleHashTable::new("cascade", ctx.bpm.clone(), HashFunction::identity(), 2)
        .unwrap();

    assert!(ht.insert(&Value::new(0), rid(0), None));
    assert!(ht.insert(&Value::new(4), rid(4), None));
    assert_eq!(ht.get_global_depth(), 1);

    assert!(ht.insert(&Value::new(8), rid(8), None));
    assert_eq!(ht.get_global_depth(), 3);

    for key in [0, 4, 8] {
        assert_eq!(ht.get_value(&Value::new(key), None), vec![rid(key as u64)]);
    }
    ht.verify_integrity();
}

/// Removing entries collapses the depth-3 buckets pairwise and the
/// directory shrinks back one level at a time.
#[test]
fn test_merge_shrinks_directory() {
    let ctx = TestContext::new("test_merge_shrink");
    let ht = ExtendibleHashTable::new("shrink", ctx.bpm.clone(), HashFunction::identity(), 2)
        .unwrap();

    for key in [0, 4, 8] {
        assert!(ht.insert(&Value::new(key), rid(key as u64), None));
    }
    assert_eq!(ht.get_global_depth(), 3);

    // Emptying the bucket holding key 4 merges it with its split image and
    // lets the directory drop one level.
    assert!(ht.remove(&Value::new(4), &rid(4), None));
    assert_eq!(ht.get_global_depth(), 2);
    ht.verify_integrity();

    // Emptying the last deep bucket collapses the directory to depth 1.
    assert!(ht.remove(&Value::new(8), &rid(8), None));
    assert!(ht.remove(&Value::new(0), &rid(0), None));
    assert_eq!(ht.get_global_depth(), 1);
    ht.verify_integrity();

    assert!(ht.get_value(&Value::new(0), None).is_empty());
    assert!(ht.get_value(&Value::new(4), None).is_empty());
    assert!(ht.get_value(&Value::new(8), None).is_empty());
}

/// Any interleaving of inserts and removes must preserve the directory
/// invariants. Runs a seeded random workload against a model map.
#[test]
fn test_random_interleaving_preserves_invariants() {
    let ctx = TestContext::new("test_random_ops");
    let ht = ExtendibleHashTable::new("random", ctx.bpm.clone(), HashFunction::new(), 8)
        .unwrap();

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut model = std::collections::HashSet::new();

    for step in 0..1000 {
        let key = rng.gen_range(0..200);
        if model.contains(&key) && rng.gen_bool(0.4) {
            assert!(ht.remove(&Value::new(key), &rid(key as u64), None));
            model.remove(&key);
        } else if !model.contains(&key) {
            assert!(ht.insert(&Value::new(key), rid(key as u64), None));
            model.insert(key);
        }
        if step % 100 == 99 {
            ht.verify_integrity();
        }
    }

    ht.verify_integrity();
    for key in 0..200 {
        let found = ht.get_value(&Value::new(key), None);
        if model.contains(&key) {
            assert_eq!(found, vec![rid(key as u64)], "key {} lost", key);
        } else {
            assert!(found.is_empty(), "key {} resurrected", key);
        }
    }
}

/// Concurrent inserters over disjoint key ranges must all land, with the
/// table-level latch serializing directory growth.
#[test]
fn test_concurrent_inserts() {
    let ctx = TestContext::new("test_concurrent_inserts");
    let ht = Arc::new(
        ExtendibleHashTable::new("concurrent", ctx.bpm.clone(), HashFunction::new(), 8).unwrap(),
    );

    let mut handles = Vec::new();
    for t in 0..4u64 {
        let ht = Arc::clone(&ht);
        handles.push(thread::spawn(move || {
            for i in 0..50u64 {
                let key = t * 50 + i;
                assert!(ht.insert(&Value::new(key as i64), rid(key), None));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for key in 0..200u64 {
        assert_eq!(ht.get_value(&Value::new(key as i64), None), vec![rid(key)]);
    }
    ht.verify_integrity();
}
