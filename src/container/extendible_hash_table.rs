use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::RwLock;

use crate::buffer::buffer_pool_manager::BufferPoolManager;
use crate::common::config::{PageId, HTABLE_DIRECTORY_MAX_DEPTH};
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::concurrency::transaction::Transaction;
use crate::container::hash_function::HashFunction;
use crate::storage::page::hash_table_bucket_page::HashTableBucketPage;
use crate::storage::page::hash_table_directory_page::HashTableDirectoryPage;
use crate::storage::page::page::PagePayload;
use crate::types_db::value::Value;

/// Disk-backed extendible hash table mapping key values to RIDs.
///
/// One directory page addresses `2^global_depth` bucket pages through the
/// buffer pool. Non-unique keys are supported; the `(key, value)` pair is
/// the uniqueness unit. Buckets split as they fill and merge away when they
/// empty, growing and shrinking the directory as local depths allow.
///
/// Concurrency follows a two-level protocol: a table-wide reader/writer
/// latch, then per-bucket page latches. Lookups and single-bucket updates
/// hold the table latch shared; `split_insert` and `merge`, which mutate
/// the directory, hold it exclusive. Page pins are released before latches.
pub struct ExtendibleHashTable {
    index_name: String,
    bpm: Arc<BufferPoolManager>,
    hash_fn: HashFunction,
    bucket_max_size: u32,
    directory_page_id: PageId,
    table_latch: RwLock<()>,
}

impl ExtendibleHashTable {
    /// Creates a table with global depth 1 and two depth-1 buckets.
    pub fn new(
        name: &str,
        bpm: Arc<BufferPoolManager>,
        hash_fn: HashFunction,
        bucket_max_size: u32,
    ) -> Result<Self, DBError> {
        let dir_page = bpm
            .new_page(PagePayload::HashTableDirectory(
                HashTableDirectoryPage::new(HTABLE_DIRECTORY_MAX_DEPTH),
            ))
            .ok_or(DBError::BufferPoolExhausted)?;
        let directory_page_id = dir_page.get_page_id();

        let bucket_0 = bpm
            .new_page(PagePayload::HashTableBucket(HashTableBucketPage::new(
                bucket_max_size,
            )))
            .ok_or(DBError::BufferPoolExhausted)?;
        let bucket_1 = bpm
            .new_page(PagePayload::HashTableBucket(HashTableBucketPage::new(
                bucket_max_size,
            )))
            .ok_or(DBError::BufferPoolExhausted)?;

        {
            let mut dir_guard = dir_page.write();
            if let PagePayload::HashTableDirectory(ref mut dir) = *dir_guard {
                dir.set_page_id(directory_page_id);
                dir.incr_global_depth();
                dir.set_bucket_page_id(0, bucket_0.get_page_id());
                dir.set_local_depth(0, 1);
                dir.set_bucket_page_id(1, bucket_1.get_page_id());
                dir.set_local_depth(1, 1);
            }
        }

        bpm.unpin_page(bucket_0.get_page_id(), true);
        bpm.unpin_page(bucket_1.get_page_id(), true);
        bpm.unpin_page(directory_page_id, true);

        debug!(
            "created extendible hash table '{}' (directory page {})",
            name, directory_page_id
        );
        Ok(Self {
            index_name: name.to_string(),
            bpm,
            hash_fn,
            bucket_max_size,
            directory_page_id,
            table_latch: RwLock::new(()),
        })
    }

    pub fn get_index_name(&self) -> &str {
        &self.index_name
    }

    /// Downcasts the key's 64-bit hash to the 32 bits extendible hashing
    /// addresses with.
    fn hash(&self, key: &Value) -> u32 {
        self.hash_fn.get_hash(key) as u32
    }

    /// Reads the directory slot the key addresses. Caller holds the table
    /// latch in either mode.
    fn key_to_bucket(&self, key: &Value) -> Option<(usize, PageId)> {
        let dir_page = self.bpm.fetch_page(self.directory_page_id)?;
        let result = {
            let dir_guard = dir_page.read();
            match *dir_guard {
                PagePayload::HashTableDirectory(ref dir) => {
                    let idx = dir.hash_to_bucket_index(self.hash(key));
                    Some((idx, dir.get_bucket_page_id(idx)))
                }
                _ => None,
            }
        };
        self.bpm.unpin_page(self.directory_page_id, false);
        result
    }

    /// Collects every value stored under `key`.
    pub fn get_value(&self, key: &Value, _txn: Option<&Transaction>) -> Vec<RID> {
        let _table_guard = self.table_latch.read();

        let mut result = Vec::new();
        let Some((_, bucket_page_id)) = self.key_to_bucket(key) else {
            return result;
        };
        let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
            return result;
        };
        let bucket_guard = bucket_page.read();
        if let PagePayload::HashTableBucket(ref bucket) = *bucket_guard {
            bucket.get_value(key, &mut result);
        }
        self.bpm.unpin_page(bucket_page_id, false);
        drop(bucket_guard);
        result
    }

    /// Inserts a key-value pair. The fast path inserts into a non-full
    /// bucket under the shared table latch; a full bucket falls through to
    /// `split_insert`. Duplicate pairs are rejected.
    pub fn insert(&self, key: &Value, value: RID, txn: Option<&Transaction>) -> bool {
        {
            let _table_guard = self.table_latch.read();

            let Some((_, bucket_page_id)) = self.key_to_bucket(key) else {
                return false;
            };
            let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
                return false;
            };
            let mut bucket_guard = bucket_page.write();
            if let PagePayload::HashTableBucket(ref mut bucket) = *bucket_guard {
                if !bucket.is_full() {
                    let inserted = bucket.insert(key.clone(), value);
                    self.bpm.unpin_page(bucket_page_id, inserted);
                    drop(bucket_guard);
                    return inserted;
                }
            }
            self.bpm.unpin_page(bucket_page_id, false);
            drop(bucket_guard);
        }
        self.split_insert(key, value, txn)
    }

    /// Splits the target bucket until the insert succeeds, growing the
    /// directory when the bucket's local depth has reached the global depth.
    /// A single insert may trigger several consecutive splits when existing
    /// entries keep hashing to one side; each iteration raises the local
    /// depth, so the loop terminates at the directory's maximum depth.
    fn split_insert(&self, key: &Value, value: RID, _txn: Option<&Transaction>) -> bool {
        let _table_guard = self.table_latch.write();

        let Some(dir_page) = self.bpm.fetch_page(self.directory_page_id) else {
            return false;
        };
        let mut dir_guard = dir_page.write();
        let PagePayload::HashTableDirectory(dir) = &mut *dir_guard else {
            self.bpm.unpin_page(self.directory_page_id, false);
            return false;
        };

        let hash = self.hash(key);
        let mut success = false;
        loop {
            let idx = dir.hash_to_bucket_index(hash);
            let bucket_page_id = dir.get_bucket_page_id(idx);
            let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
                break;
            };
            let mut bucket_guard = bucket_page.write();
            let PagePayload::HashTableBucket(bucket) = &mut *bucket_guard else {
                self.bpm.unpin_page(bucket_page_id, false);
                break;
            };

            if !bucket.is_full() {
                success = bucket.insert(key.clone(), value);
                self.bpm.unpin_page(bucket_page_id, success);
                drop(bucket_guard);
                break;
            }

            if dir.get_local_depth(idx) == dir.get_global_depth() && !dir.incr_global_depth() {
                warn!(
                    "index '{}': bucket at slot {:#b} cannot split past max depth",
                    self.index_name, idx
                );
                self.bpm.unpin_page(bucket_page_id, false);
                drop(bucket_guard);
                break;
            }

            dir.incr_local_depth(idx);
            let new_local_depth = dir.get_local_depth(idx);
            let ld_mask = (1u32 << new_local_depth) - 1;
            let split_image_low = ((idx as u32) & ld_mask) ^ (1 << (new_local_depth - 1));

            let Some(split_page) = self.bpm.new_page(PagePayload::HashTableBucket(
                HashTableBucketPage::new(self.bucket_max_size),
            )) else {
                self.bpm.unpin_page(bucket_page_id, false);
                drop(bucket_guard);
                break;
            };
            let split_page_id = split_page.get_page_id();
            trace!(
                "splitting bucket page {} at slot {:#b} (ld {}) into page {}",
                bucket_page_id,
                idx,
                new_local_depth,
                split_page_id
            );

            // Retarget every directory slot that still points at the old
            // bucket: all inherit the new local depth, and those matching
            // the split image's low bits move to the new page.
            for i in 0..dir.size() {
                if dir.get_bucket_page_id(i) == bucket_page_id {
                    dir.set_local_depth(i, new_local_depth);
                    if ((i as u32) & ld_mask) == split_image_low {
                        dir.set_bucket_page_id(i, split_page_id);
                    }
                }
            }

            // Rehash the old bucket's entries between the pair.
            {
                let mut split_guard = split_page.write();
                if let PagePayload::HashTableBucket(ref mut split_bucket) = *split_guard {
                    for (k, v) in bucket.take_all_entries() {
                        if (self.hash(&k) & ld_mask) == split_image_low {
                            split_bucket.insert(k, v);
                        } else {
                            bucket.insert(k, v);
                        }
                    }
                }
            }
            self.bpm.unpin_page(split_page_id, true);
            self.bpm.unpin_page(bucket_page_id, true);
            drop(bucket_guard);
        }

        self.bpm.unpin_page(self.directory_page_id, true);
        success
    }

    /// Removes the exact key-value pair. Emptying a bucket triggers a merge
    /// sweep over the directory.
    pub fn remove(&self, key: &Value, value: &RID, _txn: Option<&Transaction>) -> bool {
        let (removed, now_empty) = {
            let _table_guard = self.table_latch.read();

            let Some((_, bucket_page_id)) = self.key_to_bucket(key) else {
                return false;
            };
            let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
                return false;
            };
            let mut bucket_guard = bucket_page.write();
            let result = match *bucket_guard {
                PagePayload::HashTableBucket(ref mut bucket) => {
                    let removed = bucket.remove(key, value);
                    (removed, bucket.is_empty())
                }
                _ => (false, false),
            };
            self.bpm.unpin_page(bucket_page_id, result.0);
            drop(bucket_guard);
            result
        };

        if removed && now_empty {
            self.merge();
        }
        removed
    }

    /// Sweeps the directory, merging every empty bucket of depth above one
    /// into its split image when the pair agrees on local depth. After each
    /// merge the directory shrinks while all local depths sit strictly
    /// below the global depth. Merges may cascade across the sweep.
    fn merge(&self) {
        let _table_guard = self.table_latch.write();

        let Some(dir_page) = self.bpm.fetch_page(self.directory_page_id) else {
            return;
        };
        let mut dir_guard = dir_page.write();
        let PagePayload::HashTableDirectory(dir) = &mut *dir_guard else {
            self.bpm.unpin_page(self.directory_page_id, false);
            return;
        };

        let mut i = 0;
        // The directory may shrink mid-sweep; re-check the bound each pass.
        while i < dir.size() {
            let local_depth = dir.get_local_depth(i);
            let bucket_page_id = dir.get_bucket_page_id(i);

            let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
                i += 1;
                continue;
            };
            let is_empty = {
                let bucket_guard = bucket_page.read();
                match *bucket_guard {
                    PagePayload::HashTableBucket(ref bucket) => bucket.is_empty(),
                    _ => false,
                }
            };
            self.bpm.unpin_page(bucket_page_id, false);

            if local_depth > 1 && is_empty {
                let split_idx = dir.get_split_image_index(i);
                if dir.get_local_depth(split_idx) == local_depth {
                    dir.decr_local_depth(i);
                    dir.decr_local_depth(split_idx);
                    dir.set_bucket_page_id(i, dir.get_bucket_page_id(split_idx));
                    let surviving_page_id = dir.get_bucket_page_id(i);
                    trace!(
                        "merged empty bucket page {} into page {} (ld {})",
                        bucket_page_id,
                        surviving_page_id,
                        dir.get_local_depth(i)
                    );

                    // Every other slot that addressed either page of the
                    // pair now addresses the surviving page.
                    for j in 0..dir.size() {
                        if j == i || j == split_idx {
                            continue;
                        }
                        let page_id = dir.get_bucket_page_id(j);
                        if page_id == bucket_page_id || page_id == surviving_page_id {
                            dir.set_local_depth(j, dir.get_local_depth(i));
                            dir.set_bucket_page_id(j, surviving_page_id);
                        }
                    }
                    self.bpm.delete_page(bucket_page_id);
                }
                if dir.can_shrink() {
                    dir.decr_global_depth();
                }
            }
            i += 1;
        }

        self.bpm.unpin_page(self.directory_page_id, true);
    }

    pub fn get_global_depth(&self) -> u32 {
        let _table_guard = self.table_latch.read();
        let Some(dir_page) = self.bpm.fetch_page(self.directory_page_id) else {
            return 0;
        };
        let depth = {
            let dir_guard = dir_page.read();
            match *dir_guard {
                PagePayload::HashTableDirectory(ref dir) => dir.get_global_depth(),
                _ => 0,
            }
        };
        self.bpm.unpin_page(self.directory_page_id, false);
        depth
    }

    /// Asserts the directory invariants and that every bucket holds only
    /// keys whose hash agrees with its slot in the low local-depth bits.
    pub fn verify_integrity(&self) {
        let _table_guard = self.table_latch.read();
        let Some(dir_page) = self.bpm.fetch_page(self.directory_page_id) else {
            panic!("directory page unavailable");
        };
        let dir_guard = dir_page.read();
        let PagePayload::HashTableDirectory(dir) = &*dir_guard else {
            panic!("directory page has wrong payload");
        };
        dir.verify_integrity();

        let mut seen = std::collections::HashSet::new();
        for i in 0..dir.size() {
            let bucket_page_id = dir.get_bucket_page_id(i);
            if !seen.insert(bucket_page_id) {
                continue;
            }
            let local_mask = dir.get_local_depth_mask(i);
            let Some(bucket_page) = self.bpm.fetch_page(bucket_page_id) else {
                panic!("bucket page {} unavailable", bucket_page_id);
            };
            {
                let bucket_guard = bucket_page.read();
                if let PagePayload::HashTableBucket(ref bucket) = *bucket_guard {
                    for slot in 0..bucket.get_max_size() as usize {
                        if bucket.is_readable(slot) {
                            let h = self.hash(bucket.key_at(slot));
                            assert_eq!(
                                h & local_mask,
                                (i as u32) & local_mask,
                                "bucket page {} holds a key outside its address range",
                                bucket_page_id
                            );
                        }
                    }
                }
            }
            self.bpm.unpin_page(bucket_page_id, false);
        }
        self.bpm.unpin_page(self.directory_page_id, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::lru_replacer::LruReplacer;
    use crate::common::config::BUFFER_POOL_SIZE;
    use crate::common::logger::initialize_logger;
    use crate::storage::disk::disk_manager::FileDiskManager;
    use tempfile::TempDir;

    struct TestContext {
        bpm: Arc<BufferPoolManager>,
        _temp_dir: TempDir,
    }

    impl TestContext {
        fn new(name: &str) -> Self {
            initialize_logger();
            let temp_dir = TempDir::new().unwrap();
            let disk_manager = Arc::new(
                FileDiskManager::new(temp_dir.path().join(format!("{name}.db"))).unwrap(),
            );
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

    #[test]
    fn test_insert_and_get() {
        let ctx = TestContext::new("test_ht_insert_and_get");
        let ht = ExtendibleHashTable::new("test_index", ctx.bpm.clone(), HashFunction::new(), 8)
            .unwrap();

        let rid1 = RID::new(1, 0);
        let rid2 = RID::new(2, 0);
        assert!(ht.insert(&Value::new(1), rid1, None));
        assert!(ht.insert(&Value::new(2), rid2, None));

        assert_eq!(ht.get_value(&Value::new(1), None), vec![rid1]);
        assert_eq!(ht.get_value(&Value::new(2), None), vec![rid2]);
        assert!(ht.get_value(&Value::new(3), None).is_empty());
        assert_eq!(ht.get_global_depth(), 1);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let ctx = TestContext::new("test_ht_duplicates");
        let ht = ExtendibleHashTable::new("test_index", ctx.bpm.clone(), HashFunction::new(), 8)
            .unwrap();

        let rid = RID::new(1, 0);
        assert!(ht.insert(&Value::new(1), rid, None));
        assert!(!ht.insert(&Value::new(1), rid, None));
        // Same key with a different value is a distinct pair.
        assert!(ht.insert(&Value::new(1), RID::new(1, 1), None));
        assert_eq!(ht.get_value(&Value::new(1), None).len(), 2);
    }

    #[test]
    fn test_insert_remove_roundtrip() {
        let ctx = TestContext::new("test_ht_roundtrip");
        let ht = ExtendibleHashTable::new("test_index", ctx.bpm.clone(), HashFunction::new(), 8)
            .unwrap();

        let rid = RID::new(3, 1);
        assert!(ht.insert(&Value::new(7), rid, None));
        assert!(ht.remove(&Value::new(7), &rid, None));
        assert!(ht.get_value(&Value::new(7), None).is_empty());
        assert!(!ht.remove(&Value::new(7), &rid, None));
    }

    #[test]
    fn test_split_on_full_bucket() {
        let ctx = TestContext::new("test_ht_split");
        // Small buckets force splits quickly.
        let ht = ExtendibleHashTable::new("test_index", ctx.bpm.clone(), HashFunction::new(), 4)
            .unwrap();

        for i in 0..32 {
            assert!(ht.insert(&Value::new(i), RID::new(i as u64, 0), None), "insert {}", i);
        }
        for i in 0..32 {
            assert_eq!(ht.get_value(&Value::new(i), None), vec![RID::new(i as u64, 0)]);
        }
        assert!(ht.get_global_depth() > 1);
        ht.verify_integrity();
    }
}
