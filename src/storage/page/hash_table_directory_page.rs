use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::common::config::{PageId, HTABLE_DIRECTORY_MAX_DEPTH, INVALID_PAGE_ID};

/// Directory page of the extendible hash table.
///
/// Holds the global depth and, for each of the `2^global_depth` directory
/// slots, the page id of the bucket it addresses and that bucket's local
/// depth. Two slots share a bucket page iff they agree in the bucket's low
/// `local_depth` bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashTableDirectoryPage {
    page_id: PageId,
    max_depth: u32,
    global_depth: u32,
    local_depths: Vec<u8>,
    bucket_page_ids: Vec<PageId>,
}

impl HashTableDirectoryPage {
    pub fn new(max_depth: u32) -> Self {
        Self {
            page_id: INVALID_PAGE_ID,
            max_depth: max_depth.min(HTABLE_DIRECTORY_MAX_DEPTH),
            global_depth: 0,
            local_depths: vec![0],
            bucket_page_ids: vec![INVALID_PAGE_ID],
        }
    }

    pub fn get_page_id(&self) -> PageId {
        self.page_id
    }

    pub fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    pub fn get_global_depth(&self) -> u32 {
        self.global_depth
    }

    pub fn get_max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Number of live directory slots, `2^global_depth`.
    pub fn size(&self) -> usize {
        1 << self.global_depth
    }

    pub fn get_global_depth_mask(&self) -> u32 {
        (1 << self.global_depth) - 1
    }

    pub fn get_local_depth_mask(&self, bucket_idx: usize) -> u32 {
        let ld = self.local_depths[bucket_idx] as u32;
        if ld == 0 {
            return 0;
        }
        (1 << ld) - 1
    }

    /// Maps a 32-bit key hash to its directory slot.
    pub fn hash_to_bucket_index(&self, hash: u32) -> usize {
        (hash & self.get_global_depth_mask()) as usize
    }

    pub fn get_bucket_page_id(&self, bucket_idx: usize) -> PageId {
        self.bucket_page_ids[bucket_idx]
    }

    pub fn set_bucket_page_id(&mut self, bucket_idx: usize, bucket_page_id: PageId) {
        self.bucket_page_ids[bucket_idx] = bucket_page_id;
    }

    pub fn get_local_depth(&self, bucket_idx: usize) -> u32 {
        self.local_depths[bucket_idx] as u32
    }

    pub fn set_local_depth(&mut self, bucket_idx: usize, local_depth: u32) {
        self.local_depths[bucket_idx] = local_depth as u8;
    }

    pub fn incr_local_depth(&mut self, bucket_idx: usize) {
        self.local_depths[bucket_idx] += 1;
    }

    pub fn decr_local_depth(&mut self, bucket_idx: usize) {
        self.local_depths[bucket_idx] -= 1;
    }

    /// The slot differing from `bucket_idx` only in the bit introduced by the
    /// bucket's most recent local-depth increase.
    pub fn get_split_image_index(&self, bucket_idx: usize) -> usize {
        let ld = self.local_depths[bucket_idx] as u32;
        if ld == 0 {
            return 0;
        }
        bucket_idx ^ (1 << (ld - 1))
    }

    /// Doubles the directory. The new upper half mirrors the lower half so
    /// that every slot keeps addressing the bucket it addressed before.
    pub fn incr_global_depth(&mut self) -> bool {
        if self.global_depth >= self.max_depth {
            warn!(
                "directory cannot grow past max depth {}",
                self.max_depth
            );
            return false;
        }
        let old_size = self.size();
        for i in 0..old_size {
            self.local_depths.push(self.local_depths[i]);
            self.bucket_page_ids.push(self.bucket_page_ids[i]);
        }
        self.global_depth += 1;
        debug!("directory grew to global depth {}", self.global_depth);
        true
    }

    pub fn decr_global_depth(&mut self) {
        assert!(self.global_depth > 0, "directory cannot shrink below depth 0");
        self.global_depth -= 1;
        let new_size = self.size();
        self.local_depths.truncate(new_size);
        self.bucket_page_ids.truncate(new_size);
        debug!("directory shrank to global depth {}", self.global_depth);
    }

    /// The directory may shrink only while every local depth is strictly
    /// below the global depth.
    pub fn can_shrink(&self) -> bool {
        self.local_depths[..self.size()]
            .iter()
            .all(|&ld| (ld as u32) < self.global_depth)
    }

    /// Checks the structural invariants of the directory:
    ///
    /// 1. every local depth is at most the global depth,
    /// 2. each bucket page is referenced by exactly `2^(GD - LD)` slots,
    /// 3. all slots referencing one bucket page agree on its local depth and
    ///    on their low `LD` bits.
    ///
    /// Panics on violation; used by tests and debug assertions.
    pub fn verify_integrity(&self) {
        let mut page_id_count: HashMap<PageId, usize> = HashMap::new();
        let mut page_id_depth: HashMap<PageId, u32> = HashMap::new();
        let mut page_id_low_bits: HashMap<PageId, usize> = HashMap::new();

        for i in 0..self.size() {
            let ld = self.get_local_depth(i);
            let page_id = self.get_bucket_page_id(i);
            assert!(
                ld <= self.global_depth,
                "local depth {} at slot {} exceeds global depth {}",
                ld,
                i,
                self.global_depth
            );
            assert_ne!(page_id, INVALID_PAGE_ID, "slot {} has no bucket", i);

            *page_id_count.entry(page_id).or_insert(0) += 1;

            let low_bits = i & ((1usize << ld) - 1);
            match page_id_depth.get(&page_id) {
                Some(&seen) => assert_eq!(
                    seen, ld,
                    "slots sharing bucket page {} disagree on local depth",
                    page_id
                ),
                None => {
                    page_id_depth.insert(page_id, ld);
                    page_id_low_bits.insert(page_id, low_bits);
                }
            }
            assert_eq!(
                page_id_low_bits[&page_id], low_bits,
                "slot {} shares bucket page {} but differs in its low {} bits",
                i, page_id, ld
            );
        }

        for (page_id, count) in page_id_count {
            let ld = page_id_depth[&page_id];
            let expected = 1usize << (self.global_depth - ld);
            assert_eq!(
                count, expected,
                "bucket page {} referenced by {} slots, expected {}",
                page_id, count, expected
            );
        }
    }

    pub fn print_directory(&self) {
        debug!("--- directory (GD={}) ---", self.global_depth);
        for i in 0..self.size() {
            debug!(
                "  [{:#05b}] -> page {} (ld {})",
                i,
                self.bucket_page_ids[i],
                self.local_depths[i]
            );
        }
    }
}
