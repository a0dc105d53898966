use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::common::config::PageId;
use crate::storage::page::hash_table_bucket_page::HashTableBucketPage;
use crate::storage::page::hash_table_directory_page::HashTableDirectoryPage;

/// Typed content of a buffer pool page. Pages are fixed-size byte arrays on
/// disk; in memory they are interpreted according to this tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PagePayload {
    Raw(Vec<u8>),
    HashTableDirectory(HashTableDirectoryPage),
    HashTableBucket(HashTableBucketPage),
}

impl Default for PagePayload {
    fn default() -> Self {
        PagePayload::Raw(Vec::new())
    }
}

/// A page resident in a buffer pool frame. The payload lock doubles as the
/// page latch: readers of a bucket page take it shared, writers exclusive.
#[derive(Debug)]
pub struct Page {
    page_id: PageId,
    pin_count: AtomicI32,
    is_dirty: AtomicBool,
    payload: RwLock<PagePayload>,
}

impl Page {
    pub fn new(page_id: PageId, payload: PagePayload) -> Self {
        Self {
            page_id,
            pin_count: AtomicI32::new(0),
            is_dirty: AtomicBool::new(false),
            payload: RwLock::new(payload),
        }
    }

    pub fn get_page_id(&self) -> PageId {
        self.page_id
    }

    pub fn get_pin_count(&self) -> i32 {
        self.pin_count.load(Ordering::SeqCst)
    }

    pub fn incr_pin_count(&self) -> i32 {
        self.pin_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn decr_pin_count(&self) -> i32 {
        self.pin_count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::SeqCst)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.is_dirty.store(dirty, Ordering::SeqCst);
    }

    /// Acquires the page latch shared.
    pub fn read(&self) -> RwLockReadGuard<'_, PagePayload> {
        self.payload.read()
    }

    /// Acquires the page latch exclusive.
    pub fn write(&self) -> RwLockWriteGuard<'_, PagePayload> {
        self.payload.write()
    }
}
