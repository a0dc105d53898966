use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::buffer::lru_replacer::LruReplacer;
use crate::common::config::{FrameId, PageId, DB_PAGE_SIZE};
use crate::storage::disk::disk_manager::FileDiskManager;
use crate::storage::page::page::{Page, PagePayload};

/// Manages the pool of in-memory page frames backed by the disk manager.
///
/// Frames are handed out from the free list first, then by evicting the
/// replacer's victim. Pinned pages are never evicted; a page's pin count
/// reaching zero is what makes its frame evictable.
pub struct BufferPoolManager {
    pool_size: usize,
    next_page_id: AtomicU64,
    inner: Mutex<PoolState>,
    replacer: Arc<LruReplacer>,
    disk_manager: Arc<FileDiskManager>,
}

struct PoolState {
    frames: Vec<Option<Arc<Page>>>,
    page_table: HashMap<PageId, FrameId>,
    free_list: Vec<FrameId>,
}

impl BufferPoolManager {
    pub fn new(
        pool_size: usize,
        disk_manager: Arc<FileDiskManager>,
        replacer: Arc<LruReplacer>,
    ) -> Self {
        let free_list = (0..pool_size as FrameId).rev().collect();
        Self {
            pool_size,
            next_page_id: AtomicU64::new(0),
            inner: Mutex::new(PoolState {
                frames: (0..pool_size).map(|_| None).collect(),
                page_table: HashMap::new(),
                free_list,
            }),
            replacer,
            disk_manager,
        }
    }

    pub fn get_pool_size(&self) -> usize {
        self.pool_size
    }

    /// Allocates a fresh page, pins it, and returns it. Returns `None` when
    /// every frame is pinned.
    pub fn new_page(&self, payload: PagePayload) -> Option<Arc<Page>> {
        let frame_id = self.acquire_frame()?;

        let page_id = self.next_page_id.fetch_add(1, Ordering::SeqCst);
        let page = Arc::new(Page::new(page_id, payload));
        page.incr_pin_count();
        self.replacer.pin(frame_id);

        let mut state = self.inner.lock();
        state.frames[frame_id as usize] = Some(Arc::clone(&page));
        state.page_table.insert(page_id, frame_id);
        debug!("allocated page {} in frame {}", page_id, frame_id);
        Some(page)
    }

    /// Pins and returns the requested page, reading it from disk if absent.
    /// Returns `None` when the page must be loaded but every frame is pinned.
    pub fn fetch_page(&self, page_id: PageId) -> Option<Arc<Page>> {
        {
            let state = self.inner.lock();
            if let Some(&frame_id) = state.page_table.get(&page_id) {
                let page = Arc::clone(state.frames[frame_id as usize].as_ref()?);
                page.incr_pin_count();
                self.replacer.pin(frame_id);
                return Some(page);
            }
        }

        let frame_id = self.acquire_frame()?;

        let mut buf = vec![0u8; DB_PAGE_SIZE as usize];
        if self.disk_manager.read_page(page_id, &mut buf).is_err() {
            self.inner.lock().free_list.push(frame_id);
            return None;
        }
        let payload = bincode::deserialize(&buf)
            .unwrap_or_else(|_| PagePayload::Raw(buf.clone()));

        let page = Arc::new(Page::new(page_id, payload));
        page.incr_pin_count();
        self.replacer.pin(frame_id);

        let mut state = self.inner.lock();
        // Another thread may have loaded the page while we were reading it;
        // reuse its copy and return our frame.
        if let Some(&existing_frame) = state.page_table.get(&page_id) {
            let existing = Arc::clone(state.frames[existing_frame as usize].as_ref()?);
            existing.incr_pin_count();
            self.replacer.pin(existing_frame);
            state.free_list.push(frame_id);
            return Some(existing);
        }
        state.frames[frame_id as usize] = Some(Arc::clone(&page));
        state.page_table.insert(page_id, frame_id);
        Some(page)
    }

    /// Drops one pin on the page, recording whether the caller dirtied it.
    /// Returns false if the page is not resident or was not pinned.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let state = self.inner.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };
        let Some(page) = state.frames[frame_id as usize].as_ref() else {
            return false;
        };
        if page.get_pin_count() <= 0 {
            warn!("unpin of unpinned page {}", page_id);
            return false;
        }
        if is_dirty {
            page.set_dirty(true);
        }
        if page.decr_pin_count() == 0 {
            self.replacer.unpin(frame_id);
        }
        true
    }

    /// Writes the page's serialized payload back to disk and clears its
    /// dirty flag.
    pub fn flush_page(&self, page_id: PageId) -> bool {
        let page = {
            let state = self.inner.lock();
            let Some(&frame_id) = state.page_table.get(&page_id) else {
                return false;
            };
            match state.frames[frame_id as usize] {
                Some(ref page) => Arc::clone(page),
                None => return false,
            }
        };
        self.flush_page_inner(&page)
    }

    pub fn flush_all_pages(&self) {
        let pages: Vec<Arc<Page>> = {
            let state = self.inner.lock();
            state.frames.iter().flatten().cloned().collect()
        };
        for page in pages {
            self.flush_page_inner(&page);
        }
    }

    /// Frees an unpinned page, returning its frame to the free list.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut state = self.inner.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            // Not resident; nothing to free in memory.
            return true;
        };
        if let Some(page) = state.frames[frame_id as usize].as_ref() {
            if page.get_pin_count() > 0 {
                return false;
            }
        }
        state.page_table.remove(&page_id);
        state.frames[frame_id as usize] = None;
        self.replacer.pin(frame_id);
        state.free_list.push(frame_id);
        debug!("deleted page {} from frame {}", page_id, frame_id);
        true
    }

    /// Picks a frame from the free list, or evicts the replacer's victim,
    /// flushing it first if dirty. The evicted page is detached under the
    /// pool latch but flushed outside it, since flushing briefly takes the
    /// page latch and a latch holder may itself be unpinning pages.
    fn acquire_frame(&self) -> Option<FrameId> {
        let (frame_id, evicted) = {
            let mut state = self.inner.lock();
            if let Some(frame_id) = state.free_list.pop() {
                (frame_id, None)
            } else {
                let frame_id = self.replacer.victim()?;
                let old_page = state.frames[frame_id as usize].take();
                if let Some(ref old_page) = old_page {
                    state.page_table.remove(&old_page.get_page_id());
                }
                (frame_id, old_page)
            }
        };
        if let Some(old_page) = evicted {
            if old_page.is_dirty() {
                self.flush_page_inner(&old_page);
            }
        }
        Some(frame_id)
    }

    fn flush_page_inner(&self, page: &Arc<Page>) -> bool {
        let payload = page.read();
        let bytes = match bincode::serialize(&*payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to serialize page {}: {}", page.get_page_id(), e);
                return false;
            }
        };
        if self.disk_manager.write_page(page.get_page_id(), &bytes).is_err() {
            return false;
        }
        page.set_dirty(false);
        true
    }
}
