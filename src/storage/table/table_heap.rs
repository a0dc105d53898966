use log::trace;
use parking_lot::RwLock;

use crate::common::config::{PageId, TABLE_PAGE_SLOT_COUNT};
use crate::common::rid::RID;
use crate::storage::table::table_iterator::TableIterator;
use crate::storage::table::tuple::{Tuple, TupleMeta};

/// Heap storage for a table's tuples.
///
/// Rows live in fixed-capacity slot pages so every row has a stable
/// `(page, slot)` RID and iteration follows physical order. Deletes are
/// soft: the tuple's meta carries the deleted flag and scans skip it.
pub struct TableHeap {
    pages: RwLock<Vec<Vec<(TupleMeta, Tuple)>>>,
}

impl TableHeap {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(vec![Vec::new()]),
        }
    }

    /// Appends a tuple, returning the RID it was stored under.
    pub fn insert_tuple(&self, meta: TupleMeta, tuple: &Tuple) -> Option<RID> {
        let mut pages = self.pages.write();
        if pages
            .last()
            .is_some_and(|p| p.len() >= TABLE_PAGE_SLOT_COUNT as usize)
        {
            pages.push(Vec::new());
        }
        let page_id = (pages.len() - 1) as PageId;
        let page = pages.last_mut().unwrap();
        let rid = RID::new(page_id, page.len() as u32);

        let mut stored = tuple.clone();
        stored.set_rid(rid);
        page.push((meta, stored));
        trace!("inserted tuple at {}", rid);
        Some(rid)
    }

    /// Replaces the tuple at `rid`, keeping its meta. Fails on a missing or
    /// deleted slot.
    pub fn update_tuple(&self, tuple: &Tuple, rid: RID) -> bool {
        let mut pages = self.pages.write();
        let Some(slot) = Self::slot_mut(&mut pages, rid) else {
            return false;
        };
        if slot.0.is_deleted() {
            return false;
        }
        let mut stored = tuple.clone();
        stored.set_rid(rid);
        slot.1 = stored;
        true
    }

    /// Soft-deletes the tuple at `rid`. Fails if already deleted or absent.
    pub fn mark_delete(&self, rid: RID) -> bool {
        let mut pages = self.pages.write();
        let Some(slot) = Self::slot_mut(&mut pages, rid) else {
            return false;
        };
        if slot.0.is_deleted() {
            return false;
        }
        slot.0.set_deleted(true);
        true
    }

    /// Reverses a soft delete during transaction rollback.
    pub fn rollback_delete(&self, rid: RID) {
        let mut pages = self.pages.write();
        if let Some(slot) = Self::slot_mut(&mut pages, rid) {
            slot.0.set_deleted(false);
        }
    }

    pub fn get_tuple(&self, rid: RID) -> Option<(TupleMeta, Tuple)> {
        let pages = self.pages.read();
        pages
            .get(rid.get_page_id() as usize)
            .and_then(|p| p.get(rid.get_slot_num() as usize))
            .cloned()
    }

    pub fn get_num_pages(&self) -> usize {
        self.pages.read().len()
    }

    /// Snapshot of every live `(meta, tuple)` pair in physical order.
    /// Backs the table iterator.
    pub(crate) fn snapshot(&self) -> Vec<(TupleMeta, Tuple)> {
        let pages = self.pages.read();
        pages.iter().flatten().cloned().collect()
    }

    pub fn iter(&self) -> TableIterator {
        TableIterator::new(self.snapshot())
    }

    fn slot_mut<'a>(
        pages: &'a mut Vec<Vec<(TupleMeta, Tuple)>>,
        rid: RID,
    ) -> Option<&'a mut (TupleMeta, Tuple)> {
        pages
            .get_mut(rid.get_page_id() as usize)?
            .get_mut(rid.get_slot_num() as usize)
    }
}

impl Default for TableHeap {
    fn default() -> Self {
        Self::new()
    }
}
