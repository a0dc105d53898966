use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::config::{PageId, INVALID_PAGE_ID};

/// Record identifier: the physical location of a tuple as a page id plus the
/// slot number within that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RID {
    page_id: PageId,
    slot_num: u32,
}

impl RID {
    pub fn new(page_id: PageId, slot_num: u32) -> Self {
        Self { page_id, slot_num }
    }

    pub fn get_page_id(&self) -> PageId {
        self.page_id
    }

    pub fn get_slot_num(&self) -> u32 {
        self.slot_num
    }

    /// Returns true if this RID points at a real slot.
    pub fn is_valid(&self) -> bool {
        self.page_id != INVALID_PAGE_ID
    }
}

impl Default for RID {
    fn default() -> Self {
        Self {
            page_id: INVALID_PAGE_ID,
            slot_num: 0,
        }
    }
}

impl fmt::Display for RID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rid_accessors() {
        let rid = RID::new(42, 3);
        assert_eq!(rid.get_page_id(), 42);
        assert_eq!(rid.get_slot_num(), 3);
        assert!(rid.is_valid());
    }

    #[test]
    fn test_rid_default_is_invalid() {
        let rid = RID::default();
        assert!(!rid.is_valid());
    }

    #[test]
    fn test_rid_ordering() {
        let a = RID::new(1, 5);
        let b = RID::new(2, 0);
        let c = RID::new(2, 1);
        assert!(a < b);
        assert!(b < c);
    }
}
