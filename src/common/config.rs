use std::time::Duration;

pub type FrameId = u64; // frame id type
pub type PageId = u64; // page id type
pub type TxnId = u64; // transaction id type
pub type TableOidT = u64; // table object id type
pub type IndexOidT = u64; // index object id type

pub const INVALID_PAGE_ID: PageId = u64::MAX; // invalid page id
pub const INVALID_TXN_ID: TxnId = u64::MAX; // invalid transaction id

pub const DB_PAGE_SIZE: u64 = 8192; // size of a data page in bytes
pub const BUFFER_POOL_SIZE: usize = 64; // default number of buffer pool frames

/// Upper bound on the directory's global depth. A directory of 2^9 entries is
/// the largest that fits a single page alongside its metadata.
pub const HTABLE_DIRECTORY_MAX_DEPTH: u32 = 9;
pub const HTABLE_DIRECTORY_ARRAY_SIZE: usize = 1 << HTABLE_DIRECTORY_MAX_DEPTH;

/// Nominal serialized footprint of one bucket slot: key bytes, record id,
/// occupancy and readable flags. Sized generously so variable-length keys
/// still fit the page.
pub const HTABLE_BUCKET_ENTRY_SIZE: usize = 64;
pub const HTABLE_BUCKET_PAGE_METADATA_SIZE: usize = 8;

/// Number of slots a bucket page can hold, derived from the page size.
pub const fn htable_bucket_array_size(entry_size: usize) -> usize {
    (DB_PAGE_SIZE as usize - HTABLE_BUCKET_PAGE_METADATA_SIZE) / entry_size
}

pub const HTABLE_BUCKET_MAX_SIZE: u32 =
    htable_bucket_array_size(HTABLE_BUCKET_ENTRY_SIZE) as u32;

/// A transaction wounded while blocked on another queue's condition variable
/// re-checks its own state at this interval.
pub const WOUND_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Number of tuple slots per table heap page.
pub const TABLE_PAGE_SLOT_COUNT: u32 = 32;
