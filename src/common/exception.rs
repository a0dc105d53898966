use std::fmt;

use thiserror::Error;

use crate::common::config::{PageId, TxnId};

/// Why a transaction was forced into the `Aborted` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A shared lock was requested under `READ_UNCOMMITTED`.
    LockSharedOnReadUncommitted,
    /// A lock was requested after the transaction entered its shrinking phase.
    LockOnShrinking,
    /// Another transaction was already upgrading its lock on the same row.
    UpgradeConflict,
    /// The transaction was wounded by an older transaction.
    Deadlock,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbortReason::LockSharedOnReadUncommitted => "LOCKSHARED_ON_READ_UNCOMMITTED",
            AbortReason::LockOnShrinking => "LOCK_ON_SHRINKING",
            AbortReason::UpgradeConflict => "UPGRADE_CONFLICT",
            AbortReason::Deadlock => "DEADLOCK",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum DBError {
    #[error("execution error: {0}")]
    Execution(String),

    #[error("table {0} not found in catalog")]
    TableNotFound(String),

    #[error("page {0} could not be pinned")]
    PageNotFound(PageId),

    #[error("buffer pool exhausted: all frames pinned")]
    BufferPoolExhausted,

    #[error("transaction {0} aborted: {1}")]
    TransactionAborted(TxnId, AbortReason),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
