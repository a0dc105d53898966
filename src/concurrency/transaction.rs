use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::{Mutex, RwLock};

use crate::common::config::TxnId;
use crate::common::exception::AbortReason;
use crate::common::rid::RID;
use crate::storage::table::table_heap::TableHeap;
use crate::storage::table::tuple::Tuple;

/// Transaction state. Under two-phase locking a transaction only acquires
/// locks while `Growing` and only releases them while `Shrinking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Growing,
    Shrinking,
    Committed,
    Aborted,
}

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
}

/// The kind of table mutation recorded for rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WType {
    Insert,
    Delete,
    Update,
}

/// One undoable table mutation. For updates the tuple is the pre-image.
pub struct TableWriteRecord {
    pub rid: RID,
    pub wtype: WType,
    pub tuple: Tuple,
    pub table: Arc<TableHeap>,
}

/// A single database transaction.
///
/// Identifiers are monotone: a smaller id means an older transaction, which
/// is what wound-wait arbitrates on. All fields behind locks may be read by
/// other threads; `state` in particular is written by wounding transactions
/// and must be immediately visible to the owner.
pub struct Transaction {
    txn_id: TxnId,
    isolation_level: IsolationLevel,
    thread_id: thread::ThreadId,

    state: RwLock<TransactionState>,
    abort_reason: Mutex<Option<AbortReason>>,
    shared_lock_set: Mutex<HashSet<RID>>,
    exclusive_lock_set: Mutex<HashSet<RID>>,
    write_set: Mutex<Vec<TableWriteRecord>>,
}

impl Transaction {
    pub fn new(txn_id: TxnId, isolation_level: IsolationLevel) -> Self {
        Self {
            txn_id,
            isolation_level,
            thread_id: thread::current().id(),
            state: RwLock::new(TransactionState::Growing),
            abort_reason: Mutex::new(None),
            shared_lock_set: Mutex::new(HashSet::new()),
            exclusive_lock_set: Mutex::new(HashSet::new()),
            write_set: Mutex::new(Vec::new()),
        }
    }

    pub fn get_transaction_id(&self) -> TxnId {
        self.txn_id
    }

    pub fn get_isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    pub fn thread_id(&self) -> thread::ThreadId {
        self.thread_id
    }

    pub fn get_state(&self) -> TransactionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: TransactionState) {
        *self.state.write() = state;
    }

    /// Marks the transaction aborted, recording why. The first reason wins:
    /// a wound that races with a local failure keeps its original cause.
    pub fn set_aborted(&self, reason: AbortReason) {
        let mut recorded = self.abort_reason.lock();
        if recorded.is_none() {
            *recorded = Some(reason);
        }
        *self.state.write() = TransactionState::Aborted;
    }

    pub fn get_abort_reason(&self) -> Option<AbortReason> {
        *self.abort_reason.lock()
    }

    pub fn is_shared_locked(&self, rid: &RID) -> bool {
        self.shared_lock_set.lock().contains(rid)
    }

    pub fn is_exclusive_locked(&self, rid: &RID) -> bool {
        self.exclusive_lock_set.lock().contains(rid)
    }

    pub fn add_shared_lock(&self, rid: RID) {
        self.shared_lock_set.lock().insert(rid);
    }

    pub fn remove_shared_lock(&self, rid: &RID) {
        self.shared_lock_set.lock().remove(rid);
    }

    pub fn add_exclusive_lock(&self, rid: RID) {
        self.exclusive_lock_set.lock().insert(rid);
    }

    pub fn remove_exclusive_lock(&self, rid: &RID) {
        self.exclusive_lock_set.lock().remove(rid);
    }

    /// All rows this transaction currently holds locks on, shared and
    /// exclusive alike.
    pub fn get_locked_rids(&self) -> Vec<RID> {
        let mut rids: Vec<RID> = self.shared_lock_set.lock().iter().copied().collect();
        rids.extend(self.exclusive_lock_set.lock().iter().copied());
        rids
    }

    pub fn append_table_write_record(&self, record: TableWriteRecord) {
        self.write_set.lock().push(record);
    }

    /// Drains the write set for rollback or for discarding at commit.
    pub fn take_write_set(&self) -> Vec<TableWriteRecord> {
        std::mem::take(&mut *self.write_set.lock())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("txn_id", &self.txn_id)
            .field("isolation_level", &self.isolation_level)
            .field("state", &self.get_state())
            .finish()
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsolationLevel::ReadUncommitted => "READ_UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ_COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE_READ",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Growing => "GROWING",
            TransactionState::Shrinking => "SHRINKING",
            TransactionState::Committed => "COMMITTED",
            TransactionState::Aborted => "ABORTED",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_is_growing() {
        let txn = Transaction::new(1, IsolationLevel::RepeatableRead);
        assert_eq!(txn.get_transaction_id(), 1);
        assert_eq!(txn.get_state(), TransactionState::Growing);
        assert_eq!(txn.get_abort_reason(), None);
    }

    #[test]
    fn test_lock_set_bookkeeping() {
        let txn = Transaction::new(1, IsolationLevel::RepeatableRead);
        let rid = RID::new(1, 1);

        txn.add_shared_lock(rid);
        assert!(txn.is_shared_locked(&rid));
        assert!(!txn.is_exclusive_locked(&rid));

        txn.remove_shared_lock(&rid);
        txn.add_exclusive_lock(rid);
        assert!(txn.is_exclusive_locked(&rid));
        assert_eq!(txn.get_locked_rids(), vec![rid]);
    }

    #[test]
    fn test_first_abort_reason_wins() {
        let txn = Transaction::new(1, IsolationLevel::RepeatableRead);
        txn.set_aborted(AbortReason::Deadlock);
        txn.set_aborted(AbortReason::UpgradeConflict);
        assert_eq!(txn.get_state(), TransactionState::Aborted);
        assert_eq!(txn.get_abort_reason(), Some(AbortReason::Deadlock));
    }

    #[test]
    fn test_abort_is_visible_across_threads() {
        let txn = Arc::new(Transaction::new(7, IsolationLevel::RepeatableRead));
        let wounder = {
            let txn = Arc::clone(&txn);
            thread::spawn(move || txn.set_aborted(AbortReason::Deadlock))
        };
        wounder.join().unwrap();
        assert_eq!(txn.get_state(), TransactionState::Aborted);
    }
}
