use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::common::config::TxnId;
use crate::concurrency::lock_manager::LockManager;
use crate::concurrency::transaction::{IsolationLevel, Transaction, TransactionState, WType};

/// Hands out transactions with monotone ids and drives commit and abort.
/// Smaller ids are older transactions, the ordering wound-wait relies on.
pub struct TransactionManager {
    next_txn_id: AtomicU64,
    lock_manager: Arc<LockManager>,
    active_txns: Mutex<HashMap<TxnId, Arc<Transaction>>>,
}

impl TransactionManager {
    pub fn new(lock_manager: Arc<LockManager>) -> Self {
        Self {
            next_txn_id: AtomicU64::new(0),
            lock_manager,
            active_txns: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_lock_manager(&self) -> Arc<LockManager> {
        Arc::clone(&self.lock_manager)
    }

    pub fn begin(&self, isolation_level: IsolationLevel) -> Arc<Transaction> {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::SeqCst);
        let txn = Arc::new(Transaction::new(txn_id, isolation_level));
        self.active_txns.lock().insert(txn_id, Arc::clone(&txn));
        debug!("txn {} began ({})", txn_id, isolation_level);
        txn
    }

    pub fn get_transaction(&self, txn_id: TxnId) -> Option<Arc<Transaction>> {
        self.active_txns.lock().get(&txn_id).cloned()
    }

    /// Commits: the write set is kept, all locks release, and the
    /// transaction leaves the active table.
    pub fn commit(&self, txn: &Arc<Transaction>) {
        txn.take_write_set();
        self.lock_manager.unlock_all(txn);
        txn.set_state(TransactionState::Committed);
        self.active_txns.lock().remove(&txn.get_transaction_id());
        debug!("txn {} committed", txn.get_transaction_id());
    }

    /// Aborts: table mutations are undone in reverse order, then all locks
    /// release. Inserts are re-deleted, deletes restored, updates reverted
    /// to their pre-image.
    pub fn abort(&self, txn: &Arc<Transaction>) {
        txn.set_state(TransactionState::Aborted);

        let mut write_set = txn.take_write_set();
        while let Some(record) = write_set.pop() {
            match record.wtype {
                WType::Insert => {
                    record.table.mark_delete(record.rid);
                }
                WType::Delete => {
                    record.table.rollback_delete(record.rid);
                }
                WType::Update => {
                    record.table.update_tuple(&record.tuple, record.rid);
                }
            }
        }

        self.lock_manager.unlock_all(txn);
        self.active_txns.lock().remove(&txn.get_transaction_id());
        debug!(
            "txn {} aborted ({})",
            txn.get_transaction_id(),
            txn.get_abort_reason()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "explicit".to_string())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::transaction::TableWriteRecord;
    use crate::storage::table::table_heap::TableHeap;
    use crate::storage::table::tuple::{Tuple, TupleMeta};
    use crate::types_db::value::Value;

    fn setup() -> TransactionManager {
        TransactionManager::new(Arc::new(LockManager::new()))
    }

    #[test]
    fn test_txn_ids_are_monotone() {
        let tm = setup();
        let t0 = tm.begin(IsolationLevel::RepeatableRead);
        let t1 = tm.begin(IsolationLevel::RepeatableRead);
        assert!(t0.get_transaction_id() < t1.get_transaction_id());
    }

    #[test]
    fn test_commit_releases_locks() {
        let tm = setup();
        let lm = tm.get_lock_manager();
        let txn = tm.begin(IsolationLevel::RepeatableRead);
        let rid = crate::common::rid::RID::new(1, 1);

        assert!(lm.lock_exclusive(&txn, rid));
        tm.commit(&txn);
        assert_eq!(txn.get_state(), TransactionState::Committed);
        assert!(txn.get_locked_rids().is_empty());

        // The row is free again for another transaction.
        let other = tm.begin(IsolationLevel::RepeatableRead);
        assert!(lm.lock_exclusive(&other, rid));
    }

    #[test]
    fn test_abort_rolls_back_insert() {
        let tm = setup();
        let txn = tm.begin(IsolationLevel::RepeatableRead);
        let table = Arc::new(TableHeap::new());

        let tuple = Tuple::new(vec![Value::new(1)]);
        let rid = table.insert_tuple(TupleMeta::default(), &tuple).unwrap();
        txn.append_table_write_record(TableWriteRecord {
            rid,
            wtype: WType::Insert,
            tuple,
            table: Arc::clone(&table),
        });

        tm.abort(&txn);
        assert!(table.get_tuple(rid).unwrap().0.is_deleted());
    }

    #[test]
    fn test_abort_rolls_back_update_and_delete() {
        let tm = setup();
        let txn = tm.begin(IsolationLevel::RepeatableRead);
        let table = Arc::new(TableHeap::new());

        let original = Tuple::new(vec![Value::new(1)]);
        let rid_updated = table.insert_tuple(TupleMeta::default(), &original).unwrap();
        let rid_deleted = table
            .insert_tuple(TupleMeta::default(), &Tuple::new(vec![Value::new(2)]))
            .unwrap();

        table.update_tuple(&Tuple::new(vec![Value::new(99)]), rid_updated);
        txn.append_table_write_record(TableWriteRecord {
            rid: rid_updated,
            wtype: WType::Update,
            tuple: original.clone(),
            table: Arc::clone(&table),
        });

        table.mark_delete(rid_deleted);
        txn.append_table_write_record(TableWriteRecord {
            rid: rid_deleted,
            wtype: WType::Delete,
            tuple: Tuple::new(vec![Value::new(2)]),
            table: Arc::clone(&table),
        });

        tm.abort(&txn);

        let (_, restored) = table.get_tuple(rid_updated).unwrap();
        assert_eq!(restored.get_value(0), &Value::new(1));
        assert!(!table.get_tuple(rid_deleted).unwrap().0.is_deleted());
    }
}
