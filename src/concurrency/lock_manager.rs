use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::debug;
use parking_lot::{Condvar, Mutex};

use crate::common::config::{TxnId, INVALID_TXN_ID, WOUND_CHECK_INTERVAL};
use crate::common::exception::AbortReason;
use crate::common::rid::RID;
use crate::concurrency::transaction::{IsolationLevel, Transaction, TransactionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// One transaction's pending or granted lock request on a row.
struct LockRequest {
    txn_id: TxnId,
    lock_mode: LockMode,
    granted: bool,
}

impl LockRequest {
    fn new(txn_id: TxnId, lock_mode: LockMode) -> Self {
        Self {
            txn_id,
            lock_mode,
            granted: false,
        }
    }
}

/// Bookkeeping for all requests on a single row.
///
/// Invariants: `is_writing` and `shared_read > 0` are mutually exclusive;
/// at most one transaction is `upgrading`; every granted request appears in
/// its transaction's lock set.
struct QueueState {
    requests: VecDeque<LockRequest>,
    shared_read: u32,
    is_writing: bool,
    upgrading: TxnId,
}

struct LockRequestQueue {
    state: Mutex<QueueState>,
    cv: Condvar,
}

impl LockRequestQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                requests: VecDeque::new(),
                shared_read: 0,
                is_writing: false,
                upgrading: INVALID_TXN_ID,
            }),
            cv: Condvar::new(),
        }
    }
}

/// Row-level two-phase lock manager with wound-wait deadlock prevention.
///
/// Shared and exclusive locks are tracked per row in a request queue with
/// its own latch and condition variable; the global table latch is held
/// only long enough to locate or create a queue. Requesters never wait on
/// younger holders: an older transaction wounds every younger conflicting
/// holder by marking it aborted, so the wait-for graph cannot form a cycle
/// and no timeout is needed.
///
/// Grant order is deliberately not FIFO; wounding reorders the queue so
/// older transactions make progress over younger ones.
pub struct LockManager {
    lock_table: Mutex<HashMap<RID, Arc<LockRequestQueue>>>,
    txn_map: Mutex<HashMap<TxnId, Arc<Transaction>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            lock_table: Mutex::new(HashMap::new()),
            txn_map: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires a shared lock on `rid`, blocking while a writer holds it.
    ///
    /// Fails, aborting the transaction, when requested under
    /// `READ_UNCOMMITTED`, after the shrinking phase began under
    /// `REPEATABLE_READ`, or when the transaction is wounded while waiting.
    /// Succeeds immediately if the row is already held in either mode.
    pub fn lock_shared(&self, txn: &Arc<Transaction>, rid: RID) -> bool {
        if txn.get_state() == TransactionState::Aborted {
            // A wound is observable before queueing.
            return false;
        }
        if txn.get_isolation_level() == IsolationLevel::ReadUncommitted {
            txn.set_aborted(AbortReason::LockSharedOnReadUncommitted);
            return false;
        }
        if txn.get_isolation_level() == IsolationLevel::RepeatableRead
            && txn.get_state() == TransactionState::Shrinking
        {
            txn.set_aborted(AbortReason::LockOnShrinking);
            return false;
        }
        if txn.is_shared_locked(&rid) || txn.is_exclusive_locked(&rid) {
            return true;
        }

        let txn_id = txn.get_transaction_id();
        let queue = self.get_or_create_queue(txn, rid);
        let mut state = queue.state.lock();
        state.requests.push_back(LockRequest::new(txn_id, LockMode::Shared));

        self.wound_wait(txn_id, LockMode::Shared, rid, &mut state, &queue.cv);

        while !(txn.get_state() == TransactionState::Aborted || !state.is_writing) {
            queue.cv.wait_for(&mut state, WOUND_CHECK_INTERVAL);
        }
        if self.check_wound_abort(txn, &mut state) {
            return false;
        }

        state.shared_read += 1;
        Self::mark_granted(&mut state, txn_id);
        txn.add_shared_lock(rid);
        true
    }

    /// Acquires an exclusive lock on `rid`, blocking while any other
    /// transaction holds the row in any mode.
    pub fn lock_exclusive(&self, txn: &Arc<Transaction>, rid: RID) -> bool {
        if txn.get_state() == TransactionState::Aborted {
            return false;
        }
        if txn.get_isolation_level() == IsolationLevel::RepeatableRead
            && txn.get_state() == TransactionState::Shrinking
        {
            txn.set_aborted(AbortReason::LockOnShrinking);
            return false;
        }
        if txn.is_exclusive_locked(&rid) {
            return true;
        }

        let txn_id = txn.get_transaction_id();
        let queue = self.get_or_create_queue(txn, rid);
        let mut state = queue.state.lock();
        state
            .requests
            .push_back(LockRequest::new(txn_id, LockMode::Exclusive));

        self.wound_wait(txn_id, LockMode::Exclusive, rid, &mut state, &queue.cv);

        while !(txn.get_state() == TransactionState::Aborted
            || (!state.is_writing && state.shared_read == 0))
        {
            queue.cv.wait_for(&mut state, WOUND_CHECK_INTERVAL);
        }
        if self.check_wound_abort(txn, &mut state) {
            return false;
        }

        state.is_writing = true;
        Self::mark_granted(&mut state, txn_id);
        txn.add_exclusive_lock(rid);
        true
    }

    /// Upgrades a held shared lock to exclusive.
    ///
    /// The transaction must already hold `S` on the row. Only one upgrade
    /// may be in flight per row; a second upgrader aborts with
    /// `UPGRADE_CONFLICT`. The shared grant is given up before waiting, so
    /// a concurrent writer cannot deadlock against the upgrader.
    pub fn lock_upgrade(&self, txn: &Arc<Transaction>, rid: RID) -> bool {
        if txn.get_state() == TransactionState::Aborted {
            return false;
        }
        if txn.get_isolation_level() == IsolationLevel::RepeatableRead
            && txn.get_state() == TransactionState::Shrinking
        {
            txn.set_aborted(AbortReason::LockOnShrinking);
            return false;
        }
        if txn.is_exclusive_locked(&rid) {
            return true;
        }
        if !txn.is_shared_locked(&rid) {
            return false;
        }

        let txn_id = txn.get_transaction_id();
        let queue = self.get_or_create_queue(txn, rid);
        let mut state = queue.state.lock();

        if state.upgrading != INVALID_TXN_ID {
            txn.set_aborted(AbortReason::UpgradeConflict);
            return false;
        }

        // Give up the shared grant in place and reserve the upgrade slot.
        if let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.txn_id == txn_id && r.lock_mode == LockMode::Shared)
        {
            request.granted = false;
            request.lock_mode = LockMode::Exclusive;
        }
        state.shared_read -= 1;
        txn.remove_shared_lock(&rid);
        state.upgrading = txn_id;

        self.wound_wait(txn_id, LockMode::Exclusive, rid, &mut state, &queue.cv);

        while !(txn.get_state() == TransactionState::Aborted
            || (!state.is_writing && state.shared_read == 0))
        {
            queue.cv.wait_for(&mut state, WOUND_CHECK_INTERVAL);
        }
        if txn.get_state() == TransactionState::Aborted {
            state.upgrading = INVALID_TXN_ID;
            self.check_wound_abort(txn, &mut state);
            return false;
        }

        Self::mark_granted(&mut state, txn_id);
        state.upgrading = INVALID_TXN_ID;
        state.is_writing = true;
        txn.add_exclusive_lock(rid);
        true
    }

    /// Releases the transaction's lock on `rid`. The first unlock of a
    /// `REPEATABLE_READ` transaction moves it into its shrinking phase.
    pub fn unlock(&self, txn: &Arc<Transaction>, rid: RID) -> bool {
        if txn.get_isolation_level() == IsolationLevel::RepeatableRead
            && txn.get_state() == TransactionState::Growing
        {
            txn.set_state(TransactionState::Shrinking);
        }

        let Some(queue) = self.find_queue(&rid) else {
            return false;
        };
        let txn_id = txn.get_transaction_id();
        let mut state = queue.state.lock();

        let Some(pos) = state.requests.iter().position(|r| r.txn_id == txn_id) else {
            return false;
        };
        state.requests.remove(pos);

        if txn.is_shared_locked(&rid) {
            txn.remove_shared_lock(&rid);
            state.shared_read -= 1;
        }
        if txn.is_exclusive_locked(&rid) {
            txn.remove_exclusive_lock(&rid);
            state.is_writing = false;
        }
        if !state.is_writing {
            queue.cv.notify_all();
        }
        true
    }

    /// Releases every lock the transaction still holds. Used by the
    /// transaction manager at commit and abort.
    pub fn unlock_all(&self, txn: &Arc<Transaction>) {
        for rid in txn.get_locked_rids() {
            self.unlock(txn, rid);
        }
        self.txn_map.lock().remove(&txn.get_transaction_id());
    }

    /// Wounds every younger holder whose grant conflicts with this request:
    /// the victim's state flips to `Aborted`, its contribution to the
    /// queue's grant counters is withdrawn and its request removed. Victims
    /// blocked elsewhere observe the abort on their next predicate check.
    fn wound_wait(
        &self,
        requester: TxnId,
        mode: LockMode,
        rid: RID,
        state: &mut QueueState,
        cv: &Condvar,
    ) {
        let mut victims: Vec<(TxnId, LockMode)> = Vec::new();
        for request in state.requests.iter() {
            if !request.granted || request.txn_id <= requester {
                continue;
            }
            let conflicts = mode == LockMode::Exclusive
                || request.lock_mode == LockMode::Exclusive
                || request.txn_id == state.upgrading;
            if !conflicts {
                continue;
            }
            match request.lock_mode {
                LockMode::Shared => state.shared_read -= 1,
                LockMode::Exclusive => state.is_writing = false,
            }
            victims.push((request.txn_id, request.lock_mode));
        }
        if victims.is_empty() {
            return;
        }

        state
            .requests
            .retain(|r| !(r.granted && victims.iter().any(|(id, _)| *id == r.txn_id)));

        let txn_map = self.txn_map.lock();
        for (victim_id, victim_mode) in &victims {
            if let Some(victim) = txn_map.get(victim_id) {
                debug!("txn {} wounds younger txn {}", requester, victim_id);
                match victim_mode {
                    LockMode::Shared => victim.remove_shared_lock(&rid),
                    LockMode::Exclusive => victim.remove_exclusive_lock(&rid),
                }
                victim.set_aborted(AbortReason::Deadlock);
            }
        }
        drop(txn_map);
        cv.notify_all();
    }

    /// On wakeup with the transaction aborted: withdraw the pending request
    /// and surface the failure. Returns true when the caller must give up.
    fn check_wound_abort(&self, txn: &Arc<Transaction>, state: &mut QueueState) -> bool {
        if txn.get_state() != TransactionState::Aborted {
            return false;
        }
        let txn_id = txn.get_transaction_id();
        state.requests.retain(|r| r.txn_id != txn_id);
        txn.set_aborted(AbortReason::Deadlock);
        debug!(
            "txn {} lock request failed: {}",
            txn_id,
            txn.get_abort_reason()
                .unwrap_or(AbortReason::Deadlock)
        );
        true
    }

    fn mark_granted(state: &mut QueueState, txn_id: TxnId) {
        if let Some(request) = state
            .requests
            .iter_mut()
            .find(|r| r.txn_id == txn_id && !r.granted)
        {
            request.granted = true;
        }
    }

    /// Registers the transaction for wounding and returns the row's queue,
    /// creating it on first contact. The global latch is held only here.
    fn get_or_create_queue(&self, txn: &Arc<Transaction>, rid: RID) -> Arc<LockRequestQueue> {
        self.txn_map
            .lock()
            .insert(txn.get_transaction_id(), Arc::clone(txn));
        let mut table = self.lock_table.lock();
        Arc::clone(table.entry(rid).or_insert_with(|| Arc::new(LockRequestQueue::new())))
    }

    fn find_queue(&self, rid: &RID) -> Option<Arc<LockRequestQueue>> {
        self.lock_table.lock().get(rid).cloned()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::common::logger::initialize_logger;

    fn txn(id: TxnId, isolation: IsolationLevel) -> Arc<Transaction> {
        Arc::new(Transaction::new(id, isolation))
    }

    fn rid() -> RID {
        RID::new(1, 1)
    }

    #[test]
    fn test_shared_lock_rejected_under_read_uncommitted() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::ReadUncommitted);

        assert!(!lm.lock_shared(&t, rid()));
        assert_eq!(t.get_state(), TransactionState::Aborted);
        assert_eq!(
            t.get_abort_reason(),
            Some(AbortReason::LockSharedOnReadUncommitted)
        );
    }

    #[test]
    fn test_lock_after_shrinking_aborts() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::RepeatableRead);
        let r1 = RID::new(1, 1);
        let r2 = RID::new(1, 2);

        assert!(lm.lock_shared(&t, r1));
        assert!(lm.unlock(&t, r1));
        assert_eq!(t.get_state(), TransactionState::Shrinking);

        assert!(!lm.lock_shared(&t, r2));
        assert_eq!(t.get_state(), TransactionState::Aborted);
        assert_eq!(t.get_abort_reason(), Some(AbortReason::LockOnShrinking));
    }

    #[test]
    fn test_read_committed_releases_shared_without_shrinking() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::ReadCommitted);

        assert!(lm.lock_shared(&t, rid()));
        assert!(lm.unlock(&t, rid()));
        // Early shared release under READ_COMMITTED does not end the
        // growing phase.
        assert_eq!(t.get_state(), TransactionState::Growing);
        assert!(lm.lock_shared(&t, rid()));
    }

    #[test]
    fn test_locks_are_reentrant() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::RepeatableRead);

        assert!(lm.lock_shared(&t, rid()));
        assert!(lm.lock_shared(&t, rid()));
        assert!(lm.lock_upgrade(&t, rid()));
        assert!(lm.lock_exclusive(&t, rid()));
        assert!(lm.lock_upgrade(&t, rid()));
        assert!(t.is_exclusive_locked(&rid()));
        assert!(!t.is_shared_locked(&rid()));
    }

    #[test]
    fn test_upgrade_without_shared_lock_fails() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::RepeatableRead);

        assert!(!lm.lock_upgrade(&t, rid()));
        // Not an abort, just a refused request.
        assert_eq!(t.get_state(), TransactionState::Growing);
    }

    #[test]
    fn test_shared_holders_coexist() {
        initialize_logger();
        let lm = LockManager::new();
        let old = txn(1, IsolationLevel::RepeatableRead);
        let young = txn(2, IsolationLevel::RepeatableRead);

        assert!(lm.lock_shared(&young, rid()));
        assert!(lm.lock_shared(&old, rid()));
        // An older shared requester does not wound younger shared holders.
        assert_eq!(young.get_state(), TransactionState::Growing);
    }

    #[test]
    fn test_wound_wait_old_writer_kills_young_reader() {
        initialize_logger();
        let lm = LockManager::new();
        let young = txn(50, IsolationLevel::RepeatableRead);
        let old = txn(5, IsolationLevel::RepeatableRead);
        let r = rid();

        assert!(lm.lock_shared(&young, r));
        // The older writer wounds the younger holder and acquires the lock
        // without waiting.
        assert!(lm.lock_exclusive(&old, r));
        assert!(old.is_exclusive_locked(&r));

        assert_eq!(young.get_state(), TransactionState::Aborted);
        assert_eq!(young.get_abort_reason(), Some(AbortReason::Deadlock));
        assert!(!young.is_shared_locked(&r));

        // A wounded transaction's next request fails immediately.
        assert!(!lm.lock_shared(&young, r));
    }

    #[test]
    fn test_wound_wait_old_writer_kills_young_writer() {
        initialize_logger();
        let lm = LockManager::new();
        let young = txn(40, IsolationLevel::RepeatableRead);
        let old = txn(4, IsolationLevel::RepeatableRead);
        let r = rid();

        assert!(lm.lock_exclusive(&young, r));
        assert!(lm.lock_exclusive(&old, r));
        assert_eq!(young.get_state(), TransactionState::Aborted);
        assert!(!young.is_exclusive_locked(&r));
        assert!(old.is_exclusive_locked(&r));
    }

    #[test]
    fn test_young_writer_waits_for_old_reader() {
        initialize_logger();
        let lm = Arc::new(LockManager::new());
        let old = txn(1, IsolationLevel::RepeatableRead);
        let young = txn(2, IsolationLevel::RepeatableRead);
        let r = rid();

        assert!(lm.lock_shared(&old, r));

        let waiter = {
            let lm = Arc::clone(&lm);
            let young = Arc::clone(&young);
            thread::spawn(move || {
                let started = Instant::now();
                let granted = lm.lock_exclusive(&young, r);
                (granted, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(lm.unlock(&old, r));

        let (granted, waited) = waiter.join().unwrap();
        assert!(granted);
        assert!(waited >= Duration::from_millis(80));
        assert!(young.is_exclusive_locked(&r));
    }

    #[test]
    fn test_concurrent_upgrade_conflict() {
        initialize_logger();
        let lm = Arc::new(LockManager::new());
        let first = txn(10, IsolationLevel::RepeatableRead);
        let second = txn(20, IsolationLevel::RepeatableRead);
        let r = rid();

        assert!(lm.lock_shared(&first, r));
        assert!(lm.lock_shared(&second, r));

        // The younger transaction starts its upgrade and blocks on the
        // older one's shared lock.
        let upgrader = {
            let lm = Arc::clone(&lm);
            let second = Arc::clone(&second);
            thread::spawn(move || lm.lock_upgrade(&second, r))
        };
        thread::sleep(Duration::from_millis(50));

        // A second upgrade on the same row conflicts and aborts.
        assert!(!lm.lock_upgrade(&first, r));
        assert_eq!(first.get_state(), TransactionState::Aborted);
        assert_eq!(first.get_abort_reason(), Some(AbortReason::UpgradeConflict));

        // Releasing the aborted transaction's shared lock lets the first
        // upgrader through.
        assert!(lm.unlock(&first, r));
        assert!(upgrader.join().unwrap());
        assert!(second.is_exclusive_locked(&r));
    }

    #[test]
    fn test_unlock_without_lock_fails() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::ReadCommitted);
        assert!(!lm.unlock(&t, rid()));
    }

    #[test]
    fn test_unlock_all_releases_everything() {
        initialize_logger();
        let lm = LockManager::new();
        let t = txn(1, IsolationLevel::ReadCommitted);
        let r1 = RID::new(1, 1);
        let r2 = RID::new(1, 2);

        assert!(lm.lock_shared(&t, r1));
        assert!(lm.lock_exclusive(&t, r2));
        lm.unlock_all(&t);
        assert!(t.get_locked_rids().is_empty());

        let other = txn(2, IsolationLevel::ReadCommitted);
        assert!(lm.lock_exclusive(&other, r1));
        assert!(lm.lock_exclusive(&other, r2));
    }
}
