use std::sync::Arc;

use parking_lot::RwLock;

use crate::buffer::buffer_pool_manager::BufferPoolManager;
use crate::catalog::Catalog;
use crate::concurrency::lock_manager::LockManager;
use crate::concurrency::transaction::Transaction;
use crate::concurrency::transaction_manager::TransactionManager;

/// Everything an executor needs while running: the buffer pool, the
/// catalog, the transaction it executes under, and the lock and
/// transaction managers it coordinates with. One owned structure passed
/// explicitly down the executor tree.
pub struct ExecutorContext {
    bpm: Arc<BufferPoolManager>,
    catalog: Arc<RwLock<Catalog>>,
    transaction: Arc<Transaction>,
    lock_manager: Arc<LockManager>,
    transaction_manager: Arc<TransactionManager>,
}

impl ExecutorContext {
    pub fn new(
        bpm: Arc<BufferPoolManager>,
        catalog: Arc<RwLock<Catalog>>,
        transaction: Arc<Transaction>,
        lock_manager: Arc<LockManager>,
        transaction_manager: Arc<TransactionManager>,
    ) -> Self {
        Self {
            bpm,
            catalog,
            transaction,
            lock_manager,
            transaction_manager,
        }
    }

    pub fn get_buffer_pool_manager(&self) -> Arc<BufferPoolManager> {
        Arc::clone(&self.bpm)
    }

    pub fn get_catalog(&self) -> Arc<RwLock<Catalog>> {
        Arc::clone(&self.catalog)
    }

    pub fn get_transaction(&self) -> Arc<Transaction> {
        Arc::clone(&self.transaction)
    }

    pub fn get_lock_manager(&self) -> Arc<LockManager> {
        Arc::clone(&self.lock_manager)
    }

    pub fn get_transaction_manager(&self) -> Arc<TransactionManager> {
        Arc::clone(&self.transaction_manager)
    }
}
