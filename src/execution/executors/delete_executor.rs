use std::sync::Arc;

use log::debug;

use crate::catalog::schema::Schema;
use crate::catalog::{IndexInfo, TableInfo};
use crate::common::exception::{AbortReason, DBError};
use crate::common::rid::RID;
use crate::concurrency::transaction::{IsolationLevel, TableWriteRecord, WType};
use crate::execution::executor_context::ExecutorContext;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::plans::delete_plan::DeletePlanNode;
use crate::storage::table::tuple::Tuple;

/// Deletes every row its child produces.
///
/// A row already shared-locked by the transaction is upgraded to
/// exclusive; otherwise an exclusive lock is acquired outright. Lock
/// failure aborts the transaction. Deleted keys are withdrawn from every
/// index, and the pre-image is recorded for rollback.
pub struct DeleteExecutor {
    context: Arc<ExecutorContext>,
    plan: Arc<DeletePlanNode>,
    child: Box<dyn AbstractExecutor>,
    table_info: Arc<TableInfo>,
    indexes: Vec<Arc<IndexInfo>>,
}

impl DeleteExecutor {
    pub fn new(
        context: Arc<ExecutorContext>,
        plan: Arc<DeletePlanNode>,
        child: Box<dyn AbstractExecutor>,
    ) -> Self {
        let (table_info, indexes) = {
            let catalog = context.get_catalog();
            let catalog_guard = catalog.read();
            let table_info = catalog_guard
                .get_table(plan.get_table_oid())
                .expect("delete plan references a missing table");
            let indexes = catalog_guard.get_table_indexes(table_info.get_name());
            (table_info, indexes)
        };
        Self {
            context,
            plan,
            child,
            table_info,
            indexes,
        }
    }
}

impl AbstractExecutor for DeleteExecutor {
    fn init(&mut self) {
        self.child.init();
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        let Some((tuple, rid)) = self.child.next()? else {
            return Ok(None);
        };

        let txn = self.context.get_transaction();
        let lock_manager = self.context.get_lock_manager();
        let locked = if txn.is_shared_locked(&rid) {
            lock_manager.lock_upgrade(&txn, rid)
        } else {
            lock_manager.lock_exclusive(&txn, rid)
        };
        if !locked {
            let reason = txn.get_abort_reason().unwrap_or(AbortReason::Deadlock);
            self.context.get_transaction_manager().abort(&txn);
            return Err(DBError::TransactionAborted(txn.get_transaction_id(), reason));
        }

        let heap = self.table_info.get_table_heap();
        if !heap.mark_delete(rid) {
            return Ok(None);
        }

        txn.append_table_write_record(TableWriteRecord {
            rid,
            wtype: WType::Delete,
            tuple: tuple.clone(),
            table: Arc::clone(&heap),
        });

        for index_info in &self.indexes {
            let key = tuple.key_from_tuple(
                self.table_info.get_schema(),
                index_info.get_key_schema(),
                index_info.get_key_attrs(),
            );
            index_info
                .get_index()
                .remove(key.get_value(0), &rid, Some(txn.as_ref()));
        }
        debug!("txn {} deleted row at {}", txn.get_transaction_id(), rid);

        if txn.get_isolation_level() != IsolationLevel::RepeatableRead {
            lock_manager.unlock(&txn, rid);
        }

        Ok(Some((tuple, rid)))
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
