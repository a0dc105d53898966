use std::sync::Arc;

use log::debug;

use crate::catalog::schema::Schema;
use crate::catalog::{IndexInfo, TableInfo};
use crate::common::exception::{AbortReason, DBError};
use crate::common::rid::RID;
use crate::concurrency::transaction::{IsolationLevel, TableWriteRecord, WType};
use crate::execution::executor_context::ExecutorContext;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::plans::insert_plan::InsertPlanNode;
use crate::storage::table::tuple::{Tuple, TupleMeta};

/// Inserts tuples into a table, from raw rows embedded in the plan or from
/// a child executor.
///
/// Every inserted row is exclusively locked before it becomes visible,
/// mirrored into all of the table's indexes, and recorded in the
/// transaction's write set for rollback. Below `REPEATABLE_READ` the lock
/// is released as soon as the row is published.
pub struct InsertExecutor {
    context: Arc<ExecutorContext>,
    plan: Arc<InsertPlanNode>,
    child: Option<Box<dyn AbstractExecutor>>,
    table_info: Arc<TableInfo>,
    indexes: Vec<Arc<IndexInfo>>,
    next_pos: usize,
}

impl InsertExecutor {
    pub fn new(
        context: Arc<ExecutorContext>,
        plan: Arc<InsertPlanNode>,
        child: Option<Box<dyn AbstractExecutor>>,
    ) -> Self {
        let (table_info, indexes) = {
            let catalog = context.get_catalog();
            let catalog_guard = catalog.read();
            let table_info = catalog_guard
                .get_table(plan.get_table_oid())
                .expect("insert plan references a missing table");
            let indexes = catalog_guard.get_table_indexes(table_info.get_name());
            (table_info, indexes)
        };
        Self {
            context,
            plan,
            child,
            table_info,
            indexes,
            next_pos: 0,
        }
    }

    /// Produces the next tuple to insert, by raw-value cursor or by pulling
    /// the child.
    fn source_tuple(&mut self) -> Result<Option<Tuple>, DBError> {
        if self.plan.is_raw_insert() {
            let raw_values = self.plan.get_raw_values();
            if self.next_pos >= raw_values.len() {
                return Ok(None);
            }
            let tuple = Tuple::new(raw_values[self.next_pos].clone());
            self.next_pos += 1;
            return Ok(Some(tuple));
        }
        let child = self
            .child
            .as_mut()
            .expect("child-mode insert plan without child executor");
        Ok(child.next()?.map(|(tuple, _)| tuple))
    }
}

impl AbstractExecutor for InsertExecutor {
    fn init(&mut self) {
        self.next_pos = 0;
        if let Some(child) = self.child.as_mut() {
            child.init();
        }
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        let Some(tuple) = self.source_tuple()? else {
            return Ok(None);
        };

        let heap = self.table_info.get_table_heap();
        let Some(rid) = heap.insert_tuple(TupleMeta::default(), &tuple) else {
            return Ok(None);
        };

        let txn = self.context.get_transaction();
        let lock_manager = self.context.get_lock_manager();
        if !lock_manager.lock_exclusive(&txn, rid) {
            let reason = txn.get_abort_reason().unwrap_or(AbortReason::Deadlock);
            self.context.get_transaction_manager().abort(&txn);
            return Err(DBError::TransactionAborted(txn.get_transaction_id(), reason));
        }

        txn.append_table_write_record(TableWriteRecord {
            rid,
            wtype: WType::Insert,
            tuple: tuple.clone(),
            table: Arc::clone(&heap),
        });

        for index_info in &self.indexes {
            let key = tuple.key_from_tuple(
                self.table_info.get_schema(),
                index_info.get_key_schema(),
                index_info.get_key_attrs(),
            );
            index_info.get_index().insert(key.get_value(0), rid, Some(txn.as_ref()));
        }
        debug!("txn {} inserted row at {}", txn.get_transaction_id(), rid);

        if txn.get_isolation_level() != IsolationLevel::RepeatableRead {
            lock_manager.unlock(&txn, rid);
        }

        let mut out = tuple;
        out.set_rid(rid);
        Ok(Some((out, rid)))
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
