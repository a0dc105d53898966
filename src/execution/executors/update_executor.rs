use std::sync::Arc;

use log::debug;

use crate::catalog::schema::Schema;
use crate::catalog::{IndexInfo, TableInfo};
use crate::common::exception::{AbortReason, DBError};
use crate::common::rid::RID;
use crate::concurrency::transaction::{IsolationLevel, TableWriteRecord, WType};
use crate::execution::executor_context::ExecutorContext;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::plans::update_plan::{UpdateInfo, UpdatePlanNode};
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Updates every row its child produces, applying the plan's per-column
/// update attributes: each column is left unchanged, set to a constant, or
/// incremented. Locking mirrors the delete executor; indexes see the old
/// key removed and the new key inserted.
pub struct UpdateExecutor {
    context: Arc<ExecutorContext>,
    plan: Arc<UpdatePlanNode>,
    child: Box<dyn AbstractExecutor>,
    table_info: Arc<TableInfo>,
    indexes: Vec<Arc<IndexInfo>>,
}

impl UpdateExecutor {
    pub fn new(
        context: Arc<ExecutorContext>,
        plan: Arc<UpdatePlanNode>,
        child: Box<dyn AbstractExecutor>,
    ) -> Self {
        let (table_info, indexes) = {
            let catalog = context.get_catalog();
            let catalog_guard = catalog.read();
            let table_info = catalog_guard
                .get_table(plan.get_table_oid())
                .expect("update plan references a missing table");
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

    /// Applies the plan's update attributes to a source tuple.
    fn generate_updated_tuple(&self, src: &Tuple) -> Tuple {
        let update_attrs = self.plan.get_update_attrs();
        let col_count = self.table_info.get_schema().get_column_count();
        let mut values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            let value = match update_attrs.get(&idx) {
                None => src.get_value(idx).clone(),
                Some(UpdateInfo::Set(constant)) => constant.clone(),
                Some(UpdateInfo::Add(delta)) => src.get_value(idx).add(&Value::new(*delta)),
            };
            values.push(value);
        }
        Tuple::new(values)
    }
}

impl AbstractExecutor for UpdateExecutor {
    fn init(&mut self) {
        self.child.init();
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        let Some((old_tuple, rid)) = self.child.next()? else {
            return Ok(None);
        };
        let mut new_tuple = self.generate_updated_tuple(&old_tuple);

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
        if !heap.update_tuple(&new_tuple, rid) {
            return Ok(None);
        }
        new_tuple.set_rid(rid);

        txn.append_table_write_record(TableWriteRecord {
            rid,
            wtype: WType::Update,
            tuple: old_tuple.clone(),
            table: Arc::clone(&heap),
        });

        for index_info in &self.indexes {
            let schema = self.table_info.get_schema();
            let old_key = old_tuple.key_from_tuple(
                schema,
                index_info.get_key_schema(),
                index_info.get_key_attrs(),
            );
            let new_key = new_tuple.key_from_tuple(
                schema,
                index_info.get_key_schema(),
                index_info.get_key_attrs(),
            );
            let index = index_info.get_index();
            index.remove(old_key.get_value(0), &rid, Some(txn.as_ref()));
            index.insert(new_key.get_value(0), rid, Some(txn.as_ref()));
        }
        debug!("txn {} updated row at {}", txn.get_transaction_id(), rid);

        if txn.get_isolation_level() != IsolationLevel::RepeatableRead {
            lock_manager.unlock(&txn, rid);
        }

        Ok(Some((new_tuple, rid)))
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
