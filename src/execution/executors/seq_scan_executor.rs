use std::sync::Arc;

use log::trace;

use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::execution::executor_context::ExecutorContext;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::expressions::abstract_expression::{Expression, ExpressionOps};
use crate::execution::plans::seq_scan_plan::SeqScanPlanNode;
use crate::storage::table::table_heap::TableHeap;
use crate::storage::table::table_iterator::TableIterator;
use crate::storage::table::tuple::Tuple;

/// Sequential scan over a table heap.
///
/// Rows are filtered through the plan's predicate and projected into the
/// plan's output schema by column-name indirection into the table schema,
/// falling back to the positional column when a name is absent.
pub struct SeqScanExecutor {
    plan: Arc<SeqScanPlanNode>,
    table_heap: Arc<TableHeap>,
    table_schema: Schema,
    predicate: Arc<Expression>,
    out_schema_idx: Vec<usize>,
    iterator: Option<TableIterator>,
}

impl SeqScanExecutor {
    pub fn new(context: Arc<ExecutorContext>, plan: Arc<SeqScanPlanNode>) -> Self {
        let (table_heap, table_schema) = {
            let catalog = context.get_catalog();
            let catalog_guard = catalog.read();
            let table_info = catalog_guard
                .get_table(plan.get_table_oid())
                .expect("seq scan plan references a missing table");
            (table_info.get_table_heap(), table_info.get_schema().clone())
        };

        let predicate = plan
            .get_predicate()
            .cloned()
            .unwrap_or_else(|| Arc::new(Expression::AlwaysTrue));

        // Resolve each output column against the table schema by name,
        // keeping its own position when the name does not appear there.
        let out_schema_idx = plan
            .get_output_schema()
            .get_columns()
            .iter()
            .enumerate()
            .map(|(i, col)| table_schema.get_column_index(col.get_name()).unwrap_or(i))
            .collect();

        Self {
            plan,
            table_heap,
            table_schema,
            predicate,
            out_schema_idx,
            iterator: None,
        }
    }
}

impl AbstractExecutor for SeqScanExecutor {
    fn init(&mut self) {
        self.iterator = Some(self.table_heap.iter());
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        let iter = self
            .iterator
            .as_mut()
            .ok_or_else(|| DBError::Execution("seq scan used before init".to_string()))?;

        for (_, tuple) in iter.by_ref() {
            let accept = self.predicate.evaluate(&tuple, &self.table_schema);
            if !accept.as_bool() {
                continue;
            }
            let rid = tuple.get_rid();
            trace!("seq scan accepts tuple at {}", rid);
            let values = self
                .out_schema_idx
                .iter()
                .map(|&i| tuple.get_value(i).clone())
                .collect();
            return Ok(Some((Tuple::with_rid(values, rid), rid)));
        }
        Ok(None)
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
