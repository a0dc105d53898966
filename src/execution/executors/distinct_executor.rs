use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::execution::executors::abstract_executor::AbstractExecutor;
use crate::execution::plans::distinct_plan::DistinctPlanNode;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;

/// Streams the child's tuples, emitting only the first occurrence of each
/// full value vector.
pub struct DistinctExecutor {
    plan: Arc<DistinctPlanNode>,
    child: Box<dyn AbstractExecutor>,
    seen: HashSet<Vec<Value>>,
}

impl DistinctExecutor {
    pub fn new(plan: Arc<DistinctPlanNode>, child: Box<dyn AbstractExecutor>) -> Self {
        Self {
            plan,
            child,
            seen: HashSet::new(),
        }
    }
}

impl AbstractExecutor for DistinctExecutor {
    fn init(&mut self) {
        self.child.init();
        self.seen.clear();
    }

    fn next(&mut self) -> Result<Option<(Tuple, RID)>, DBError> {
        while let Some((tuple, rid)) = self.child.next()? {
            if self.seen.insert(tuple.get_values().to_vec()) {
                return Ok(Some((tuple, rid)));
            }
        }
        Ok(None)
    }

    fn get_output_schema(&self) -> &Schema {
        self.plan.get_output_schema()
    }
}
