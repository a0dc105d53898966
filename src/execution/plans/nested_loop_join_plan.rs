use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::Expression;
use crate::execution::plans::abstract_plan::PlanNode;

/// Join of two child plans by scanning the inner child once per outer
/// tuple. The output columns are expressions over the joined pair,
/// addressed as `(tuple_idx, col_idx)` with 0 meaning the left side.
#[derive(Debug)]
pub struct NestedLoopJoinPlanNode {
    output_schema: Schema,
    left: Arc<PlanNode>,
    right: Arc<PlanNode>,
    predicate: Option<Arc<Expression>>,
    output_exprs: Vec<Arc<Expression>>,
}

impl NestedLoopJoinPlanNode {
    pub fn new(
        output_schema: Schema,
        left: Arc<PlanNode>,
        right: Arc<PlanNode>,
        predicate: Option<Arc<Expression>>,
        output_exprs: Vec<Arc<Expression>>,
    ) -> Self {
        Self {
            output_schema,
            left,
            right,
            predicate,
            output_exprs,
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_left_plan(&self) -> &Arc<PlanNode> {
        &self.left
    }

    pub fn get_right_plan(&self) -> &Arc<PlanNode> {
        &self.right
    }

    pub fn get_predicate(&self) -> Option<&Arc<Expression>> {
        self.predicate.as_ref()
    }

    pub fn get_output_exprs(&self) -> &[Arc<Expression>] {
        &self.output_exprs
    }
}
