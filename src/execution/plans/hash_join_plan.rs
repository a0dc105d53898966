use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::expressions::abstract_expression::Expression;
use crate::execution::plans::abstract_plan::PlanNode;

/// Equi-join of two child plans: the left side is drained into a hash
/// table keyed by the left key expression, then probed with right tuples.
#[derive(Debug)]
pub struct HashJoinPlanNode {
    output_schema: Schema,
    left: Arc<PlanNode>,
    right: Arc<PlanNode>,
    left_key_expression: Arc<Expression>,
    right_key_expression: Arc<Expression>,
    output_exprs: Vec<Arc<Expression>>,
}

impl HashJoinPlanNode {
    pub fn new(
        output_schema: Schema,
        left: Arc<PlanNode>,
        right: Arc<PlanNode>,
        left_key_expression: Arc<Expression>,
        right_key_expression: Arc<Expression>,
        output_exprs: Vec<Arc<Expression>>,
    ) -> Self {
        Self {
            output_schema,
            left,
            right,
            left_key_expression,
            right_key_expression,
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

    pub fn get_left_join_key_expression(&self) -> &Arc<Expression> {
        &self.left_key_expression
    }

    pub fn get_right_join_key_expression(&self) -> &Arc<Expression> {
        &self.right_key_expression
    }

    pub fn get_output_exprs(&self) -> &[Arc<Expression>] {
        &self.output_exprs
    }
}
