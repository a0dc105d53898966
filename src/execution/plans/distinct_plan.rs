use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::execution::plans::abstract_plan::PlanNode;

/// Suppresses duplicate rows from the child plan's output.
#[derive(Debug)]
pub struct DistinctPlanNode {
    output_schema: Schema,
    child: Arc<PlanNode>,
}

impl DistinctPlanNode {
    pub fn new(output_schema: Schema, child: Arc<PlanNode>) -> Self {
        Self {
            output_schema,
            child,
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_child_plan(&self) -> &Arc<PlanNode> {
        &self.child
    }
}
