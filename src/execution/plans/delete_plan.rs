use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::config::TableOidT;
use crate::execution::plans::abstract_plan::PlanNode;

/// Delete every row the child plan produces.
#[derive(Debug)]
pub struct DeletePlanNode {
    output_schema: Schema,
    table_oid: TableOidT,
    child: Arc<PlanNode>,
}

impl DeletePlanNode {
    pub fn new(output_schema: Schema, table_oid: TableOidT, child: Arc<PlanNode>) -> Self {
        Self {
            output_schema,
            table_oid,
            child,
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_table_oid(&self) -> TableOidT {
        self.table_oid
    }

    pub fn get_child_plan(&self) -> &Arc<PlanNode> {
        &self.child
    }
}
