use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::config::TableOidT;
use crate::execution::plans::abstract_plan::PlanNode;
use crate::types_db::value::Value;

/// Insert into a table, either from raw value rows embedded in the plan or
/// from a child executor's output.
#[derive(Debug)]
pub struct InsertPlanNode {
    output_schema: Schema,
    table_oid: TableOidT,
    raw_values: Vec<Vec<Value>>,
    child: Option<Arc<PlanNode>>,
}

impl InsertPlanNode {
    /// Insert of literal rows carried by the plan itself.
    pub fn new_raw(output_schema: Schema, table_oid: TableOidT, raw_values: Vec<Vec<Value>>) -> Self {
        Self {
            output_schema,
            table_oid,
            raw_values,
            child: None,
        }
    }

    /// Insert of rows produced by a child plan.
    pub fn new_with_child(output_schema: Schema, table_oid: TableOidT, child: Arc<PlanNode>) -> Self {
        Self {
            output_schema,
            table_oid,
            raw_values: Vec::new(),
            child: Some(child),
        }
    }

    pub fn get_output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn get_table_oid(&self) -> TableOidT {
        self.table_oid
    }

    pub fn is_raw_insert(&self) -> bool {
        self.child.is_none()
    }

    pub fn get_raw_values(&self) -> &[Vec<Value>] {
        &self.raw_values
    }

    pub fn get_child_plan(&self) -> Option<&Arc<PlanNode>> {
        self.child.as_ref()
    }
}
