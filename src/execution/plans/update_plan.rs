use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::schema::Schema;
use crate::common::config::TableOidT;
use crate::execution::plans::abstract_plan::PlanNode;
use crate::types_db::value::Value;

/// How one column changes under an update: replaced by a constant or
/// incremented by a delta. Columns absent from the map keep their value.
#[derive(Debug, Clone)]
pub enum UpdateInfo {
    Set(Value),
    Add(i32),
}

/// Update rows produced by a child plan according to per-column update
/// attributes.
#[derive(Debug)]
pub struct UpdatePlanNode {
    output_schema: Schema,
    table_oid: TableOidT,
    child: Arc<PlanNode>,
    update_attrs: HashMap<usize, UpdateInfo>,
}

impl UpdatePlanNode {
    pub fn new(
        output_schema: Schema,
        table_oid: TableOidT,
        child: Arc<PlanNode>,
        update_attrs: HashMap<usize, UpdateInfo>,
    ) -> Self {
        Self {
            output_schema,
            table_oid,
            child,
            update_attrs,
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

    pub fn get_update_attrs(&self) -> &HashMap<usize, UpdateInfo> {
        &self.update_attrs
    }
}
